//! Output format registrations.

use crate::riff;
use remux_core::CodecId;

/// Description of a registered output format.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    /// Short format name.
    pub name: &'static str,
    /// Human-readable format name.
    pub long_name: &'static str,
    /// MIME type.
    pub mime_type: &'static str,
    /// Default file extension, without the dot.
    pub extension: &'static str,
    /// Default audio codec for this format.
    pub default_audio_codec: Option<CodecId>,
    /// Default video codec for this format.
    pub default_video_codec: Option<CodecId>,
    /// FourCC table for the video fallback path, if the format has one.
    pub video_tags: Option<&'static [(CodecId, u32)]>,
    /// TWOCC table for the audio fallback path, if the format has one.
    pub audio_tags: Option<&'static [(CodecId, u32)]>,
}

/// The general-purpose Matroska registration.
pub const MATROSKA: OutputFormat = OutputFormat {
    name: "matroska",
    long_name: "Matroska File Format",
    mime_type: "video/x-matroska",
    extension: "mkv",
    default_audio_codec: Some(CodecId::Mp2),
    default_video_codec: Some(CodecId::Mpeg4),
    video_tags: Some(riff::BMP_TAGS),
    audio_tags: Some(riff::WAV_TAGS),
};

/// The audio-only Matroska registration.
pub const MATROSKA_AUDIO: OutputFormat = OutputFormat {
    name: "matroska-audio",
    long_name: "Matroska File Format",
    mime_type: "audio/x-matroska",
    extension: "mka",
    default_audio_codec: Some(CodecId::Mp2),
    default_video_codec: None,
    video_tags: None,
    audio_tags: Some(riff::WAV_TAGS),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrations() {
        assert_eq!(MATROSKA.extension, "mkv");
        assert_eq!(MATROSKA.mime_type, "video/x-matroska");
        assert_eq!(MATROSKA.default_video_codec, Some(CodecId::Mpeg4));
        assert!(MATROSKA.video_tags.is_some());

        assert_eq!(MATROSKA_AUDIO.extension, "mka");
        assert_eq!(MATROSKA_AUDIO.mime_type, "audio/x-matroska");
        assert_eq!(MATROSKA_AUDIO.default_audio_codec, Some(CodecId::Mp2));
        assert_eq!(MATROSKA_AUDIO.default_video_codec, None);
        assert!(MATROSKA_AUDIO.video_tags.is_none());
    }
}
