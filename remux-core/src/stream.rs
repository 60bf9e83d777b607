//! Stream descriptors handed to a muxer at header time.

use crate::rational::Rational;
use bitflags::bitflags;

/// The kind of media a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
    /// Subtitle stream.
    Subtitle,
    /// Attachment, data, or anything else a container may not support.
    Other,
}

/// Codec identifiers.
///
/// A single flat namespace covering the codecs the muxers know how to tag,
/// either with a container-native codec ID or through a RIFF FourCC/TWOCC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    // Video
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    Hevc,
    /// MPEG-4 part 2 (ASP).
    Mpeg4,
    /// Microsoft MPEG-4 v3.
    Msmpeg4v3,
    /// Windows Media Video 7.
    Wmv1,
    /// Windows Media Video 8.
    Wmv2,
    /// Theora.
    Theora,
    /// VP8.
    Vp8,
    /// VP9.
    Vp9,
    /// AV1.
    Av1,
    /// Motion JPEG.
    Mjpeg,

    // Audio
    /// AAC (Advanced Audio Coding).
    Aac,
    /// MPEG audio layer 2.
    Mp2,
    /// MPEG audio layer 3.
    Mp3,
    /// AC-3 (Dolby Digital).
    Ac3,
    /// Vorbis.
    Vorbis,
    /// FLAC.
    Flac,
    /// Opus.
    Opus,
    /// RealAudio Cook.
    Cook,
    /// Windows Media Audio v1.
    WmaV1,
    /// Windows Media Audio v2.
    WmaV2,
    /// PCM signed 16-bit little-endian.
    PcmS16Le,
    /// PCM unsigned 8-bit.
    PcmU8,

    // Subtitles
    /// UTF-8 plain text subtitles.
    TextUtf8,
    /// Advanced SubStation Alpha subtitles.
    Ass,
}

impl CodecId {
    /// Bits per sample implied by the codec, or 0 when the codec does not
    /// imply one. Mirrors the PCM-only semantics of the usual
    /// bits-per-sample lookup.
    pub fn bits_per_sample(self) -> u32 {
        match self {
            CodecId::PcmS16Le => 16,
            CodecId::PcmU8 => 8,
            _ => 0,
        }
    }
}

bitflags! {
    /// Flags carried on a stream descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamFlags: u32 {
        /// Suppress nondeterministic output fields (identification strings,
        /// digest-derived UIDs) so repeated runs produce identical bytes.
        const BIT_EXACT = 0x0001;
    }
}

/// Description of one elementary stream, fixed at header time.
#[derive(Debug, Clone)]
pub struct Stream {
    /// Codec identity.
    pub codec_id: CodecId,
    /// Kind of media carried.
    pub kind: MediaKind,
    /// Container-assigned codec tag (FourCC/TWOCC), 0 if none.
    pub codec_tag: u32,
    /// Out-of-band codec initialization data.
    pub extradata: Option<Vec<u8>>,
    /// Frame width in pixels (video only).
    pub width: u32,
    /// Frame height in pixels (video only).
    pub height: u32,
    /// Sample aspect ratio (video only), zero when unset.
    pub sample_aspect_ratio: Rational,
    /// Sample rate in Hz (audio only).
    pub sample_rate: u32,
    /// Channel count (audio only).
    pub channels: u32,
    /// Average bit rate in bits per second, 0 if unknown.
    pub bit_rate: u32,
    /// Bytes per coded frame for block-based audio codecs, 0 if unknown.
    pub block_align: u32,
    /// ISO 639 language code, empty if undetermined.
    pub language: String,
    /// Stream flags.
    pub flags: StreamFlags,
}

impl Stream {
    fn new(codec_id: CodecId, kind: MediaKind) -> Self {
        Self {
            codec_id,
            kind,
            codec_tag: 0,
            extradata: None,
            width: 0,
            height: 0,
            sample_aspect_ratio: Rational::ZERO,
            sample_rate: 0,
            channels: 0,
            bit_rate: 0,
            block_align: 0,
            language: String::new(),
            flags: StreamFlags::empty(),
        }
    }

    /// Create a video stream descriptor.
    pub fn video(codec_id: CodecId, width: u32, height: u32) -> Self {
        let mut s = Self::new(codec_id, MediaKind::Video);
        s.width = width;
        s.height = height;
        s
    }

    /// Create an audio stream descriptor.
    pub fn audio(codec_id: CodecId, sample_rate: u32, channels: u32) -> Self {
        let mut s = Self::new(codec_id, MediaKind::Audio);
        s.sample_rate = sample_rate;
        s.channels = channels;
        s
    }

    /// Create a subtitle stream descriptor.
    pub fn subtitle(codec_id: CodecId) -> Self {
        Self::new(codec_id, MediaKind::Subtitle)
    }

    /// Create a descriptor of some other (unmuxable) kind, e.g. data.
    pub fn other(codec_id: CodecId) -> Self {
        Self::new(codec_id, MediaKind::Other)
    }

    /// Attach out-of-band codec initialization data.
    pub fn with_extradata(mut self, extradata: Vec<u8>) -> Self {
        self.extradata = Some(extradata);
        self
    }

    /// Set the container codec tag.
    pub fn with_codec_tag(mut self, tag: u32) -> Self {
        self.codec_tag = tag;
        self
    }

    /// Set the sample aspect ratio.
    pub fn with_sample_aspect_ratio(mut self, sar: Rational) -> Self {
        self.sample_aspect_ratio = sar;
        self
    }

    /// Set the ISO 639 language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the average bit rate.
    pub fn with_bit_rate(mut self, bit_rate: u32) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /// Set the block alignment.
    pub fn with_block_align(mut self, block_align: u32) -> Self {
        self.block_align = block_align;
        self
    }

    /// Set stream flags.
    pub fn with_flags(mut self, flags: StreamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Extradata as a slice, empty if none.
    pub fn extradata_bytes(&self) -> &[u8] {
        self.extradata.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_builders() {
        let v = Stream::video(CodecId::H264, 1920, 1080)
            .with_sample_aspect_ratio(Rational::new(4, 3))
            .with_language("eng");
        assert_eq!(v.kind, MediaKind::Video);
        assert_eq!(v.width, 1920);
        assert_eq!(v.sample_aspect_ratio.num, 4);
        assert_eq!(v.language, "eng");

        let a = Stream::audio(CodecId::Aac, 48000, 2).with_extradata(vec![0x12, 0x10]);
        assert_eq!(a.kind, MediaKind::Audio);
        assert_eq!(a.sample_rate, 48000);
        assert_eq!(a.extradata_bytes(), &[0x12, 0x10]);
    }

    #[test]
    fn test_bits_per_sample() {
        assert_eq!(CodecId::PcmS16Le.bits_per_sample(), 16);
        assert_eq!(CodecId::PcmU8.bits_per_sample(), 8);
        assert_eq!(CodecId::Mp3.bits_per_sample(), 0);
        assert_eq!(CodecId::H264.bits_per_sample(), 0);
    }

    #[test]
    fn test_empty_extradata() {
        let s = Stream::subtitle(CodecId::TextUtf8);
        assert!(s.extradata_bytes().is_empty());
    }
}
