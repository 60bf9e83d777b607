//! Matroska element definitions and codec ID mappings.
//!
//! Element IDs are the nominal values including the VINT marker bits, as
//! used throughout the EBML and Matroska specifications.

use remux_core::CodecId;

// =============================================================================
// EBML Header Elements
// =============================================================================

/// EBML Header element.
pub const EBML: u32 = 0x1A45DFA3;
/// EBML Version.
pub const EBML_VERSION: u32 = 0x4286;
/// EBML Read Version.
pub const EBML_READ_VERSION: u32 = 0x42F7;
/// EBML Max ID Length.
pub const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
/// EBML Max Size Length.
pub const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
/// EBML Doc Type.
pub const DOC_TYPE: u32 = 0x4282;
/// EBML Doc Type Version.
pub const DOC_TYPE_VERSION: u32 = 0x4287;
/// EBML Doc Type Read Version.
pub const DOC_TYPE_READ_VERSION: u32 = 0x4285;

// =============================================================================
// Segment
// =============================================================================

/// Segment (the root container for all Matroska data).
pub const SEGMENT: u32 = 0x18538067;

// =============================================================================
// Meta Seek Information
// =============================================================================

/// SeekHead (index of top-level elements).
pub const SEEK_HEAD: u32 = 0x114D9B74;
/// Seek entry.
pub const SEEK: u32 = 0x4DBB;
/// Seek ID.
pub const SEEK_ID: u32 = 0x53AB;
/// Seek Position.
pub const SEEK_POSITION: u32 = 0x53AC;

// =============================================================================
// Segment Information
// =============================================================================

/// Segment Info.
pub const INFO: u32 = 0x1549A966;
/// Segment UID.
pub const SEGMENT_UID: u32 = 0x73A4;
/// Timecode Scale (nanoseconds per timecode unit, default 1000000 = 1ms).
pub const TIMECODE_SCALE: u32 = 0x2AD7B1;
/// Duration (in timecode units).
pub const DURATION: u32 = 0x4489;
/// Title.
pub const TITLE: u32 = 0x7BA9;
/// Muxing App.
pub const MUXING_APP: u32 = 0x4D80;
/// Writing App.
pub const WRITING_APP: u32 = 0x5741;

// =============================================================================
// Cluster Elements
// =============================================================================

/// Cluster (contains blocks of media data).
pub const CLUSTER: u32 = 0x1F43B675;
/// Cluster Timecode.
pub const CLUSTER_TIMECODE: u32 = 0xE7;
/// SimpleBlock (basic block without lacing info).
pub const SIMPLE_BLOCK: u32 = 0xA3;
/// BlockGroup (block with additional info).
pub const BLOCK_GROUP: u32 = 0xA0;
/// Block.
pub const BLOCK: u32 = 0xA1;
/// Block Duration.
pub const BLOCK_DURATION: u32 = 0x9B;

// =============================================================================
// Track Elements
// =============================================================================

/// Tracks.
pub const TRACKS: u32 = 0x1654AE6B;
/// Track Entry.
pub const TRACK_ENTRY: u32 = 0xAE;
/// Track Number.
pub const TRACK_NUMBER: u32 = 0xD7;
/// Track UID.
pub const TRACK_UID: u32 = 0x73C5;
/// Track Type.
pub const TRACK_TYPE: u32 = 0x83;
/// Flag Lacing.
pub const FLAG_LACING: u32 = 0x9C;
/// Language.
pub const LANGUAGE: u32 = 0x22B59C;
/// Codec ID.
pub const CODEC_ID: u32 = 0x86;
/// Codec Private.
pub const CODEC_PRIVATE: u32 = 0x63A2;

// =============================================================================
// Video Elements
// =============================================================================

/// Video settings.
pub const VIDEO: u32 = 0xE0;
/// Pixel Width.
pub const PIXEL_WIDTH: u32 = 0xB0;
/// Pixel Height.
pub const PIXEL_HEIGHT: u32 = 0xBA;
/// Display Width.
pub const DISPLAY_WIDTH: u32 = 0x54B0;
/// Display Height.
pub const DISPLAY_HEIGHT: u32 = 0x54BA;

// =============================================================================
// Audio Elements
// =============================================================================

/// Audio settings.
pub const AUDIO: u32 = 0xE1;
/// Sampling Frequency.
pub const SAMPLING_FREQUENCY: u32 = 0xB5;
/// Output Sampling Frequency.
pub const OUTPUT_SAMPLING_FREQUENCY: u32 = 0x78B5;
/// Channels.
pub const CHANNELS: u32 = 0x9F;
/// Bit Depth.
pub const BIT_DEPTH: u32 = 0x6264;

// =============================================================================
// Cueing Data
// =============================================================================

/// Cues.
pub const CUES: u32 = 0x1C53BB6B;
/// Cue Point.
pub const CUE_POINT: u32 = 0xBB;
/// Cue Time.
pub const CUE_TIME: u32 = 0xB3;
/// Cue Track Positions.
pub const CUE_TRACK_POSITIONS: u32 = 0xB7;
/// Cue Track.
pub const CUE_TRACK: u32 = 0xF7;
/// Cue Cluster Position.
pub const CUE_CLUSTER_POSITION: u32 = 0xF1;

// =============================================================================
// Void
// =============================================================================

/// Void (padding).
pub const VOID: u32 = 0xEC;

// =============================================================================
// Track Types
// =============================================================================

/// Track type: Video.
pub const TRACK_TYPE_VIDEO: u8 = 1;
/// Track type: Audio.
pub const TRACK_TYPE_AUDIO: u8 = 2;
/// Track type: Subtitle.
pub const TRACK_TYPE_SUBTITLE: u8 = 17;

/// Matroska codec ID strings.
pub mod codec_ids {
    // Video codecs
    /// H.264 / AVC.
    pub const V_MPEG4_ISO_AVC: &str = "V_MPEG4/ISO/AVC";
    /// H.265 / HEVC.
    pub const V_MPEGH_ISO_HEVC: &str = "V_MPEGH/ISO/HEVC";
    /// MPEG-4 part 2 (ASP).
    pub const V_MPEG4_ISO_ASP: &str = "V_MPEG4/ISO/ASP";
    /// Theora.
    pub const V_THEORA: &str = "V_THEORA";
    /// VP8.
    pub const V_VP8: &str = "V_VP8";
    /// VP9.
    pub const V_VP9: &str = "V_VP9";
    /// AV1.
    pub const V_AV1: &str = "V_AV1";
    /// Motion JPEG.
    pub const V_MJPEG: &str = "V_MJPEG";
    /// Video-for-Windows fallback (BITMAPINFOHEADER in CodecPrivate).
    pub const V_MS_VFW_FOURCC: &str = "V_MS/VFW/FOURCC";

    // Audio codecs
    /// AAC, MPEG-4 low complexity.
    pub const A_AAC_MPEG4_LC: &str = "A_AAC/MPEG4/LC";
    /// MPEG audio layer 2.
    pub const A_MPEG_L2: &str = "A_MPEG/L2";
    /// MPEG audio layer 3.
    pub const A_MPEG_L3: &str = "A_MPEG/L3";
    /// AC-3.
    pub const A_AC3: &str = "A_AC3";
    /// Vorbis.
    pub const A_VORBIS: &str = "A_VORBIS";
    /// FLAC.
    pub const A_FLAC: &str = "A_FLAC";
    /// Opus.
    pub const A_OPUS: &str = "A_OPUS";
    /// PCM integer little-endian.
    pub const A_PCM_INT_LIT: &str = "A_PCM/INT/LIT";
    /// Audio Compression Manager fallback (WAVEFORMATEX in CodecPrivate).
    pub const A_MS_ACM: &str = "A_MS/ACM";

    // Subtitle codecs
    /// UTF-8 text subtitles.
    pub const S_TEXT_UTF8: &str = "S_TEXT/UTF8";
    /// ASS subtitles.
    pub const S_TEXT_ASS: &str = "S_TEXT/ASS";
}

/// Look up the Matroska-native codec ID for a codec, if one exists.
///
/// Codecs absent from this table go through the VFW/ACM fallback path.
pub fn native_codec_id(codec: CodecId) -> Option<&'static str> {
    match codec {
        CodecId::H264 => Some(codec_ids::V_MPEG4_ISO_AVC),
        CodecId::Hevc => Some(codec_ids::V_MPEGH_ISO_HEVC),
        CodecId::Mpeg4 => Some(codec_ids::V_MPEG4_ISO_ASP),
        CodecId::Theora => Some(codec_ids::V_THEORA),
        CodecId::Vp8 => Some(codec_ids::V_VP8),
        CodecId::Vp9 => Some(codec_ids::V_VP9),
        CodecId::Av1 => Some(codec_ids::V_AV1),
        CodecId::Mjpeg => Some(codec_ids::V_MJPEG),
        CodecId::Aac => Some(codec_ids::A_AAC_MPEG4_LC),
        CodecId::Mp2 => Some(codec_ids::A_MPEG_L2),
        CodecId::Mp3 => Some(codec_ids::A_MPEG_L3),
        CodecId::Ac3 => Some(codec_ids::A_AC3),
        CodecId::Vorbis => Some(codec_ids::A_VORBIS),
        CodecId::Flac => Some(codec_ids::A_FLAC),
        CodecId::Opus => Some(codec_ids::A_OPUS),
        CodecId::PcmS16Le => Some(codec_ids::A_PCM_INT_LIT),
        CodecId::TextUtf8 => Some(codec_ids::S_TEXT_UTF8),
        CodecId::Ass => Some(codec_ids::S_TEXT_ASS),
        _ => None,
    }
}
