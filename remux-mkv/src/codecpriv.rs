//! Per-codec shaping of the CodecPrivate element.

use crate::ebml::EbmlWriter;
use crate::elements::CODEC_PRIVATE;
use crate::error::{MkvError, Result};
use crate::xiph;
use remux_core::{CodecId, Stream};
use std::io::{Seek, Write};
use tracing::{debug, warn};

/// A bare FLAC streaminfo block is exactly this long.
const FLAC_STREAMINFO_SIZE: usize = 34;

/// Expected first-header lengths handed to the Xiph splitter.
const VORBIS_ID_HEADER_SIZE: usize = 30;
const THEORA_ID_HEADER_SIZE: usize = 42;

/// AAC sample rates by the 4-bit index of the audio-specific config.
const AAC_SAMPLE_RATES: [u32; 12] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// Write the CodecPrivate element for a native-codec stream, if the codec
/// calls for one.
pub(crate) fn write_codec_private<W: Write + Seek>(
    w: &mut EbmlWriter<W>,
    stream_index: u32,
    stream: &Stream,
) -> Result<()> {
    match stream.codec_id {
        CodecId::Vorbis | CodecId::Theora => write_xiph_private(w, stream_index, stream),
        CodecId::Flac => write_flac_private(w, stream_index, stream),
        _ => {
            let extradata = stream.extradata_bytes();
            if !extradata.is_empty() {
                w.put_binary(CODEC_PRIVATE, extradata)?;
            }
            Ok(())
        }
    }
}

/// Vorbis/Theora: a 0x02 packet-count byte, the Xiph-laced lengths of the
/// first two header packets, then all three packets concatenated.
fn write_xiph_private<W: Write + Seek>(
    w: &mut EbmlWriter<W>,
    stream_index: u32,
    stream: &Stream,
) -> Result<()> {
    let first_header_size = if stream.codec_id == CodecId::Vorbis {
        VORBIS_ID_HEADER_SIZE
    } else {
        THEORA_ID_HEADER_SIZE
    };

    let headers = xiph::split_headers(stream.extradata_bytes(), first_header_size)
        .map_err(|err| tag_stream(err, stream_index))?;

    let private = w.open_master(CODEC_PRIVATE)?;
    w.put_byte(2)?;
    for header in &headers[..2] {
        w.put_xiph_size(header.len())?;
    }
    for header in &headers {
        w.put_bytes(header)?;
    }
    w.close_master(private)
}

/// FLAC: extradata longer than a streaminfo block is assumed to be in
/// Matroska's layout already; a bare streaminfo gets wrapped as a single
/// laced packet.
fn write_flac_private<W: Write + Seek>(
    w: &mut EbmlWriter<W>,
    stream_index: u32,
    stream: &Stream,
) -> Result<()> {
    let extradata = stream.extradata_bytes();
    if extradata.len() < FLAC_STREAMINFO_SIZE {
        return Err(MkvError::InvalidCodecData {
            stream: stream_index,
            message: format!(
                "FLAC extradata is {} bytes, streaminfo needs {}",
                extradata.len(),
                FLAC_STREAMINFO_SIZE
            ),
        });
    }

    let private = w.open_master(CODEC_PRIVATE)?;
    if extradata.len() == FLAC_STREAMINFO_SIZE {
        debug!(stream = stream_index, "wrapping bare FLAC streaminfo packet");
        w.put_byte(0)?;
        w.put_xiph_size(extradata.len())?;
    }
    w.put_bytes(extradata)?;
    w.close_master(private)
}

fn tag_stream(err: MkvError, stream_index: u32) -> MkvError {
    match err {
        MkvError::InvalidCodecData { message, .. } => MkvError::InvalidCodecData {
            stream: stream_index,
            message,
        },
        other => other,
    }
}

/// Sniff the real (and, with SBR signaling, output) sample rate out of an
/// AAC audio-specific config.
pub(crate) fn aac_sample_rates(extradata: &[u8]) -> (Option<u32>, Option<u32>) {
    if extradata.len() < 2 {
        warn!("no AAC extradata, unable to determine sample rate");
        return (None, None);
    }

    let sri = (((extradata[0] << 1) & 0xE) | (extradata[1] >> 7)) as usize;
    if sri >= AAC_SAMPLE_RATES.len() {
        warn!(index = sri, "AAC sample rate index out of bounds");
        return (None, None);
    }
    let sample_rate = AAC_SAMPLE_RATES[sri];

    // a 5-byte config signals SBR and carries the output rate as well
    if extradata.len() == 5 {
        let sri = ((extradata[4] >> 3) & 0xF) as usize;
        if sri >= AAC_SAMPLE_RATES.len() {
            warn!(index = sri, "AAC output sample rate index out of bounds");
            return (Some(sample_rate), None);
        }
        return (Some(sample_rate), Some(AAC_SAMPLE_RATES[sri]));
    }
    (Some(sample_rate), None)
}
