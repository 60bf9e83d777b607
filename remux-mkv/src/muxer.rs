//! Matroska muxer implementation.
//!
//! The muxer is a three-phase pipeline over a seekable byte sink: the header
//! phase lays out the EBML header, segment, seek-head reservation, info, and
//! tracks; the packet phase appends blocks into size- and time-bounded
//! clusters; the trailer phase writes the cue index and the cluster
//! seek-head, then back-patches everything reserved during the header.

use crate::codecpriv;
use crate::cues::CueIndex;
use crate::ebml::{EbmlWriter, MasterToken};
use crate::elements::*;
use crate::error::{MkvError, Result};
use crate::format::OutputFormat;
use crate::riff;
use crate::seekhead::SeekHead;

use md5::{Digest, Md5};
use remux_core::{CodecId, MediaKind, Packet, Stream, StreamFlags};
use std::io::{Seek, Write};
use tracing::debug;

/// Nanoseconds per timecode unit; millisecond precision is the de-facto
/// standard timescale for mkv files.
const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;

/// Start a new cluster once the current one spans this many bytes.
const MAX_CLUSTER_SIZE: u64 = 5 * 1024 * 1024;

/// Start a new cluster once a packet is this far past the cluster origin,
/// in milliseconds. Block timecodes are signed 16-bit relative values, so
/// this keeps them well inside their range.
const MAX_CLUSTER_DURATION: i64 = 5000;

/// Entry capacity of the reserved main seek head: one slot per level-1
/// element kind currently written, with room to spare.
const MAIN_SEEKHEAD_ENTRIES: usize = 10;

/// How many leading payload bytes of a cluster-opening packet feed the
/// segment UID digest.
const UID_DIGEST_BYTES: usize = 200;

/// Identification string written as MuxingApp and WritingApp.
const IDENT: &str = concat!("remux-mkv ", env!("CARGO_PKG_VERSION"));

/// Reservation sizes for the elements back-patched by the trailer:
/// SegmentUID is 3 bytes of header plus a 16-byte binary payload, Duration
/// is 3 bytes of header plus an 8-byte float.
const SEGMENT_UID_RESERVATION: u64 = 19;
const DURATION_RESERVATION: u64 = 11;

/// Muxer options fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct MuxerOptions {
    /// Segment title, written into the Info element when non-empty.
    pub title: Option<String>,
}

/// Muxer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MuxerState {
    /// Streams may still be added.
    Initial,
    /// Header written, accepting packets.
    Writing,
    /// Trailer written.
    Finalized,
}

/// Per-segment bookkeeping, alive between header and trailer.
struct SegmentState {
    /// Absolute offset of the segment payload start.
    segment_offset: u64,
    /// Reservation offset for the SegmentUID, absent in bit-exact mode.
    segment_uid_offset: Option<u64>,
    /// Reservation offset for the Duration element.
    duration_offset: u64,
    /// Running duration: PTS plus duration of the latest packet.
    duration: i64,
    /// The open cluster.
    cluster: MasterToken,
    /// Absolute file offset of the open cluster.
    cluster_pos: u64,
    /// PTS origin of the open cluster.
    cluster_pts: i64,
    /// Bounded seek head written into its reservation by the trailer.
    main_seekhead: SeekHead,
    /// Unbounded seek head indexing every cluster, appended by the trailer.
    cluster_seekhead: SeekHead,
    /// Cue entries collected from video keyframes.
    cues: CueIndex,
    /// Digest over cluster-opening packet data, becomes the segment UID.
    md5: Md5,
}

/// Matroska muxer over a seekable byte sink.
pub struct MkvMuxer<W: Write + Seek> {
    w: EbmlWriter<W>,
    format: OutputFormat,
    options: MuxerOptions,
    streams: Vec<Stream>,
    state: MuxerState,
    segment: Option<SegmentState>,
}

impl<W: Write + Seek> MkvMuxer<W> {
    /// Create a muxer writing to `sink` under the given format registration.
    pub fn new(sink: W, format: OutputFormat, options: MuxerOptions) -> Self {
        Self {
            w: EbmlWriter::new(sink),
            format,
            options,
            streams: Vec::new(),
            state: MuxerState::Initial,
            segment: None,
        }
    }

    /// Create a muxer with default options.
    pub fn with_format(sink: W, format: OutputFormat) -> Self {
        Self::new(sink, format, MuxerOptions::default())
    }

    /// Add a stream before the header is written. Returns the stream index.
    pub fn add_stream(&mut self, stream: Stream) -> Result<u32> {
        if self.state != MuxerState::Initial {
            return Err(MkvError::InvalidState(
                "cannot add streams after the header is written".into(),
            ));
        }
        self.streams.push(stream);
        Ok(self.streams.len() as u32 - 1)
    }

    /// Consume the muxer, returning the sink.
    pub fn into_inner(self) -> W {
        self.w.into_inner()
    }

    /// Write the EBML header, open the segment, and emit everything up to
    /// and including the first (empty) cluster.
    pub fn write_header(&mut self) -> Result<()> {
        if self.state != MuxerState::Initial {
            return Err(MkvError::InvalidState("header already written".into()));
        }
        if self.streams.is_empty() {
            return Err(MkvError::InvalidState("no streams configured".into()));
        }
        let bit_exact = self.streams[0].flags.contains(StreamFlags::BIT_EXACT);

        let header = self.w.open_master(EBML)?;
        self.w.put_uint(EBML_VERSION, 1)?;
        self.w.put_uint(EBML_READ_VERSION, 1)?;
        self.w.put_uint(EBML_MAX_ID_LENGTH, 4)?;
        self.w.put_uint(EBML_MAX_SIZE_LENGTH, 8)?;
        self.w.put_string(DOC_TYPE, "matroska")?;
        self.w.put_uint(DOC_TYPE_VERSION, 2)?;
        self.w.put_uint(DOC_TYPE_READ_VERSION, 2)?;
        self.w.close_master(header)?;

        // The segment is deliberately left open-ended: its unknown-size
        // sentinel is never back-patched and readers stop at EOF.
        let _segment = self.w.open_master(SEGMENT)?;
        let segment_offset = self.w.position()?;

        // Two seek heads: a bounded one reserved here for the unique level-1
        // elements (and the other seek head), and an unbounded one appended
        // after the last cluster to index every cluster.
        let mut main_seekhead =
            SeekHead::reserved(&mut self.w, segment_offset, MAIN_SEEKHEAD_ENTRIES)?;
        let mut cluster_seekhead = SeekHead::appended(segment_offset);

        main_seekhead.add_entry(INFO, self.w.position()?)?;
        let info = self.w.open_master(INFO)?;
        self.w.put_uint(TIMECODE_SCALE, DEFAULT_TIMECODE_SCALE)?;
        if let Some(title) = self.options.title.as_deref().filter(|t| !t.is_empty()) {
            self.w.put_string(TITLE, title)?;
        }
        let mut segment_uid_offset = None;
        if !bit_exact {
            self.w.put_string(MUXING_APP, IDENT)?;
            self.w.put_string(WRITING_APP, IDENT)?;
            segment_uid_offset = Some(self.w.position()?);
            self.w.put_void(SEGMENT_UID_RESERVATION)?;
        }
        let duration_offset = self.w.position()?;
        self.w.put_void(DURATION_RESERVATION)?;
        self.w.close_master(info)?;

        main_seekhead.add_entry(TRACKS, self.w.position()?)?;
        self.write_tracks()?;

        let cluster_pos = self.w.position()?;
        cluster_seekhead.add_entry(CLUSTER, cluster_pos)?;
        let cluster = self.w.open_master(CLUSTER)?;
        self.w.put_uint(CLUSTER_TIMECODE, 0)?;

        self.segment = Some(SegmentState {
            segment_offset,
            segment_uid_offset,
            duration_offset,
            duration: 0,
            cluster,
            cluster_pos,
            cluster_pts: 0,
            main_seekhead,
            cluster_seekhead,
            cues: CueIndex::new(segment_offset),
            md5: Md5::new(),
        });
        self.state = MuxerState::Writing;
        Ok(())
    }

    /// Write the Tracks element with one TrackEntry per stream.
    fn write_tracks(&mut self) -> Result<()> {
        let tracks = self.w.open_master(TRACKS)?;
        for index in 0..self.streams.len() {
            self.write_track_entry(index as u32)?;
        }
        self.w.close_master(tracks)
    }

    fn write_track_entry(&mut self, index: u32) -> Result<()> {
        let stream = &self.streams[index as usize];

        // Unmuxable kinds are rejected outright rather than producing a
        // TrackEntry with no track type.
        if stream.kind == MediaKind::Other {
            return Err(MkvError::UnsupportedTrackType { stream: index });
        }

        let mut sample_rate = stream.sample_rate;
        let mut output_sample_rate = None;
        if stream.codec_id == CodecId::Aac {
            let (rate, output_rate) = codecpriv::aac_sample_rates(stream.extradata_bytes());
            if let Some(rate) = rate {
                sample_rate = rate;
            }
            output_sample_rate = output_rate;
        }
        let bit_depth = stream.codec_id.bits_per_sample();

        let track = self.w.open_master(TRACK_ENTRY)?;
        self.w.put_uint(TRACK_NUMBER, u64::from(index) + 1)?;
        self.w.put_uint(TRACK_UID, u64::from(index) + 1)?;
        self.w.put_uint(FLAG_LACING, 0)?; // no lacing

        if stream.language.is_empty() {
            self.w.put_string(LANGUAGE, "und")?;
        } else {
            self.w.put_string(LANGUAGE, &stream.language)?;
        }

        let native_id = native_codec_id(stream.codec_id);
        if let Some(id) = native_id {
            self.w.put_string(CODEC_ID, id)?;
            codecpriv::write_codec_private(&mut self.w, index, stream)?;
        }

        match stream.kind {
            MediaKind::Video => {
                self.w.put_uint(TRACK_TYPE, u64::from(TRACK_TYPE_VIDEO))?;

                if native_id.is_none() {
                    // no Matroska codec ID for this codec, store it the
                    // Video-for-Windows way
                    let tag = if stream.codec_tag != 0 {
                        stream.codec_tag
                    } else {
                        self.format
                            .video_tags
                            .and_then(|table| riff::codec_tag(table, stream.codec_id))
                            .unwrap_or(0)
                    };
                    self.w.put_string(CODEC_ID, codec_ids::V_MS_VFW_FOURCC)?;
                    let private = self.w.open_master(CODEC_PRIVATE)?;
                    riff::write_bmp_header(self.w.get_mut(), stream, tag)?;
                    self.w.close_master(private)?;
                }

                let video = self.w.open_master(VIDEO)?;
                self.w.put_uint(PIXEL_WIDTH, u64::from(stream.width))?;
                self.w.put_uint(PIXEL_HEIGHT, u64::from(stream.height))?;
                if !stream.sample_aspect_ratio.is_zero() {
                    // legacy encoding kept for bit compatibility: the display
                    // size fields carry the aspect ratio itself
                    self.w
                        .put_uint(DISPLAY_WIDTH, stream.sample_aspect_ratio.num as u64)?;
                    self.w
                        .put_uint(DISPLAY_HEIGHT, stream.sample_aspect_ratio.den as u64)?;
                }
                self.w.close_master(video)?;
            }
            MediaKind::Audio => {
                self.w.put_uint(TRACK_TYPE, u64::from(TRACK_TYPE_AUDIO))?;

                if native_id.is_none() {
                    // no Matroska codec ID, store it the ACM way
                    let tag = self
                        .format
                        .audio_tags
                        .and_then(|table| riff::codec_tag(table, stream.codec_id))
                        .ok_or(MkvError::UnsupportedCodec { stream: index })?;
                    self.w.put_string(CODEC_ID, codec_ids::A_MS_ACM)?;
                    let private = self.w.open_master(CODEC_PRIVATE)?;
                    riff::write_wav_header(self.w.get_mut(), stream, tag)?;
                    self.w.close_master(private)?;
                }

                let audio = self.w.open_master(AUDIO)?;
                self.w.put_uint(CHANNELS, u64::from(stream.channels))?;
                self.w
                    .put_float(SAMPLING_FREQUENCY, f64::from(sample_rate))?;
                if let Some(output_rate) = output_sample_rate {
                    self.w
                        .put_float(OUTPUT_SAMPLING_FREQUENCY, f64::from(output_rate))?;
                }
                if bit_depth != 0 {
                    self.w.put_uint(BIT_DEPTH, u64::from(bit_depth))?;
                }
                self.w.close_master(audio)?;
            }
            MediaKind::Subtitle => {
                self.w.put_uint(TRACK_TYPE, u64::from(TRACK_TYPE_SUBTITLE))?;
            }
            MediaKind::Other => unreachable!("rejected above"),
        }

        self.w.close_master(track)
    }

    /// Append one packet. Packets must arrive in non-decreasing PTS order.
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        if self.state != MuxerState::Writing {
            return Err(MkvError::InvalidState(
                "write_packet requires a written header and no trailer".into(),
            ));
        }
        let seg = self
            .segment
            .as_mut()
            .ok_or_else(|| MkvError::InvalidState("no open segment".into()))?;
        let stream = self
            .streams
            .get(packet.stream_index as usize)
            .ok_or(MkvError::StreamNotFound {
                index: packet.stream_index,
            })?;

        // start a new cluster every 5 MiB or 5 seconds
        let pos = self.w.position()?;
        if pos > seg.cluster.payload_start() + MAX_CLUSTER_SIZE
            || packet.pts - seg.cluster_pts >= MAX_CLUSTER_DURATION
        {
            debug!(offset = pos, pts = packet.pts, "starting new cluster");
            self.w.close_master(seg.cluster)?;

            let cluster_pos = self.w.position()?;
            seg.cluster_seekhead.add_entry(CLUSTER, cluster_pos)?;
            seg.cluster_pos = cluster_pos;
            seg.cluster = self.w.open_master(CLUSTER)?;
            self.w.put_uint(CLUSTER_TIMECODE, packet.pts as u64)?;
            seg.cluster_pts = packet.pts;
            seg.md5
                .update(&packet.data()[..packet.size().min(UID_DIGEST_BYTES)]);
        }

        let keyframe = packet.is_keyframe();
        if stream.kind != MediaKind::Subtitle {
            write_block(
                &mut self.w,
                SIMPLE_BLOCK,
                packet,
                seg.cluster_pts,
                (keyframe as u8) << 7,
            )?;
        } else {
            let group = self.w.open_master(BLOCK_GROUP)?;
            write_block(&mut self.w, BLOCK, packet, seg.cluster_pts, 0)?;
            self.w.put_uint(BLOCK_DURATION, packet.duration as u64)?;
            self.w.close_master(group)?;
        }

        if stream.kind == MediaKind::Video && keyframe {
            seg.cues.add(
                packet.pts as u64,
                u64::from(packet.stream_index) + 1,
                seg.cluster_pos,
            );
        }

        seg.duration = packet.pts + i64::from(packet.duration);
        Ok(())
    }

    /// Close the last cluster, write cues and seek heads, and back-patch the
    /// duration and segment UID reservations.
    pub fn write_trailer(&mut self) -> Result<()> {
        if self.state != MuxerState::Writing {
            return Err(MkvError::InvalidState(
                "write_trailer requires a written header".into(),
            ));
        }
        let seg = self
            .segment
            .take()
            .ok_or_else(|| MkvError::InvalidState("no open segment".into()))?;

        self.w.close_master(seg.cluster)?;

        let cues_pos = seg.cues.finalize(&mut self.w)?;
        let cluster_seekhead_pos = seg.cluster_seekhead.finalize(&mut self.w)?;

        let mut main_seekhead = seg.main_seekhead;
        main_seekhead.add_entry(CUES, cues_pos)?;
        main_seekhead.add_entry(SEEK_HEAD, cluster_seekhead_pos)?;
        main_seekhead.finalize(&mut self.w)?;

        debug!(duration = seg.duration, "end duration");
        let currentpos = self.w.position()?;
        self.w.seek(seg.duration_offset)?;
        self.w.put_float(DURATION, seg.duration as f64)?;

        // the digest of the sampled frame data becomes the segment UID
        if let Some(uid_offset) = seg.segment_uid_offset {
            let uid: [u8; 16] = seg.md5.finalize().into();
            self.w.seek(uid_offset)?;
            self.w.put_binary(SEGMENT_UID, &uid)?;
        }
        self.w.seek(currentpos)?;

        // the Segment master keeps its unknown-size sentinel
        self.state = MuxerState::Finalized;
        Ok(())
    }
}

/// Write one block element: VINT track number, signed 16-bit relative
/// timecode, flags, payload.
fn write_block<W: Write + Seek>(
    w: &mut EbmlWriter<W>,
    block_id: u32,
    packet: &Packet,
    cluster_pts: i64,
    flags: u8,
) -> Result<()> {
    debug!(
        size = packet.size(),
        pts = packet.pts,
        dts = packet.dts,
        duration = packet.duration,
        flags,
        "writing block"
    );
    w.put_id(block_id)?;
    w.put_size(packet.size() as u64 + 4, 0)?;
    // this assumes fewer than 127 streams
    w.put_byte(0x80 | (packet.stream_index as u8 + 1))?;
    w.put_i16((packet.pts - cluster_pts) as i16)?;
    w.put_byte(flags)?;
    w.put_bytes(packet.data())
}
