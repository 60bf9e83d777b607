//! # remux-mkv
//!
//! Matroska container muxing for the remux library.
//!
//! This crate assembles encoded audio, video, and subtitle packets into a
//! standards-conformant Matroska/EBML file over any seekable byte sink:
//!
//! - EBML (Extensible Binary Meta Language) primitive writing with
//!   variable-length integer (VINT) encoding and back-patched master sizes
//! - Clustered packet layout with byte and time rollover thresholds
//! - Cue index entries for every video keyframe
//! - A reserved seek head at the segment start and a cluster seek head at
//!   its end
//! - Per-codec CodecPrivate shaping (Xiph lacing, FLAC streaminfo, AAC
//!   sample-rate extraction) with a VFW/ACM fallback for everything else
//! - An optional bit-exact mode that suppresses all nondeterministic fields
//!
//! ## Example: Muxing an MKV file
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufWriter;
//! use remux_core::{CodecId, Packet, PacketFlags, Stream};
//! use remux_mkv::{format, MkvMuxer};
//!
//! let file = File::create("output.mkv").unwrap();
//! let mut muxer = MkvMuxer::with_format(BufWriter::new(file), format::MATROSKA);
//!
//! muxer.add_stream(Stream::video(CodecId::H264, 1920, 1080)).unwrap();
//! muxer.write_header().unwrap();
//!
//! let packet = Packet::new(vec![0u8; 1024])
//!     .with_timestamps(0, 0)
//!     .with_duration(40)
//!     .with_flags(PacketFlags::KEYFRAME);
//! muxer.write_packet(&packet).unwrap();
//!
//! muxer.write_trailer().unwrap();
//! ```

pub mod cues;
pub mod ebml;
pub mod elements;
pub mod error;
pub mod format;
pub mod muxer;
pub mod riff;
pub mod seekhead;
pub mod xiph;

mod codecpriv;

pub use error::{MkvError, Result};
pub use format::OutputFormat;
pub use muxer::{MkvMuxer, MuxerOptions};
