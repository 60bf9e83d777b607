//! # remux-core
//!
//! Core types for the remux container library.
//!
//! This crate provides the building blocks shared by the container muxers:
//! - Error handling types
//! - Encoded packet abstractions
//! - Stream descriptors and codec identifiers
//! - Rational math for aspect ratios

pub mod error;
pub mod packet;
pub mod rational;
pub mod stream;

pub use error::{Error, Result};
pub use packet::{Packet, PacketFlags};
pub use rational::Rational;
pub use stream::{CodecId, MediaKind, Stream, StreamFlags};
