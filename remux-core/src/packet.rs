//! Packet abstractions for encoded media data.
//!
//! Packets carry compressed payloads from a demuxer or encoder into a muxer.
//! Timestamps are expressed in milliseconds, the de-facto Matroska timescale.

use bitflags::bitflags;
use std::borrow::Cow;
use std::fmt;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
        /// Packet data is corrupted.
        const CORRUPT = 0x0002;
        /// Packet should be discarded.
        const DISCARD = 0x0004;
    }
}

/// An encoded media packet.
///
/// Packets can own their data or reference external data (zero-copy).
#[derive(Clone)]
pub struct Packet<'a> {
    /// The packet data.
    data: Cow<'a, [u8]>,
    /// Presentation timestamp in milliseconds.
    pub pts: i64,
    /// Decode timestamp in milliseconds.
    pub dts: i64,
    /// Duration of the packet in milliseconds.
    pub duration: i32,
    /// Stream index this packet belongs to.
    pub stream_index: u32,
    /// Packet flags.
    pub flags: PacketFlags,
}

impl<'a> Packet<'a> {
    /// Create a new packet with owned data.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            pts: 0,
            dts: 0,
            duration: 0,
            stream_index: 0,
            flags: PacketFlags::empty(),
        }
    }

    /// Create a new packet referencing external data.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            pts: 0,
            dts: 0,
            duration: 0,
            stream_index: 0,
            flags: PacketFlags::empty(),
        }
    }

    /// Get the packet data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the size of the packet data.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this packet is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Set the keyframe flag.
    pub fn set_keyframe(&mut self, keyframe: bool) {
        if keyframe {
            self.flags.insert(PacketFlags::KEYFRAME);
        } else {
            self.flags.remove(PacketFlags::KEYFRAME);
        }
    }

    /// Make the packet own its data.
    pub fn into_owned(self) -> Packet<'static> {
        Packet {
            data: Cow::Owned(self.data.into_owned()),
            pts: self.pts,
            dts: self.dts,
            duration: self.duration,
            stream_index: self.stream_index,
            flags: self.flags,
        }
    }

    /// Create a new packet with the specified timestamps.
    pub fn with_timestamps(mut self, pts: i64, dts: i64) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    /// Create a new packet with the specified duration.
    pub fn with_duration(mut self, duration: i32) -> Self {
        self.duration = duration;
        self
    }

    /// Create a new packet with the specified stream index.
    pub fn with_stream_index(mut self, index: u32) -> Self {
        self.stream_index = index;
        self
    }

    /// Create a new packet with the specified flags.
    pub fn with_flags(mut self, flags: PacketFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl<'a> fmt::Debug for Packet<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("dts", &self.dts)
            .field("duration", &self.duration)
            .field("stream_index", &self.stream_index)
            .field("flags", &self.flags)
            .finish()
    }
}

impl<'a> Default for Packet<'a> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// An owned packet suitable for storage.
pub type OwnedPacket = Packet<'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_creation() {
        let packet = Packet::new(vec![0u8; 100]);
        assert_eq!(packet.size(), 100);
        assert!(!packet.is_empty());
    }

    #[test]
    fn test_packet_from_slice() {
        let data = [1u8, 2, 3, 4, 5];
        let packet = Packet::from_slice(&data);
        assert_eq!(packet.data(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_packet_keyframe() {
        let mut packet = Packet::default();
        assert!(!packet.is_keyframe());
        packet.set_keyframe(true);
        assert!(packet.is_keyframe());
    }

    #[test]
    fn test_packet_builder() {
        let packet = Packet::new(vec![0u8; 8])
            .with_timestamps(40, 40)
            .with_duration(40)
            .with_stream_index(1)
            .with_flags(PacketFlags::KEYFRAME);
        assert_eq!(packet.pts, 40);
        assert_eq!(packet.duration, 40);
        assert_eq!(packet.stream_index, 1);
        assert!(packet.is_keyframe());
    }

    #[test]
    fn test_packet_into_owned() {
        let data = [1u8, 2, 3];
        let packet = Packet::from_slice(&data);
        let owned: Packet<'static> = packet.into_owned();
        assert_eq!(owned.data(), &[1, 2, 3]);
    }
}
