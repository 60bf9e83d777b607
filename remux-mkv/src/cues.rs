//! Cue index construction.
//!
//! Cues map `(time, track)` pairs to cluster offsets for seeking. The muxer
//! appends one entry per video keyframe; entries from different tracks that
//! share the exact same timestamp collapse into a single `CuePoint`, which
//! only works because equal-timestamp entries are appended adjacently.

use crate::ebml::EbmlWriter;
use crate::elements::{CUES, CUE_CLUSTER_POSITION, CUE_POINT, CUE_TIME, CUE_TRACK, CUE_TRACK_POSITIONS};
use crate::error::Result;
use std::io::{Seek, Write};

#[derive(Debug, Clone, Copy)]
struct CuePoint {
    pts: u64,
    track: u64,
    cluster_pos: u64,
}

/// Append-only builder for the `Cues` element.
#[derive(Debug)]
pub struct CueIndex {
    segment_offset: u64,
    entries: Vec<CuePoint>,
}

impl CueIndex {
    /// Create an empty cue index for a segment starting at `segment_offset`.
    pub fn new(segment_offset: u64) -> Self {
        Self {
            segment_offset,
            entries: Vec::new(),
        }
    }

    /// Append a cue entry. `cluster_filepos` is the absolute offset of the
    /// cluster containing the cued block.
    pub fn add(&mut self, pts: u64, track: u64, cluster_filepos: u64) {
        self.entries.push(CuePoint {
            pts,
            track,
            cluster_pos: cluster_filepos - self.segment_offset,
        });
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the `Cues` element at the current position and consume the
    /// builder. Returns the absolute file offset of the element.
    pub fn finalize<W: Write + Seek>(self, w: &mut EbmlWriter<W>) -> Result<u64> {
        let currentpos = w.position()?;
        let cues = w.open_master(CUES)?;

        let mut i = 0;
        while i < self.entries.len() {
            let pts = self.entries[i].pts;
            let cuepoint = w.open_master(CUE_POINT)?;
            w.put_uint(CUE_TIME, pts)?;

            // one CueTrackPositions per adjacent entry with this timestamp
            let mut j = i;
            while j < self.entries.len() && self.entries[j].pts == pts {
                let positions = w.open_master(CUE_TRACK_POSITIONS)?;
                w.put_uint(CUE_TRACK, self.entries[j].track)?;
                w.put_uint(CUE_CLUSTER_POSITION, self.entries[j].cluster_pos)?;
                w.close_master(positions)?;
                j += 1;
            }
            i = j;
            w.close_master(cuepoint)?;
        }

        w.close_master(cues)?;
        Ok(currentpos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn writer() -> EbmlWriter<Cursor<Vec<u8>>> {
        EbmlWriter::new(Cursor::new(Vec::new()))
    }

    fn count_occurrences(haystack: &[u8], needle: u8) -> usize {
        haystack.iter().filter(|&&b| b == needle).count()
    }

    #[test]
    fn test_empty_cues() {
        let mut w = writer();
        let pos = CueIndex::new(0).finalize(&mut w).unwrap();
        assert_eq!(pos, 0);
        let buf = w.into_inner().into_inner();
        // just the Cues ID and a back-patched zero size
        assert_eq!(&buf[..4], [0x1C, 0x53, 0xBB, 0x6B]);
        assert_eq!(
            &buf[4..],
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_positions_are_segment_relative() {
        let mut index = CueIndex::new(100);
        index.add(0, 1, 150);
        assert_eq!(index.len(), 1);

        let mut w = writer();
        index.finalize(&mut w).unwrap();
        let buf = w.into_inner().into_inner();
        // CuePoint payload starts after Cues hdr (12) + CuePoint hdr (9)
        let payload = &buf[12 + 9..];
        assert_eq!(&payload[..3], [0xB3, 0x81, 0x00]); // CueTime = 0
        let positions_payload = &payload[3 + 9..];
        assert_eq!(&positions_payload[..3], [0xF7, 0x81, 0x01]); // CueTrack = 1
        assert_eq!(&positions_payload[3..6], [0xF1, 0x81, 0x32]); // 150 - 100
    }

    #[test]
    fn test_equal_pts_entries_share_a_cuepoint() {
        let mut index = CueIndex::new(0);
        index.add(1000, 1, 500);
        index.add(1000, 2, 500);
        index.add(2000, 1, 900);

        let mut w = writer();
        index.finalize(&mut w).unwrap();
        let buf = w.into_inner().into_inner();

        // two CuePoints, three CueTrackPositions: the equal-pts group is
        // consumed exactly once (skip the Cues ID, whose third byte is 0xBB)
        let body = &buf[4..];
        assert_eq!(count_occurrences(body, 0xBB), 2);
        assert_eq!(count_occurrences(body, 0xB7), 3);
        assert_eq!(count_occurrences(body, 0xF7), 3);
    }
}
