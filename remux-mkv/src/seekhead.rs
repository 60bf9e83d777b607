//! Seek head construction.
//!
//! A seek head indexes level-1 elements by `(element ID, segment-relative
//! offset)`. The muxer writes two of them: a bounded one reserved near the
//! start of the segment (finalized into its reservation during the trailer)
//! and an unbounded one appended after the last cluster.

use crate::ebml::{ebml_id_size, EbmlWriter};
use crate::elements::{SEEK, SEEK_HEAD, SEEK_ID, SEEK_POSITION};
use crate::error::{MkvError, Result};
use std::io::{Seek, Write};

// Worst-case bytes per entry with 8-byte master size reservations, plus the
// SeekHead ID and size and enough slack for a trailing Void element.
const BYTES_PER_ENTRY: u64 = 28;
const HEAD_OVERHEAD: u64 = 13;

#[derive(Debug, Clone, Copy)]
struct SeekEntry {
    id: u32,
    segment_pos: u64,
}

/// Builder for a `SeekHead` element.
#[derive(Debug)]
pub struct SeekHead {
    segment_offset: u64,
    /// File position of the reservation, if any.
    reservation: Option<Reservation>,
    entries: Vec<SeekEntry>,
}

#[derive(Debug, Clone, Copy)]
struct Reservation {
    filepos: u64,
    size: u64,
    max_entries: usize,
}

impl SeekHead {
    /// Start a seek head with space for at most `max_entries` entries
    /// reserved at the current position via a Void element.
    pub fn reserved<W: Write + Seek>(
        w: &mut EbmlWriter<W>,
        segment_offset: u64,
        max_entries: usize,
    ) -> Result<Self> {
        let filepos = w.position()?;
        let size = max_entries as u64 * BYTES_PER_ENTRY + HEAD_OVERHEAD;
        w.put_void(size)?;
        Ok(Self {
            segment_offset,
            reservation: Some(Reservation {
                filepos,
                size,
                max_entries,
            }),
            entries: Vec::new(),
        })
    }

    /// Start an unbounded seek head that will be written wherever the cursor
    /// is when it is finalized.
    pub fn appended(segment_offset: u64) -> Self {
        Self {
            segment_offset,
            reservation: None,
            entries: Vec::new(),
        }
    }

    /// Record an element for indexing. `filepos` is the absolute offset of
    /// the element; the stored position is relative to the segment payload.
    pub fn add_entry(&mut self, id: u32, filepos: u64) -> Result<()> {
        if let Some(res) = self.reservation {
            if self.entries.len() >= res.max_entries {
                return Err(MkvError::SeekHeadFull {
                    capacity: res.max_entries,
                });
            }
        }
        self.entries.push(SeekEntry {
            id,
            segment_pos: filepos - self.segment_offset,
        });
        Ok(())
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the `SeekHead` element and consume the builder.
    ///
    /// A reserved head is written into its reservation, the remainder of the
    /// reservation is re-voided, and the cursor is restored; an appended head
    /// is written in place. Returns the absolute file offset of the element.
    pub fn finalize<W: Write + Seek>(self, w: &mut EbmlWriter<W>) -> Result<u64> {
        let currentpos = w.position()?;

        if let Some(res) = self.reservation {
            w.seek(res.filepos)?;
        }

        let head = w.open_master(SEEK_HEAD)?;
        for entry in &self.entries {
            let seek = w.open_master(SEEK)?;
            w.put_id(SEEK_ID)?;
            w.put_size(ebml_id_size(entry.id) as u64, 0)?;
            w.put_id(entry.id)?;
            w.put_uint(SEEK_POSITION, entry.segment_pos)?;
            w.close_master(seek)?;
        }
        w.close_master(head)?;

        if let Some(res) = self.reservation {
            let remaining = res.filepos + res.size - w.position()?;
            w.put_void(remaining)?;
            w.seek(currentpos)?;
            return Ok(res.filepos);
        }
        Ok(currentpos)
    }
}
