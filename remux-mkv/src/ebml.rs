//! EBML primitive writing over a seekable byte sink.
//!
//! EBML is the binary format underlying Matroska. Element IDs and sizes are
//! variable-length integers (VINTs); master elements here are always opened
//! with an 8-byte "unknown size" sentinel that is back-patched on close, so
//! the muxer stays single-pass over its input.

use crate::elements::VOID;
use crate::error::Result;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Seek, SeekFrom, Write};

/// Maximum VINT length in bytes.
pub const MAX_VINT_LENGTH: usize = 8;

/// Sizes at or above this value cannot be represented and are written as
/// "unknown" instead.
pub const MAX_EBML_SIZE: u64 = (1 << 56) - 1;

/// Number of bytes the canonical encoding of an element ID occupies.
///
/// IDs are written verbatim; their VINT marker bits are part of the nominal
/// value, so the length follows from the magnitude alone.
pub fn ebml_id_size(id: u32) -> usize {
    let log = (u64::from(id) + 1).ilog2() as i32;
    ((log - 1) / 7 + 1) as usize
}

/// Minimum number of bytes needed to encode a size as a VINT.
pub fn ebml_size_bytes(size: u64) -> usize {
    let mut bytes = 1;
    while (u128::from(size) + 1) >> (bytes * 7) != 0 {
        bytes += 1;
    }
    bytes
}

/// Token returned by [`EbmlWriter::open_master`], carrying the file position
/// of the master element's payload start.
#[derive(Debug, Clone, Copy)]
#[must_use = "an opened master element must be closed"]
pub struct MasterToken {
    payload_start: u64,
}

impl MasterToken {
    /// File position immediately after the size sentinel.
    pub fn payload_start(&self) -> u64 {
        self.payload_start
    }
}

/// EBML writer over a seekable byte sink.
pub struct EbmlWriter<W> {
    sink: W,
}

impl<W: Write + Seek> EbmlWriter<W> {
    /// Create a new writer.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consume the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Mutable access to the sink, for collaborators that write their own
    /// byte layouts (e.g. RIFF structures inside a CodecPrivate).
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Current sink position.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.sink.stream_position()?)
    }

    /// Seek to an absolute sink position.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.sink.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Write raw bytes.
    pub fn put_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.sink.write_all(buf)?;
        Ok(())
    }

    /// Write a single byte.
    pub fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.sink.write_u8(byte)?;
        Ok(())
    }

    /// Write a signed 16-bit big-endian integer.
    pub fn put_i16(&mut self, val: i16) -> Result<()> {
        self.sink.write_i16::<BigEndian>(val)?;
        Ok(())
    }

    /// Write an element ID in its canonical byte length.
    pub fn put_id(&mut self, id: u32) -> Result<()> {
        let len = ebml_id_size(id);
        for i in (0..len).rev() {
            self.sink.write_u8((id >> (i * 8)) as u8)?;
        }
        Ok(())
    }

    /// Write an EBML size meaning "unknown size".
    ///
    /// `bytes` is the number of bytes the size should occupy, at most 8.
    pub fn put_size_unknown(&mut self, bytes: usize) -> Result<()> {
        let bytes = bytes.clamp(1, MAX_VINT_LENGTH);
        let value = ((1u128 << (bytes * 7 + 1)) - 1) as u64;
        for i in (0..bytes).rev() {
            self.sink.write_u8((value >> (i * 8)) as u8)?;
        }
        Ok(())
    }

    /// Write a size VINT in `max(min_bytes, ebml_size_bytes(size))` bytes.
    ///
    /// Sizes at or above 2^56 - 1 are undefined in EBML and are written as a
    /// one-byte "unknown" size instead.
    pub fn put_size(&mut self, size: u64, min_bytes: usize) -> Result<()> {
        if size >= MAX_EBML_SIZE {
            return self.put_size_unknown(1);
        }
        let bytes = min_bytes.max(ebml_size_bytes(size)).min(MAX_VINT_LENGTH);
        let value = size | 1u64 << (bytes * 7);
        for i in (0..bytes).rev() {
            self.sink.write_u8((value >> (i * 8)) as u8)?;
        }
        Ok(())
    }

    /// Write an unsigned integer child element in the smallest byte width.
    pub fn put_uint(&mut self, id: u32, val: u64) -> Result<()> {
        let mut bytes = 1;
        while bytes < 8 && (val >> (bytes * 8)) != 0 {
            bytes += 1;
        }

        self.put_id(id)?;
        self.put_size(bytes as u64, 0)?;
        for i in (0..bytes).rev() {
            self.sink.write_u8((val >> (i * 8)) as u8)?;
        }
        Ok(())
    }

    /// Write a float child element, always as 8-byte IEEE-754 big-endian.
    pub fn put_float(&mut self, id: u32, val: f64) -> Result<()> {
        self.put_id(id)?;
        self.put_size(8, 0)?;
        self.sink.write_f64::<BigEndian>(val)?;
        Ok(())
    }

    /// Write a binary child element.
    pub fn put_binary(&mut self, id: u32, buf: &[u8]) -> Result<()> {
        self.put_id(id)?;
        self.put_size(buf.len() as u64, 0)?;
        self.sink.write_all(buf)?;
        Ok(())
    }

    /// Write a string child element.
    pub fn put_string(&mut self, id: u32, s: &str) -> Result<()> {
        self.put_binary(id, s.as_bytes())
    }

    /// Write a Void element occupying `total_len` bytes in all.
    ///
    /// Only the ID and size fields are written; the cursor is then moved to
    /// the end of the region, leaving the remaining bytes untouched. Useful
    /// for reserving space to be back-patched later. Lengths below 2 cannot
    /// be encoded and are ignored.
    pub fn put_void(&mut self, total_len: u64) -> Result<()> {
        if total_len < 2 {
            return Ok(());
        }
        let start = self.position()?;
        self.put_id(VOID)?;
        // The size field itself consumes part of the region: 1 byte when the
        // remainder fits a 1-byte VINT, 8 bytes otherwise.
        if total_len < 10 {
            self.put_size(total_len - 1, 0)?;
        } else {
            self.put_size(total_len - 9, 8)?;
        }
        self.seek(start + total_len)
    }

    /// Open a master element: ID followed by an 8-byte unknown-size sentinel.
    pub fn open_master(&mut self, id: u32) -> Result<MasterToken> {
        self.put_id(id)?;
        self.put_size_unknown(8)?;
        Ok(MasterToken {
            payload_start: self.position()?,
        })
    }

    /// Close a master element, back-patching its real payload size into the
    /// 8-byte reservation.
    pub fn close_master(&mut self, token: MasterToken) -> Result<()> {
        let pos = self.position()?;
        self.seek(token.payload_start - 8)?;
        self.put_size(pos - token.payload_start, 8)?;
        self.seek(pos)
    }

    /// Write a Xiph-style laced size: `size / 255` bytes of 0xFF followed by
    /// one byte of `size % 255`.
    pub fn put_xiph_size(&mut self, size: usize) -> Result<()> {
        for _ in 0..size / 255 {
            self.sink.write_u8(255)?;
        }
        self.sink.write_u8((size % 255) as u8)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn writer() -> EbmlWriter<Cursor<Vec<u8>>> {
        EbmlWriter::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_id_size() {
        assert_eq!(ebml_id_size(0xEC), 1);
        assert_eq!(ebml_id_size(0x4286), 2);
        assert_eq!(ebml_id_size(0x2AD7B1), 3);
        assert_eq!(ebml_id_size(0x1A45DFA3), 4);
    }

    #[test]
    fn test_size_bytes_boundaries() {
        assert_eq!(ebml_size_bytes(0), 1);
        assert_eq!(ebml_size_bytes(126), 1);
        assert_eq!(ebml_size_bytes(127), 2);
        assert_eq!(ebml_size_bytes(16382), 2);
        assert_eq!(ebml_size_bytes(16383), 3);
        assert_eq!(ebml_size_bytes((1 << 56) - 2), 8);
    }

    #[test]
    fn test_size_bytes_formula() {
        // ebml_size_bytes(n) == ceil(log2(n + 2) / 7)
        for n in [0u64, 1, 100, 127, 128, 16383, 16384, 1 << 21, (1 << 49) - 2] {
            let expected = (((n + 2) as f64).log2() / 7.0).ceil() as usize;
            assert_eq!(ebml_size_bytes(n), expected, "n = {n}");
        }
    }

    #[test]
    fn test_put_id() {
        let mut w = writer();
        w.put_id(0x1A45DFA3).unwrap();
        w.put_id(0xEC).unwrap();
        assert_eq!(w.into_inner().into_inner(), [0x1A, 0x45, 0xDF, 0xA3, 0xEC]);
    }

    #[test]
    fn test_put_size_minimal() {
        let mut w = writer();
        w.put_size(1, 0).unwrap();
        w.put_size(129, 0).unwrap();
        assert_eq!(w.into_inner().into_inner(), [0x81, 0x40, 0x81]);
    }

    #[test]
    fn test_put_size_min_bytes() {
        let mut w = writer();
        w.put_size(3, 8).unwrap();
        assert_eq!(
            w.into_inner().into_inner(),
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03]
        );
    }

    #[test]
    fn test_put_size_width() {
        // put_size(n, m) writes exactly max(m, ebml_size_bytes(n)) bytes
        for (n, m) in [(0u64, 0usize), (127, 0), (127, 1), (5, 4), (16384, 2)] {
            let mut w = writer();
            w.put_size(n, m).unwrap();
            let written = w.into_inner().into_inner().len();
            assert_eq!(written, m.max(ebml_size_bytes(n)), "n = {n}, m = {m}");
        }
    }

    #[test]
    fn test_put_size_unknown() {
        let mut w = writer();
        w.put_size_unknown(1).unwrap();
        w.put_size_unknown(8).unwrap();
        assert_eq!(
            w.into_inner().into_inner(),
            [0xFF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_put_size_overflow_writes_unknown() {
        let mut w = writer();
        w.put_size(MAX_EBML_SIZE, 0).unwrap();
        assert_eq!(w.into_inner().into_inner(), [0xFF]);
    }

    #[test]
    fn test_put_uint_widths() {
        let mut w = writer();
        w.put_uint(0x83, 0).unwrap();
        w.put_uint(0x83, 255).unwrap();
        w.put_uint(0x83, 256).unwrap();
        assert_eq!(
            w.into_inner().into_inner(),
            [0x83, 0x81, 0x00, 0x83, 0x81, 0xFF, 0x83, 0x82, 0x01, 0x00]
        );
    }

    #[test]
    fn test_put_float() {
        let mut w = writer();
        w.put_float(0x4489, 1.0).unwrap();
        let buf = w.into_inner().into_inner();
        assert_eq!(buf.len(), 2 + 1 + 8);
        assert_eq!(&buf[..3], [0x44, 0x89, 0x88]);
        assert_eq!(&buf[3..], 1.0f64.to_bits().to_be_bytes());
    }

    #[test]
    fn test_put_void_small() {
        let mut w = writer();
        w.put_void(5).unwrap();
        w.put_byte(0xAB).unwrap();
        let buf = w.into_inner().into_inner();
        assert_eq!(buf.len(), 6);
        assert_eq!(&buf[..2], [0xEC, 0x84]);
        assert_eq!(buf[5], 0xAB);
    }

    #[test]
    fn test_put_void_large() {
        let mut w = writer();
        w.put_void(20).unwrap();
        assert_eq!(w.position().unwrap(), 20);
        w.put_byte(0xAB).unwrap();
        let buf = w.into_inner().into_inner();
        assert_eq!(buf[0], 0xEC);
        // 8-byte size of value 20 - 9 = 11
        assert_eq!(
            &buf[1..9],
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0B]
        );
        assert_eq!(buf[20], 0xAB);
    }

    #[test]
    fn test_master_backpatch() {
        let mut w = writer();
        let master = w.open_master(0x1A45DFA3).unwrap();
        w.put_uint(0x4286, 1).unwrap();
        w.close_master(master).unwrap();
        let buf = w.into_inner().into_inner();
        // 4-byte ID, 8-byte size, 4-byte child
        assert_eq!(buf.len(), 16);
        assert_eq!(
            &buf[4..12],
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04]
        );
    }

    #[test]
    fn test_close_master_restores_position() {
        let mut w = writer();
        let master = w.open_master(0xE0).unwrap();
        w.put_uint(0xB0, 640).unwrap();
        let before = w.position().unwrap();
        w.close_master(master).unwrap();
        assert_eq!(w.position().unwrap(), before);
    }

    #[test]
    fn test_xiph_size() {
        let mut w = writer();
        w.put_xiph_size(30).unwrap();
        w.put_xiph_size(255).unwrap();
        w.put_xiph_size(600).unwrap();
        assert_eq!(
            w.into_inner().into_inner(),
            [30, 0xFF, 0, 0xFF, 0xFF, 90]
        );
    }
}
