//! RIFF structures and codec tag tables for the VFW/ACM fallback.
//!
//! Codecs without a Matroska-native codec ID are stored the way AVI stores
//! them: video tracks get a BITMAPINFOHEADER, audio tracks a WAVEFORMATEX,
//! both little-endian, embedded in the track's CodecPrivate.

use byteorder::{LittleEndian, WriteBytesExt};
use remux_core::{CodecId, Stream};
use std::io::{self, Write};

/// Pack a FourCC into its little-endian u32 form.
pub const fn fourcc(tag: &[u8; 4]) -> u32 {
    tag[0] as u32 | (tag[1] as u32) << 8 | (tag[2] as u32) << 16 | (tag[3] as u32) << 24
}

/// FourCC tags for video codecs, as found in AVI files.
pub const BMP_TAGS: &[(CodecId, u32)] = &[
    (CodecId::H264, fourcc(b"H264")),
    (CodecId::Mpeg4, fourcc(b"FMP4")),
    (CodecId::Msmpeg4v3, fourcc(b"MP43")),
    (CodecId::Wmv1, fourcc(b"WMV1")),
    (CodecId::Wmv2, fourcc(b"WMV2")),
    (CodecId::Mjpeg, fourcc(b"MJPG")),
    (CodecId::Theora, fourcc(b"theo")),
];

/// TWOCC tags for audio codecs, as found in WAV files.
pub const WAV_TAGS: &[(CodecId, u32)] = &[
    (CodecId::PcmS16Le, 0x0001),
    (CodecId::PcmU8, 0x0001),
    (CodecId::Mp2, 0x0050),
    (CodecId::Mp3, 0x0055),
    (CodecId::Aac, 0x00FF),
    (CodecId::WmaV1, 0x0160),
    (CodecId::WmaV2, 0x0161),
    (CodecId::Ac3, 0x2000),
];

/// Look up the tag registered for a codec in a table.
pub fn codec_tag(table: &[(CodecId, u32)], codec: CodecId) -> Option<u32> {
    table
        .iter()
        .find(|(id, _)| *id == codec)
        .map(|&(_, tag)| tag)
}

/// Write a BITMAPINFOHEADER (40 bytes plus extradata) for a video stream.
pub fn write_bmp_header<W: Write>(w: &mut W, stream: &Stream, tag: u32) -> io::Result<()> {
    let extradata = stream.extradata_bytes();

    w.write_u32::<LittleEndian>(40 + extradata.len() as u32)?;
    w.write_u32::<LittleEndian>(stream.width)?;
    w.write_u32::<LittleEndian>(stream.height)?;
    w.write_u16::<LittleEndian>(1)?; // planes
    w.write_u16::<LittleEndian>(24)?; // depth
    w.write_u32::<LittleEndian>(tag)?; // compression
    w.write_u32::<LittleEndian>(stream.width * stream.height * 3)?;
    w.write_u32::<LittleEndian>(0)?; // horizontal pixels per meter
    w.write_u32::<LittleEndian>(0)?; // vertical pixels per meter
    w.write_u32::<LittleEndian>(0)?; // colors used
    w.write_u32::<LittleEndian>(0)?; // important colors

    w.write_all(extradata)?;
    if extradata.len() % 2 != 0 {
        w.write_u8(0)?;
    }
    Ok(())
}

/// Write a WAVEFORMATEX (18 bytes plus extradata) for an audio stream.
///
/// Plain PCM without extradata keeps the historical 16-byte WAVEFORMAT
/// layout with no cbSize field.
pub fn write_wav_header<W: Write>(w: &mut W, stream: &Stream, tag: u32) -> io::Result<()> {
    let extradata = stream.extradata_bytes();

    let bits = match stream.codec_id.bits_per_sample() {
        0 => 16,
        n => n,
    };
    let block_align = if stream.block_align != 0 {
        stream.block_align
    } else {
        stream.channels * bits / 8
    };
    let byte_rate = if stream.bit_rate != 0 {
        stream.bit_rate / 8
    } else {
        stream.sample_rate * block_align
    };

    w.write_u16::<LittleEndian>(tag as u16)?;
    w.write_u16::<LittleEndian>(stream.channels as u16)?;
    w.write_u32::<LittleEndian>(stream.sample_rate)?;
    w.write_u32::<LittleEndian>(byte_rate)?;
    w.write_u16::<LittleEndian>(block_align as u16)?;
    w.write_u16::<LittleEndian>(bits as u16)?;

    if !extradata.is_empty() {
        w.write_u16::<LittleEndian>(extradata.len() as u16)?;
        w.write_all(extradata)?;
        if extradata.len() % 2 != 0 {
            w.write_u8(0)?;
        }
    } else if tag != 0x0001 {
        w.write_u16::<LittleEndian>(0)?; // cbSize
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_packing() {
        assert_eq!(fourcc(b"MP43"), 0x3334504D);
        assert_eq!(fourcc(b"WMV1").to_le_bytes(), *b"WMV1");
    }

    #[test]
    fn test_codec_tag_lookup() {
        assert_eq!(codec_tag(BMP_TAGS, CodecId::Msmpeg4v3), Some(fourcc(b"MP43")));
        assert_eq!(codec_tag(WAV_TAGS, CodecId::Mp2), Some(0x0050));
        assert_eq!(codec_tag(WAV_TAGS, CodecId::Cook), None);
        assert_eq!(codec_tag(BMP_TAGS, CodecId::Vp9), None);
    }

    #[test]
    fn test_bmp_header_layout() {
        let stream = remux_core::Stream::video(CodecId::Msmpeg4v3, 320, 240);
        let mut buf = Vec::new();
        write_bmp_header(&mut buf, &stream, fourcc(b"MP43")).unwrap();

        assert_eq!(buf.len(), 40);
        assert_eq!(&buf[0..4], &40u32.to_le_bytes());
        assert_eq!(&buf[4..8], &320u32.to_le_bytes());
        assert_eq!(&buf[8..12], &240u32.to_le_bytes());
        assert_eq!(&buf[12..14], &1u16.to_le_bytes());
        assert_eq!(&buf[16..20], b"MP43");
    }

    #[test]
    fn test_bmp_header_with_extradata() {
        let stream = remux_core::Stream::video(CodecId::Mpeg4, 320, 240)
            .with_extradata(vec![0xAA, 0xBB, 0xCC]);
        let mut buf = Vec::new();
        write_bmp_header(&mut buf, &stream, fourcc(b"FMP4")).unwrap();

        // extradata plus one pad byte to even length
        assert_eq!(buf.len(), 44);
        assert_eq!(&buf[0..4], &43u32.to_le_bytes());
        assert_eq!(&buf[40..43], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(buf[43], 0);
    }

    #[test]
    fn test_wav_header_pcm() {
        let stream = remux_core::Stream::audio(CodecId::PcmS16Le, 44100, 2);
        let mut buf = Vec::new();
        write_wav_header(&mut buf, &stream, 0x0001).unwrap();

        // classic 16-byte WAVEFORMAT, no cbSize
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[0..2], &1u16.to_le_bytes());
        assert_eq!(&buf[2..4], &2u16.to_le_bytes());
        assert_eq!(&buf[4..8], &44100u32.to_le_bytes());
        assert_eq!(&buf[8..12], &(44100u32 * 4).to_le_bytes());
        assert_eq!(&buf[12..14], &4u16.to_le_bytes());
        assert_eq!(&buf[14..16], &16u16.to_le_bytes());
    }

    #[test]
    fn test_wav_header_compressed() {
        let stream = remux_core::Stream::audio(CodecId::WmaV2, 48000, 2)
            .with_bit_rate(128_000)
            .with_block_align(1485)
            .with_extradata(vec![0x01, 0x02, 0x03, 0x04]);
        let mut buf = Vec::new();
        write_wav_header(&mut buf, &stream, 0x0161).unwrap();

        assert_eq!(buf.len(), 22);
        assert_eq!(&buf[0..2], &0x0161u16.to_le_bytes());
        assert_eq!(&buf[8..12], &16000u32.to_le_bytes());
        assert_eq!(&buf[12..14], &1485u16.to_le_bytes());
        assert_eq!(&buf[16..18], &4u16.to_le_bytes()); // cbSize
        assert_eq!(&buf[18..22], &[0x01, 0x02, 0x03, 0x04]);
    }
}
