use crate::dta::encoding;
use crate::dta::error::{Error, Result};
use crate::dta::types::Endian;
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use encoding_rs::Encoding;
use std::io::{Read, Write};

// One reserved bit pattern per storage kind denotes a missing value.
pub const BYTE_MISSING: i8 = 0x7f;
pub const INT_MISSING: i16 = 0x7fff;
pub const LONG_MISSING: i32 = 0x7fff_ffff;
pub const FLOAT_MISSING_BITS: u32 = 0x7f00_0000; // 2^127
pub const DOUBLE_MISSING_BITS: u64 = 0x7fe0_0000_0000_0000; // 2^1023

/// The format assumes IEEE 4-byte ints and floats and 8-byte doubles exist
/// natively. Checked once before any I/O.
pub(crate) fn verify_platform() -> Result<()> {
    let ieee = std::mem::size_of::<i32>() == 4
        && std::mem::size_of::<f32>() == 4
        && std::mem::size_of::<f64>() == 8
        && 1f64.to_bits() == 0x3ff0_0000_0000_0000;
    if ieee {
        Ok(())
    } else {
        Err(Error::UnsupportedPlatform)
    }
}

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    Ok(reader.read_u8()?)
}

/// Shorts are defined byte-by-byte in the file's declared order, not as a
/// machine word, so they never go through the word swap.
pub(crate) fn read_i16_raw<R: Read>(reader: &mut R, endian: Endian) -> Result<i16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    let v = match endian {
        Endian::Big => (u16::from(buf[0]) << 8) | u16::from(buf[1]),
        Endian::Little => (u16::from(buf[1]) << 8) | u16::from(buf[0]),
    };
    Ok(v as i16)
}

pub(crate) fn read_i32_raw<R: Read>(reader: &mut R, endian: Endian) -> Result<i32> {
    let v = reader.read_i32::<NativeEndian>()?;
    Ok(if endian == Endian::native() {
        v
    } else {
        v.swap_bytes()
    })
}

pub fn read_i8<R: Read>(reader: &mut R) -> Result<Option<i8>> {
    let v = reader.read_i8()?;
    Ok(if v == BYTE_MISSING { None } else { Some(v) })
}

pub fn read_i16<R: Read>(reader: &mut R, endian: Endian) -> Result<Option<i16>> {
    let v = read_i16_raw(reader, endian)?;
    Ok(if v == INT_MISSING { None } else { Some(v) })
}

pub fn read_i32<R: Read>(reader: &mut R, endian: Endian) -> Result<Option<i32>> {
    let v = read_i32_raw(reader, endian)?;
    Ok(if v == LONG_MISSING { None } else { Some(v) })
}

pub fn read_f32<R: Read>(reader: &mut R, endian: Endian) -> Result<Option<f32>> {
    let bits = reader.read_u32::<NativeEndian>()?;
    let bits = if endian == Endian::native() {
        bits
    } else {
        bits.swap_bytes()
    };
    Ok(if bits == FLOAT_MISSING_BITS {
        None
    } else {
        Some(f32::from_bits(bits))
    })
}

pub fn read_f64<R: Read>(reader: &mut R, endian: Endian) -> Result<Option<f64>> {
    let bits = reader.read_u64::<NativeEndian>()?;
    let bits = if endian == Endian::native() {
        bits
    } else {
        bits.swap_bytes()
    };
    Ok(if bits == DOUBLE_MISSING_BITS {
        None
    } else {
        Some(f64::from_bits(bits))
    })
}

// Output always uses the running platform's order; the header declares it.

pub(crate) fn write_u8<W: Write>(writer: &mut W, v: u8) -> Result<()> {
    Ok(writer.write_u8(v)?)
}

pub(crate) fn write_i16_raw<W: Write>(writer: &mut W, v: i16) -> Result<()> {
    let v = v as u16;
    let buf = match Endian::native() {
        Endian::Big => [(v >> 8) as u8, v as u8],
        Endian::Little => [v as u8, (v >> 8) as u8],
    };
    Ok(writer.write_all(&buf)?)
}

pub(crate) fn write_i32_raw<W: Write>(writer: &mut W, v: i32) -> Result<()> {
    Ok(writer.write_i32::<NativeEndian>(v)?)
}

pub fn write_i8<W: Write>(writer: &mut W, v: Option<i8>) -> Result<()> {
    Ok(writer.write_i8(v.unwrap_or(BYTE_MISSING))?)
}

pub fn write_i16<W: Write>(writer: &mut W, v: Option<i16>) -> Result<()> {
    write_i16_raw(writer, v.unwrap_or(INT_MISSING))
}

pub fn write_i32<W: Write>(writer: &mut W, v: Option<i32>) -> Result<()> {
    write_i32_raw(writer, v.unwrap_or(LONG_MISSING))
}

pub fn write_f32<W: Write>(writer: &mut W, v: Option<f32>) -> Result<()> {
    let bits = match v {
        Some(x) if x.is_finite() => x.to_bits(),
        _ => FLOAT_MISSING_BITS,
    };
    Ok(writer.write_u32::<NativeEndian>(bits)?)
}

/// Non-finite values have no wire representation and become the sentinel.
pub fn write_f64<W: Write>(writer: &mut W, v: Option<f64>) -> Result<()> {
    let bits = match v {
        Some(x) if x.is_finite() => x.to_bits(),
        _ => DOUBLE_MISSING_BITS,
    };
    Ok(writer.write_u64::<NativeEndian>(bits)?)
}

pub(crate) fn read_bytes<R: Read>(reader: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read an `n`-byte descriptor field, trimming at the first NUL.
pub(crate) fn read_fixed_string<R: Read>(
    reader: &mut R,
    n: usize,
    encoding: &'static Encoding,
) -> Result<String> {
    let buf = read_bytes(reader, n)?;
    Ok(encoding::trimmed_string(&buf, encoding))
}

/// Write `s` into an `n`-byte zero-terminated descriptor field. At most
/// `n - 1` bytes of text are kept so the terminator always fits.
pub(crate) fn write_fixed_string<W: Write>(
    writer: &mut W,
    s: &str,
    n: usize,
    encoding: &'static Encoding,
) -> Result<()> {
    let encoded = encoding::encode_string(s, encoding);
    let mut buf = vec![0u8; n];
    let copy_len = encoded.len().min(n.saturating_sub(1));
    buf[..copy_len].copy_from_slice(&encoded[..copy_len]);
    Ok(writer.write_all(&buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sentinel_reads_as_missing() {
        let mut buf = Vec::new();
        write_i8(&mut buf, None).unwrap();
        write_i16(&mut buf, None).unwrap();
        write_i32(&mut buf, None).unwrap();
        write_f32(&mut buf, None).unwrap();
        write_f64(&mut buf, None).unwrap();

        let native = Endian::native();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_i8(&mut cursor).unwrap(), None);
        assert_eq!(read_i16(&mut cursor, native).unwrap(), None);
        assert_eq!(read_i32(&mut cursor, native).unwrap(), None);
        assert_eq!(read_f32(&mut cursor, native).unwrap(), None);
        assert_eq!(read_f64(&mut cursor, native).unwrap(), None);
    }

    #[test]
    fn values_roundtrip_exactly() {
        let native = Endian::native();
        let mut buf = Vec::new();
        write_i8(&mut buf, Some(-127)).unwrap();
        write_i16(&mut buf, Some(-32767)).unwrap();
        write_i32(&mut buf, Some(2_147_483_646)).unwrap();
        write_f32(&mut buf, Some(1.5e38)).unwrap();
        write_f64(&mut buf, Some(-1.25e300)).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_i8(&mut cursor).unwrap(), Some(-127));
        assert_eq!(read_i16(&mut cursor, native).unwrap(), Some(-32767));
        assert_eq!(read_i32(&mut cursor, native).unwrap(), Some(2_147_483_646));
        assert_eq!(read_f32(&mut cursor, native).unwrap(), Some(1.5e38));
        assert_eq!(read_f64(&mut cursor, native).unwrap(), Some(-1.25e300));
    }

    #[test]
    fn swapped_order_reads_back() {
        let foreign = match Endian::native() {
            Endian::Little => Endian::Big,
            Endian::Big => Endian::Little,
        };
        let bits = 1234.5678f64.to_bits().swap_bytes();
        let mut buf = Vec::new();
        buf.extend_from_slice(&bits.to_ne_bytes());
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_f64(&mut cursor, foreign).unwrap(), Some(1234.5678));
    }

    #[test]
    fn byte_swap_is_an_involution_on_sentinels() {
        assert_eq!(INT_MISSING.swap_bytes().swap_bytes(), INT_MISSING);
        assert_eq!(LONG_MISSING.swap_bytes().swap_bytes(), LONG_MISSING);
        assert_eq!(
            FLOAT_MISSING_BITS.swap_bytes().swap_bytes(),
            FLOAT_MISSING_BITS
        );
        assert_eq!(
            DOUBLE_MISSING_BITS.swap_bytes().swap_bytes(),
            DOUBLE_MISSING_BITS
        );
        let nan_bits = f64::NAN.to_bits();
        assert_eq!(nan_bits.swap_bytes().swap_bytes(), nan_bits);
    }

    #[test]
    fn shorts_follow_the_declared_order() {
        let mut cursor = Cursor::new([0x12u8, 0x34]);
        assert_eq!(read_i16(&mut cursor, Endian::Big).unwrap(), Some(0x1234));
        let mut cursor = Cursor::new([0x12u8, 0x34]);
        assert_eq!(read_i16(&mut cursor, Endian::Little).unwrap(), Some(0x3412));
    }

    #[test]
    fn short_read_fails_on_truncation() {
        let mut cursor = Cursor::new([0x12u8]);
        assert!(read_i16(&mut cursor, Endian::Big).is_err());
    }

    #[test]
    fn float_missing_bits_match_two_to_the_127() {
        assert_eq!(f32::from_bits(FLOAT_MISSING_BITS), 2f32.powi(127));
        assert_eq!(f64::from_bits(DOUBLE_MISSING_BITS), 2f64.powi(1023));
    }

    #[test]
    fn fixed_string_keeps_the_terminator() {
        let enc = crate::dta::encoding::default_encoding();
        let mut buf = Vec::new();
        write_fixed_string(&mut buf, "abcdefghij", 9, enc).unwrap();
        assert_eq!(&buf, b"abcdefgh\0");
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_fixed_string(&mut cursor, 9, enc).unwrap(), "abcdefgh");
    }

    #[test]
    fn platform_is_supported() {
        assert!(verify_platform().is_ok());
    }
}
