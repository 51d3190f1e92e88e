use crate::dta::encoding;
use crate::dta::error::{Error, Result};
use crate::dta::types::{Endian, Header};
use crate::dta::value;
use chrono::Local;
use std::io::{Read, Write};

pub(crate) const RELEASE_V5: u8 = 0x69;
pub(crate) const RELEASE_V6: u8 = b'l';
const FILETYPE: u8 = 1;
pub(crate) const TIMESTAMP_LEN: usize = 18;
pub(crate) const V6_LABEL_LEN: usize = 81;

const DEFAULT_DATA_LABEL: &str = "Written by stata-dta";

pub fn read_header<R: Read>(reader: &mut R) -> Result<Header> {
    let release = value::read_u8(reader)?;
    let version = match release {
        RELEASE_V5 => 105,
        RELEASE_V6 => 108,
        other => return Err(Error::UnsupportedVersion(other)),
    };

    // the flag fixes the order of every multi-byte field that follows
    let flag = value::read_u8(reader)?;
    let endian = match flag {
        0x01 => Endian::Big,
        0x02 => Endian::Little,
        other => return Err(Error::InvalidByteOrder(other)),
    };

    let _filetype = value::read_u8(reader)?;
    let _padding = value::read_u8(reader)?;

    // counts reuse the short/int wire widths; the sentinel passes through
    let nvars = value::read_i16_raw(reader, endian)? as u16;
    let nobs = value::read_i32_raw(reader, endian)? as u32;

    let mut header = Header {
        version,
        endian,
        nvars,
        nobs,
        data_label: None,
        timestamp: None,
    };

    let enc = encoding::default_encoding();
    let label = value::read_fixed_string(reader, header.label_len(), enc)?;
    if !label.is_empty() {
        header.data_label = Some(label);
    }
    let stamp = value::read_fixed_string(reader, TIMESTAMP_LEN, enc)?;
    if !stamp.is_empty() {
        header.timestamp = Some(stamp);
    }

    Ok(header)
}

/// Always emits the v6 layout in the platform's byte order, whatever the
/// input looked like.
pub fn write_header<W: Write>(
    writer: &mut W,
    nvars: u16,
    nobs: u32,
    data_label: Option<&str>,
    timestamp: Option<&str>,
) -> Result<()> {
    value::write_u8(writer, RELEASE_V6)?;
    value::write_u8(writer, Endian::native().flag())?;
    value::write_u8(writer, FILETYPE)?;
    value::write_u8(writer, 0)?;
    value::write_i16_raw(writer, nvars as i16)?;
    value::write_i32_raw(writer, nobs as i32)?;

    let enc = encoding::default_encoding();
    let label = data_label.unwrap_or(DEFAULT_DATA_LABEL);
    value::write_fixed_string(writer, label, V6_LABEL_LEN, enc)?;
    let stamp = match timestamp {
        Some(stamp) => stamp.to_string(),
        None => Local::now().format("%d %b %Y %H:%M").to_string(),
    };
    value::write_fixed_string(writer, &stamp, TIMESTAMP_LEN, enc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_roundtrips_through_the_v6_layout() {
        let mut buf = Vec::new();
        write_header(&mut buf, 3, 120, Some("households"), Some("12 Mar 2001 09:15")).unwrap();
        assert_eq!(buf.len(), 4 + 2 + 4 + V6_LABEL_LEN + TIMESTAMP_LEN);
        assert_eq!(buf[0], b'l');
        assert_eq!(buf[1], Endian::native().flag());
        assert_eq!(buf[2], FILETYPE);
        assert_eq!(buf[3], 0);

        let header = read_header(&mut Cursor::new(buf)).unwrap();
        assert_eq!(header.version, 108);
        assert_eq!(header.endian, Endian::native());
        assert_eq!(header.nvars, 3);
        assert_eq!(header.nobs, 120);
        assert_eq!(header.data_label.as_deref(), Some("households"));
        assert_eq!(header.timestamp.as_deref(), Some("12 Mar 2001 09:15"));
    }

    #[test]
    fn unknown_release_byte_is_rejected_first() {
        // one byte is enough: the version check fires before any other read
        let mut cursor = Cursor::new([0x70u8]);
        match read_header(&mut cursor) {
            Err(Error::UnsupportedVersion(0x70)) => {}
            other => panic!("expected UnsupportedVersion, got {:?}", other.map(|h| h.version)),
        }
    }

    #[test]
    fn invalid_byte_order_flag_is_rejected() {
        let mut cursor = Cursor::new([RELEASE_V6, 0x03]);
        assert!(matches!(
            read_header(&mut cursor),
            Err(Error::InvalidByteOrder(0x03))
        ));
    }
}
