use crate::dta::encoding;
use crate::dta::error::{Error, Result};
use crate::dta::types::{Endian, Header, Metadata, NumericType, VarType, Variable};
use crate::dta::value;
use std::io::Read;

/// String type tags encode the width as `0x7f + width`.
pub(crate) const STRING_OFFSET: u8 = 0x7f;
pub(crate) const NAME_FIELD_LEN: usize = 9;
pub(crate) const FORMAT_FIELD_LEN: usize = 12;
pub(crate) const LABEL_NAME_FIELD_LEN: usize = 9;

/// Read every variable descriptor table and consume the characteristics
/// block, leaving the stream positioned at the first data cell.
pub fn read_metadata<R: Read>(reader: &mut R, header: &Header) -> Result<Metadata> {
    let nvar = header.nvars as usize;
    let encoding = encoding::default_encoding();

    let typlist = value::read_bytes(reader, nvar)?;
    let mut var_types = Vec::with_capacity(nvar);
    for &code in &typlist {
        var_types.push(typecode_to_vartype(code)?);
    }

    let mut names = Vec::with_capacity(nvar);
    for _ in 0..nvar {
        let raw = value::read_fixed_string(reader, NAME_FIELD_LEN, encoding)?;
        names.push(mangle_in(&raw));
    }

    // sort list, semantically unused
    value::read_bytes(reader, 2 * (nvar + 1))?;

    let mut formats = Vec::with_capacity(nvar);
    for _ in 0..nvar {
        formats.push(value::read_fixed_string(reader, FORMAT_FIELD_LEN, encoding)?);
    }

    // value-label name slots; the label dictionaries are out of scope
    for _ in 0..nvar {
        value::read_bytes(reader, LABEL_NAME_FIELD_LEN)?;
    }

    let mut labels = Vec::with_capacity(nvar);
    for _ in 0..nvar {
        labels.push(value::read_fixed_string(reader, header.label_len(), encoding)?);
    }

    skip_characteristics(reader, header.endian)?;

    let variables = var_types
        .into_iter()
        .zip(names)
        .zip(formats.into_iter().zip(labels))
        .map(|((var_type, name), (format, label))| Variable {
            name,
            var_type,
            format: Some(format).filter(|s| !s.is_empty()),
            label: Some(label).filter(|s| !s.is_empty()),
        })
        .collect();

    Ok(Metadata {
        variables,
        byte_order: header.endian,
        row_count: header.nobs,
        data_label: header.data_label.clone(),
        timestamp: header.timestamp.clone(),
        encoding,
    })
}

pub(crate) fn typecode_to_vartype(code: u8) -> Result<VarType> {
    match code {
        b'b' => Ok(VarType::Numeric(NumericType::Byte)),
        b'i' => Ok(VarType::Numeric(NumericType::Int)),
        b'l' => Ok(VarType::Numeric(NumericType::Long)),
        b'f' => Ok(VarType::Numeric(NumericType::Float)),
        b'd' => Ok(VarType::Numeric(NumericType::Double)),
        code if code >= STRING_OFFSET => Ok(VarType::Str(code - STRING_OFFSET)),
        other => Err(Error::InvalidTypeCode(other)),
    }
}

pub(crate) fn vartype_to_typecode(var_type: VarType) -> u8 {
    match var_type {
        VarType::Numeric(NumericType::Byte) => b'b',
        VarType::Numeric(NumericType::Int) => b'i',
        VarType::Numeric(NumericType::Long) => b'l',
        VarType::Numeric(NumericType::Float) => b'f',
        VarType::Numeric(NumericType::Double) => b'd',
        VarType::Str(width) => STRING_OFFSET + width,
    }
}

/// `_` in a stored name becomes `.` on the way in and `.` becomes `_` on the
/// way out. Applied to every occurrence; a name that mixes both characters
/// does not round-trip, the same information loss as the original format
/// tooling.
pub(crate) fn mangle_in(name: &str) -> String {
    name.replace('_', ".")
}

pub(crate) fn mangle_out(name: &str) -> String {
    name.replace('.', "_")
}

/// Walk the characteristics block without interpreting it. The data block
/// starts immediately after, so the walk has to be structurally exact even
/// though every payload is discarded.
pub(crate) fn skip_characteristics<R: Read>(reader: &mut R, endian: Endian) -> Result<()> {
    loop {
        let kind = value::read_u8(reader)?;
        if kind == 0 {
            break;
        }
        let len = value::read_i16_raw(reader, endian)? as u16;
        value::read_bytes(reader, len as usize)?;
    }
    let trailing = value::read_i16_raw(reader, endian)? as u16;
    if trailing != 0 {
        return Err(Error::TrailingCharacteristic(trailing));
    }
    Ok(())
}
