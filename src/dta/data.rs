use crate::dataset::{Cell, DataSink};
use crate::dta::encoding;
use crate::dta::error::Result;
use crate::dta::types::{Metadata, NumericType, VarType};
use crate::dta::value;
use std::io::Read;

/// Row-major walk of the data block: every cell of a row precedes the next
/// row, columns in declared order. Cells are pure fixed-width values; the
/// widths were all fixed by the descriptors.
pub fn read_data<R: Read, S: DataSink>(
    reader: &mut R,
    metadata: &Metadata,
    sink: &mut S,
) -> Result<()> {
    let endian = metadata.byte_order;
    for row in 0..metadata.row_count as usize {
        for (col, var) in metadata.variables.iter().enumerate() {
            match var.var_type {
                VarType::Numeric(NumericType::Byte) => {
                    let v = value::read_i8(reader)?;
                    sink.set_cell(col, row, int_cell(v.map(i32::from)));
                }
                VarType::Numeric(NumericType::Int) => {
                    let v = value::read_i16(reader, endian)?;
                    sink.set_cell(col, row, int_cell(v.map(i32::from)));
                }
                VarType::Numeric(NumericType::Long) => {
                    let v = value::read_i32(reader, endian)?;
                    sink.set_cell(col, row, int_cell(v));
                }
                VarType::Numeric(NumericType::Float) => {
                    let v = value::read_f32(reader, endian)?;
                    sink.set_cell(col, row, real_cell(v.map(f64::from)));
                }
                VarType::Numeric(NumericType::Double) => {
                    let v = value::read_f64(reader, endian)?;
                    sink.set_cell(col, row, real_cell(v));
                }
                VarType::Str(width) => {
                    let buf = value::read_bytes(reader, width as usize)?;
                    let s = encoding::trimmed_string(&buf, metadata.encoding);
                    sink.set_cell(col, row, Cell::Str(&s));
                }
            }
        }
    }
    Ok(())
}

fn int_cell(v: Option<i32>) -> Cell<'static> {
    match v {
        Some(v) => Cell::Int(v),
        None => Cell::Missing,
    }
}

fn real_cell(v: Option<f64>) -> Cell<'static> {
    match v {
        Some(v) => Cell::Real(v),
        None => Cell::Missing,
    }
}
