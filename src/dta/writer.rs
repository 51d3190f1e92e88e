use crate::dataset::{Cell, ColumnKind, DataSource};
use crate::dta::encoding;
use crate::dta::error::{Error, Result};
use crate::dta::header::{write_header, V6_LABEL_LEN};
use crate::dta::metadata::{
    mangle_out, vartype_to_typecode, FORMAT_FIELD_LEN, LABEL_NAME_FIELD_LEN, NAME_FIELD_LEN,
};
use crate::dta::types::{NumericType, VarType};
use crate::dta::value;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const MAX_STR_WIDTH: usize = 127;
const NAME_SIGNIFICANT_LEN: usize = 8;
const NUMERIC_FORMAT: &str = "%9.0g";

/// Encoder for version 6 .dta files.
///
/// The wire type space is deliberately narrower than what decode accepts:
/// boolean and integer columns are written as the long type, real columns
/// as double, and a string column's declared width is the widest cell it
/// actually holds. On error the output is abandoned mid-write; callers
/// should discard it.
pub struct DtaWriter<W: Write> {
    writer: W,
}

impl DtaWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::with_capacity(64 * 1024, file)))
    }
}

impl<W: Write> DtaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write<S: DataSource + ?Sized>(mut self, source: &S) -> Result<()> {
        value::verify_platform()?;
        let prepared = PreparedWrite::from_source(source)?;
        write_header(
            &mut self.writer,
            prepared.columns.len() as u16,
            source.row_count() as u32,
            source.data_label(),
            source.timestamp(),
        )?;
        self.write_descriptors(&prepared)?;
        self.write_characteristics_terminator()?;
        self.write_data(&prepared, source)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_descriptors(&mut self, prepared: &PreparedWrite) -> Result<()> {
        let enc = encoding::default_encoding();
        let nvar = prepared.columns.len();

        for col in &prepared.columns {
            value::write_u8(&mut self.writer, vartype_to_typecode(col.kind.var_type()))?;
        }
        for col in &prepared.columns {
            write_name(&mut self.writer, &col.name, enc)?;
        }
        // sort list is semantically unused and written as zeros
        self.writer.write_all(&vec![0u8; 2 * (nvar + 1)])?;
        for col in &prepared.columns {
            value::write_fixed_string(&mut self.writer, &col.format(), FORMAT_FIELD_LEN, enc)?;
        }
        // value-label name slots, zero-filled placeholders
        for _ in &prepared.columns {
            self.writer.write_all(&[0u8; LABEL_NAME_FIELD_LEN])?;
        }
        for col in &prepared.columns {
            let label = col.label.as_deref().unwrap_or(&col.name);
            value::write_fixed_string(&mut self.writer, label, V6_LABEL_LEN, enc)?;
        }
        Ok(())
    }

    /// A type-0 record followed by the mandatory zero length.
    fn write_characteristics_terminator(&mut self) -> Result<()> {
        value::write_u8(&mut self.writer, 0)?;
        value::write_i16_raw(&mut self.writer, 0)
    }

    fn write_data<S: DataSource + ?Sized>(
        &mut self,
        prepared: &PreparedWrite,
        source: &S,
    ) -> Result<()> {
        let enc = encoding::default_encoding();
        for row in 0..source.row_count() {
            for (col, spec) in prepared.columns.iter().enumerate() {
                write_cell(&mut self.writer, spec, source.cell(col, row), enc)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ColumnSpec {
    name: String,
    label: Option<String>,
    kind: WireKind,
}

impl ColumnSpec {
    fn format(&self) -> String {
        match self.kind {
            WireKind::Str(width) => format!("%{width}s"),
            _ => NUMERIC_FORMAT.to_string(),
        }
    }
}

/// The canonical wire types: everything integer-bearing widens to long and
/// everything real to double.
#[derive(Debug, Clone, Copy)]
enum WireKind {
    Long,
    Double,
    Str(u8),
}

impl WireKind {
    fn var_type(self) -> VarType {
        match self {
            WireKind::Long => VarType::Numeric(NumericType::Long),
            WireKind::Double => VarType::Numeric(NumericType::Double),
            WireKind::Str(width) => VarType::Str(width),
        }
    }
}

#[derive(Debug, Clone)]
struct PreparedWrite {
    columns: Vec<ColumnSpec>,
}

impl PreparedWrite {
    fn from_source<S: DataSource + ?Sized>(source: &S) -> Result<Self> {
        let nvar = source.column_count();
        if nvar == 0 {
            return Err(Error::ParseError("no columns to write".to_string()));
        }
        let enc = encoding::default_encoding();
        let mut columns = Vec::with_capacity(nvar);
        for col in 0..nvar {
            let name = source.column_name(col).to_string();
            if name.is_empty() {
                return Err(Error::ParseError(format!("column {col} has an empty name")));
            }
            let kind = match source.column_kind(col) {
                ColumnKind::Boolean | ColumnKind::Integer => WireKind::Long,
                ColumnKind::Real => WireKind::Double,
                ColumnKind::Text => WireKind::Str(text_width(source, col, enc)?),
            };
            columns.push(ColumnSpec {
                name,
                label: source.column_label(col).map(str::to_string),
                kind,
            });
        }
        Ok(Self { columns })
    }
}

/// Widest encoded cell in the column, floor 1 so an all-empty column still
/// occupies a byte per row.
fn text_width<S: DataSource + ?Sized>(
    source: &S,
    col: usize,
    encoding: &'static Encoding,
) -> Result<u8> {
    let mut max_len = 1usize;
    for row in 0..source.row_count() {
        if let Cell::Str(s) = source.cell(col, row) {
            max_len = max_len.max(encoding::encode_string(s, encoding).len());
        }
    }
    if max_len > MAX_STR_WIDTH {
        return Err(Error::StringTooWide {
            name: source.column_name(col).to_string(),
            width: max_len,
        });
    }
    Ok(max_len as u8)
}

/// Truncate to 8 significant bytes inside the 9-byte zero-terminated slot.
fn write_name<W: Write>(writer: &mut W, name: &str, encoding: &'static Encoding) -> Result<()> {
    let mangled = mangle_out(name);
    let encoded = encoding::encode_string(&mangled, encoding);
    let mut buf = [0u8; NAME_FIELD_LEN];
    let copy_len = encoded.len().min(NAME_SIGNIFICANT_LEN);
    buf[..copy_len].copy_from_slice(&encoded[..copy_len]);
    Ok(writer.write_all(&buf)?)
}

fn write_cell<W: Write>(
    writer: &mut W,
    spec: &ColumnSpec,
    cell: Cell<'_>,
    encoding: &'static Encoding,
) -> Result<()> {
    match spec.kind {
        WireKind::Long => value::write_i32(writer, cell_to_long(&spec.name, cell)?),
        WireKind::Double => value::write_f64(writer, cell_to_double(&spec.name, cell)?),
        WireKind::Str(width) => {
            let mut buf = [0u8; MAX_STR_WIDTH];
            let slot = &mut buf[..width as usize];
            if let Cell::Str(s) = cell {
                let encoded = encoding::encode_string(s, encoding);
                let copy_len = encoded.len().min(slot.len());
                slot[..copy_len].copy_from_slice(&encoded[..copy_len]);
            }
            Ok(writer.write_all(slot)?)
        }
    }
}

fn cell_to_long(name: &str, cell: Cell<'_>) -> Result<Option<i32>> {
    match cell {
        Cell::Missing => Ok(None),
        Cell::Int(v) => Ok(Some(v)),
        other => Err(Error::ParseError(format!(
            "column {name}: expected an integer cell, got {other:?}"
        ))),
    }
}

fn cell_to_double(name: &str, cell: Cell<'_>) -> Result<Option<f64>> {
    match cell {
        Cell::Missing => Ok(None),
        Cell::Real(v) => Ok(Some(v)),
        Cell::Int(v) => Ok(Some(f64::from(v))),
        other => Err(Error::ParseError(format!(
            "column {name}: expected a numeric cell, got {other:?}"
        ))),
    }
}
