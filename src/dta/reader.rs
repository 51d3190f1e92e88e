use crate::dataset::{ColumnAttribute, ColumnKind, DataSink, Dataset, DatasetAttribute};
use crate::dta::data::read_data;
use crate::dta::error::Result;
use crate::dta::header::read_header;
use crate::dta::metadata::read_metadata;
use crate::dta::types::{Header, Metadata, NumericType, VarType};
use crate::dta::value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Decoder for Stata v5/v6 .dta streams.
///
/// Construction consumes the header, the variable descriptors and the
/// characteristics block in one forward pass; [`DtaReader::read_into`] then
/// walks the data block into any [`DataSink`]. Either the whole dataset is
/// produced or an error, never a partial table.
pub struct DtaReader<R: Read> {
    reader: R,
    header: Header,
    metadata: Metadata,
}

impl DtaReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::with_capacity(64 * 1024, file))
    }
}

impl<R: Read> DtaReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        value::verify_platform()?;
        let header = read_header(&mut reader)?;
        let metadata = read_metadata(&mut reader, &header)?;
        Ok(Self {
            reader,
            header,
            metadata,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Allocate columns on `sink`, forward the dataset and column attributes
    /// and populate every cell.
    pub fn read_into<S: DataSink>(mut self, sink: &mut S) -> Result<()> {
        let rows = self.metadata.row_count as usize;
        for var in &self.metadata.variables {
            let kind = match var.var_type {
                VarType::Numeric(NumericType::Float | NumericType::Double) => ColumnKind::Real,
                VarType::Numeric(_) => ColumnKind::Integer,
                VarType::Str(_) => ColumnKind::Text,
            };
            sink.add_column(&var.name, kind, rows);
        }

        if let Some(label) = &self.metadata.data_label {
            sink.set_attribute(DatasetAttribute::DataLabel(label));
        }
        if let Some(stamp) = &self.metadata.timestamp {
            sink.set_attribute(DatasetAttribute::Timestamp(stamp));
        }
        for (col, var) in self.metadata.variables.iter().enumerate() {
            if let Some(format) = &var.format {
                sink.set_column_attribute(col, ColumnAttribute::Format(format));
            }
            if let Some(label) = &var.label {
                sink.set_column_attribute(col, ColumnAttribute::Label(label));
            }
        }

        read_data(&mut self.reader, &self.metadata, sink)
    }

    /// Decode into the built-in [`Dataset`].
    pub fn read(self) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        self.read_into(&mut dataset)?;
        Ok(dataset)
    }
}
