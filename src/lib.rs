//! Pure Rust reader and writer for Stata version 5 and 6 .dta files
//!
//! Decoding accepts both the v5 and v6 layouts in either byte order;
//! encoding always produces a v6 file in the platform's byte order, with
//! integer columns widened to the long wire type and real columns to
//! double. The in-memory side of the codec is the neutral
//! [`DataSource`]/[`DataSink`] boundary; [`Dataset`] is the built-in
//! implementation of both.
//!
//! ```no_run
//! let dataset = stata_dta::read_dta("survey.dta")?;
//! for column in dataset.columns() {
//!     println!("{} ({:?})", column.name(), column.kind());
//! }
//! # Ok::<(), stata_dta::Error>(())
//! ```

pub mod dataset;
pub mod dta;

pub use dataset::{
    Cell, Column, ColumnAttribute, ColumnKind, ColumnValues, DataSink, DataSource, Dataset,
    DatasetAttribute,
};
pub use dta::{
    metadata_json, DtaReader, DtaWriter, Endian, Error, Header, Metadata, NumericType, Result,
    VarType, Variable,
};

use std::path::Path;

/// Decode a .dta file into the built-in [`Dataset`].
pub fn read_dta(path: impl AsRef<Path>) -> Result<Dataset> {
    DtaReader::open(path)?.read()
}

/// Encode `dataset` as a version 6 .dta file at `path`.
pub fn write_dta(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    DtaWriter::create(path)?.write(dataset)
}
