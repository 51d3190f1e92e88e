//! The neutral column-oriented boundary between the codec and whatever
//! tabular container a host wants to use.
//!
//! Decode populates any [`DataSink`]; encode pulls from any [`DataSource`].
//! [`Dataset`] is the built-in implementation of both, and the only table
//! type this crate knows about.

use crate::dta::error::{Error, Result};

/// Value kind of a column at the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    Integer,
    Real,
    Text,
}

/// One cell as seen by the codec. `Missing` doubles as the missing query;
/// the wire sentinels never cross this boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Missing,
    Int(i32),
    Real(f64),
    Str(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub enum DatasetAttribute<'a> {
    DataLabel(&'a str),
    Timestamp(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub enum ColumnAttribute<'a> {
    Format(&'a str),
    Label(&'a str),
}

/// Column-oriented view the encoder reads from.
pub trait DataSource {
    fn column_count(&self) -> usize;
    fn row_count(&self) -> usize;
    fn column_name(&self, col: usize) -> &str;
    fn column_kind(&self, col: usize) -> ColumnKind;
    /// Must agree with [`DataSource::column_kind`] for every row.
    fn cell(&self, col: usize, row: usize) -> Cell<'_>;

    fn data_label(&self) -> Option<&str> {
        None
    }
    fn timestamp(&self) -> Option<&str> {
        None
    }
    fn column_label(&self, _col: usize) -> Option<&str> {
        None
    }
}

/// Column-oriented store the decoder fills in.
pub trait DataSink {
    /// Allocate a column of `rows` cells; called once per column, in order,
    /// before any cell is set.
    fn add_column(&mut self, name: &str, kind: ColumnKind, rows: usize);
    fn set_attribute(&mut self, attribute: DatasetAttribute<'_>);
    fn set_column_attribute(&mut self, col: usize, attribute: ColumnAttribute<'_>);
    fn set_cell(&mut self, col: usize, row: usize, value: Cell<'_>);
}

#[derive(Debug, Clone)]
pub enum ColumnValues {
    Boolean(Vec<Option<bool>>),
    Integer(Vec<Option<i32>>),
    Real(Vec<Option<f64>>),
    Text(Vec<String>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Real(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            ColumnValues::Boolean(_) => ColumnKind::Boolean,
            ColumnValues::Integer(_) => ColumnKind::Integer,
            ColumnValues::Real(_) => ColumnKind::Real,
            ColumnValues::Text(_) => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    format: Option<String>,
    label: Option<String>,
    values: ColumnValues,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.values.kind()
    }

    /// Advisory display format, carried verbatim and never interpreted.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    fn cell(&self, row: usize) -> Cell<'_> {
        match &self.values {
            ColumnValues::Boolean(v) => match v[row] {
                Some(b) => Cell::Int(i32::from(b)),
                None => Cell::Missing,
            },
            ColumnValues::Integer(v) => match v[row] {
                Some(i) => Cell::Int(i),
                None => Cell::Missing,
            },
            ColumnValues::Real(v) => match v[row] {
                Some(x) => Cell::Real(x),
                None => Cell::Missing,
            },
            ColumnValues::Text(v) => Cell::Str(&v[row]),
        }
    }
}

/// A fully materialized table: every column has the same number of rows and
/// the shape never changes after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    label: Option<String>,
    timestamp: Option<String>,
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn creation_timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn set_creation_timestamp(&mut self, timestamp: impl Into<String>) {
        self.timestamp = Some(timestamp.into());
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub fn set_column_label(&mut self, col: usize, label: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(col) {
            column.label = Some(label.into());
        }
    }

    pub fn push_boolean_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<bool>>,
    ) -> Result<()> {
        self.push_column(name.into(), ColumnValues::Boolean(values))
    }

    pub fn push_integer_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<i32>>,
    ) -> Result<()> {
        self.push_column(name.into(), ColumnValues::Integer(values))
    }

    pub fn push_real_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<()> {
        self.push_column(name.into(), ColumnValues::Real(values))
    }

    pub fn push_text_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Result<()> {
        self.push_column(name.into(), ColumnValues::Text(values))
    }

    fn push_column(&mut self, name: String, values: ColumnValues) -> Result<()> {
        if !self.columns.is_empty() && values.len() != self.n_rows() {
            return Err(Error::ParseError(format!(
                "column {} has {} rows, expected {}",
                name,
                values.len(),
                self.n_rows()
            )));
        }
        self.columns.push(Column {
            name,
            format: None,
            label: None,
            values,
        });
        Ok(())
    }
}

impl DataSource for Dataset {
    fn column_count(&self) -> usize {
        self.n_columns()
    }

    fn row_count(&self) -> usize {
        self.n_rows()
    }

    fn column_name(&self, col: usize) -> &str {
        &self.columns[col].name
    }

    fn column_kind(&self, col: usize) -> ColumnKind {
        self.columns[col].kind()
    }

    fn cell(&self, col: usize, row: usize) -> Cell<'_> {
        self.columns[col].cell(row)
    }

    fn data_label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    fn column_label(&self, col: usize) -> Option<&str> {
        self.columns[col].label.as_deref()
    }
}

impl DataSink for Dataset {
    fn add_column(&mut self, name: &str, kind: ColumnKind, rows: usize) {
        let values = match kind {
            ColumnKind::Boolean => ColumnValues::Boolean(vec![None; rows]),
            ColumnKind::Integer => ColumnValues::Integer(vec![None; rows]),
            ColumnKind::Real => ColumnValues::Real(vec![None; rows]),
            ColumnKind::Text => ColumnValues::Text(vec![String::new(); rows]),
        };
        self.columns.push(Column {
            name: name.to_string(),
            format: None,
            label: None,
            values,
        });
    }

    fn set_attribute(&mut self, attribute: DatasetAttribute<'_>) {
        match attribute {
            DatasetAttribute::DataLabel(label) => self.label = Some(label.to_string()),
            DatasetAttribute::Timestamp(stamp) => self.timestamp = Some(stamp.to_string()),
        }
    }

    fn set_column_attribute(&mut self, col: usize, attribute: ColumnAttribute<'_>) {
        let column = &mut self.columns[col];
        match attribute {
            ColumnAttribute::Format(format) => column.format = Some(format.to_string()),
            ColumnAttribute::Label(label) => column.label = Some(label.to_string()),
        }
    }

    fn set_cell(&mut self, col: usize, row: usize, value: Cell<'_>) {
        match (&mut self.columns[col].values, value) {
            (ColumnValues::Boolean(v), Cell::Int(i)) => v[row] = Some(i != 0),
            (ColumnValues::Boolean(v), Cell::Missing) => v[row] = None,
            (ColumnValues::Integer(v), Cell::Int(i)) => v[row] = Some(i),
            (ColumnValues::Integer(v), Cell::Missing) => v[row] = None,
            (ColumnValues::Real(v), Cell::Real(x)) => v[row] = Some(x),
            (ColumnValues::Real(v), Cell::Int(i)) => v[row] = Some(f64::from(i)),
            (ColumnValues::Real(v), Cell::Missing) => v[row] = None,
            (ColumnValues::Text(v), Cell::Str(s)) => v[row] = s.to_string(),
            (ColumnValues::Text(v), Cell::Missing) => v[row] = String::new(),
            (values, value) => {
                debug_assert!(
                    false,
                    "cell {value:?} does not fit a {:?} column",
                    values.kind()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_columns_are_rejected() {
        let mut ds = Dataset::new();
        ds.push_integer_column("a", vec![Some(1), Some(2)]).unwrap();
        assert!(ds.push_integer_column("b", vec![Some(1)]).is_err());
    }

    #[test]
    fn boolean_cells_surface_as_integers() {
        let mut ds = Dataset::new();
        ds.push_boolean_column("flag", vec![Some(true), Some(false), None])
            .unwrap();
        assert_eq!(ds.cell(0, 0), Cell::Int(1));
        assert_eq!(ds.cell(0, 1), Cell::Int(0));
        assert_eq!(ds.cell(0, 2), Cell::Missing);
        assert_eq!(ds.column_kind(0), ColumnKind::Boolean);
    }

    #[test]
    fn sink_allocation_matches_kind_and_length() {
        let mut ds = Dataset::new();
        ds.add_column("x", ColumnKind::Real, 2);
        ds.set_cell(0, 1, Cell::Real(2.5));
        ds.set_column_attribute(0, ColumnAttribute::Label("a label"));
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.cell(0, 0), Cell::Missing);
        assert_eq!(ds.cell(0, 1), Cell::Real(2.5));
        assert_eq!(ds.column(0).unwrap().label(), Some("a label"));
    }
}
