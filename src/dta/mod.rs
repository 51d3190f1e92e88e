pub(crate) mod data;
pub(crate) mod encoding;
pub(crate) mod error;
pub(crate) mod header;
pub(crate) mod metadata;
pub(crate) mod types;

pub mod reader;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use reader::DtaReader;
pub use types::{Endian, Header, Metadata, NumericType, VarType, Variable};
pub use writer::DtaWriter;

use serde_json::{json, Value};
use std::path::Path;

/// Export the header and variable descriptors as a JSON string without
/// touching the data block.
pub fn metadata_json(path: impl AsRef<Path>) -> Result<String> {
    let reader = DtaReader::open(path)?;
    let hdr = reader.header();
    let meta = reader.metadata();

    let variables = meta
        .variables
        .iter()
        .map(|v| {
            json!({
                "name": v.name,
                "type": format!("{:?}", v.var_type),
                "width": v.var_type.width(),
                "format": v.format,
                "label": v.label,
            })
        })
        .collect::<Vec<Value>>();

    let v = json!({
        "version": hdr.version,
        "byte_order": format!("{:?}", meta.byte_order),
        "row_count": meta.row_count,
        "data_label": meta.data_label,
        "timestamp": meta.timestamp,
        "variables": variables,
    });
    Ok(v.to_string())
}
