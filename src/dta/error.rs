use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not a Stata version 5 or 6 file (release byte {0:#04x})")]
    UnsupportedVersion(u8),

    #[error("invalid byte order flag: {0:#04x}")]
    InvalidByteOrder(u8),

    #[error("unknown data type code: {0:#04x}")]
    InvalidTypeCode(u8),

    #[error("type-0 characteristic of nonzero length: {0}")]
    TrailingCharacteristic(u16),

    #[error("string column {name} needs {width} bytes, the format allows at most 127")]
    StringTooWide { name: String, width: usize },

    #[error("platform numeric layout is not IEEE 4-byte int, 4-byte float, 8-byte double")]
    UnsupportedPlatform,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
