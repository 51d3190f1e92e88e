use encoding_rs::Encoding;

/// v5/v6 files predate Stata's UTF-8 era.
pub fn default_encoding() -> &'static Encoding {
    encoding_rs::WINDOWS_1252
}

pub fn decode_string(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, _, _had_errors) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Decode a fixed-width field, trimming at the first NUL.
pub fn trimmed_string(bytes: &[u8], encoding: &'static Encoding) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    decode_string(&bytes[..len], encoding)
}

pub fn encode_string(s: &str, encoding: &'static Encoding) -> Vec<u8> {
    let (encoded, _, _had_errors) = encoding.encode(s);
    encoded.into_owned()
}
