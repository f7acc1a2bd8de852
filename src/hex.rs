use std::fmt::Write;

/// renders bytes as contiguous uppercase hex, like "B80100"
pub fn hex_bytes(data: &[u8]) -> String {
    hex_bytes_separated(data, None::<char>)
}

/// renders bytes as uppercase hex with an optional separator between each byte
pub fn hex_bytes_separated(data: &[u8], sep: impl Into<Option<char>>) -> String {
    let sep = sep.into();
    let mut res = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            if let Some(c) = sep {
                res.push(c);
            }
        }
        let _ = write!(res, "{:02X}", b);
    }
    res
}
