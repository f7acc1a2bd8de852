#[cfg(test)]
#[path = "./string_test.rs"]
mod string_test;

/// pads `s` with spaces on the right up to `len` characters
pub fn right_pad(s: &str, len: usize) -> String {
    format!("{:<width$}", s, width = len)
}

/// parses a number, "0x" prefix indicates base 16, otherwise base 10. underscores are ignored.
pub fn parse_number_string(s: &str) -> Option<u32> {
    let x = s.trim().replace("_", "");
    if x.len() > 2 && (x.starts_with("0x") || x.starts_with("0X")) {
        u32::from_str_radix(&x[2..], 16).ok()
    } else {
        x.parse::<u32>().ok()
    }
}
