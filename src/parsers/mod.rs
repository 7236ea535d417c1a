//! Output parsers for the diagnostic tools.
//!
//! Every parser takes the probe's stdout as text and returns a best-effort
//! record. None of them fail: lines that do not match the expected shape are
//! dropped and unparsable numbers read as zero.

pub mod json;
pub mod memory;
pub mod services;
pub mod sysctl;
pub mod tables;

/// Decodes probe stdout. Tools occasionally emit non-UTF-8 device or user
/// names, which must not discard the rest of the output.
pub fn decode_stdout(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn number(field: &str) -> f64 {
    field.trim().parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_collapse_repeated_whitespace() {
        assert_eq!(fields("   0   12\t 3.5  ada0  "), vec!["0", "12", "3.5", "ada0"]);
        assert!(fields("   ").is_empty());
    }

    #[test]
    fn number_reads_garbage_as_zero() {
        assert_eq!(number("17.25"), 17.25);
        assert_eq!(number("n/a"), 0.0);
        assert_eq!(number(""), 0.0);
    }

    #[test]
    fn decode_keeps_valid_text_around_bad_bytes() {
        let text = decode_stdout(b"ada0 \xff ok");
        assert!(text.starts_with("ada0 "));
        assert!(text.ends_with(" ok"));
    }
}
