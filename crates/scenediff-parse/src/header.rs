//! Record header lines.

use once_cell::sync::Lazy;
use regex::Regex;

use scenediff_types::{RecordHeader, TypeCode};

use crate::error::{ParseError, ParseResult};

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^--- !u!(\d+) &(-?\d+)(?: +(stripped))?\s*$").expect("header pattern is valid")
});

/// Returns `true` for any line that opens a new record, valid or not.
pub fn is_record_delimiter(line: &str) -> bool {
    line == "---" || line.starts_with("--- ")
}

/// Returns `true` for document-level directives (`%YAML`, `%TAG`).
pub fn is_directive(line: &str) -> bool {
    line.starts_with('%')
}

/// Parse a header line into type code, identity and placeholder flag.
pub fn parse_header(line: &str) -> ParseResult<RecordHeader> {
    let invalid = || ParseError::InvalidHeader(line.to_string());
    let caps = HEADER.captures(line.trim_end()).ok_or_else(invalid)?;
    let type_code: TypeCode = caps[1].parse().map_err(|_| invalid())?;
    let file_id = caps[2].parse().map_err(|_| invalid())?;
    Ok(RecordHeader::new(type_code, file_id, caps.get(3).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenediff_types::FileId;

    #[test]
    fn parses_plain_header() {
        let header = parse_header("--- !u!114 &1145141919").unwrap();
        assert_eq!(header.type_code, TypeCode::MONO_BEHAVIOUR);
        assert_eq!(header.file_id, FileId::new(1145141919));
        assert!(!header.is_placeholder);
    }

    #[test]
    fn parses_stripped_header_with_negative_id() {
        let header = parse_header("--- !u!4 &-8679921383154817045 stripped").unwrap();
        assert_eq!(header.type_code, TypeCode::TRANSFORM);
        assert_eq!(header.file_id.value(), -8679921383154817045);
        assert!(header.is_placeholder);
    }

    #[test]
    fn rejects_malformed_headers() {
        for line in ["---", "--- !u!abc &1", "--- !u!4 &", "--- !u!4 &12 extra", "--- &12"] {
            assert!(
                matches!(parse_header(line), Err(ParseError::InvalidHeader(_))),
                "{line} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflowing_identity() {
        assert!(parse_header("--- !u!4 &99999999999999999999").is_err());
    }

    #[test]
    fn delimiters_and_directives() {
        assert!(is_record_delimiter("--- !u!1 &2"));
        assert!(is_record_delimiter("---"));
        assert!(!is_record_delimiter("----"));
        assert!(is_directive("%YAML 1.1"));
        assert!(!is_directive("GameObject:"));
    }
}
