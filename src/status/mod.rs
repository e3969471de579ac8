// src/status/mod.rs

pub mod date_parser;
pub mod utils;

use std::io::Cursor;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use utils::{clean_str, trailing_number};

/// One reading of the sheet: the values from row 2, columns A–C.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeetStatus {
    pub event: String,
    pub heat: String,
    /// Column C verbatim, or empty when the row has only two columns.
    pub updated_at: String,
}

impl MeetStatus {
    pub fn new(event: impl Into<String>, heat: impl Into<String>, updated_at: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            heat: heat.into(),
            updated_at: updated_at.into(),
        }
    }
}

/// Parse a CSV export whose first line is a header and whose second line
/// holds event, heat and last-updated.
///
/// Returns `None` when the body has fewer than two lines or the data row has
/// fewer than two columns; callers treat that as "nothing to show this tick".
pub fn parse_csv(text: &str) -> Option<MeetStatus> {
    // line 2 exactly, even when it is blank
    let row = text.split('\n').nth(1)?.trim_end_matches('\r');

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(Cursor::new(row.as_bytes()));

    let record = match rdr.records().next()? {
        Ok(record) => record,
        Err(e) => {
            debug!(error = %e, "unreadable data row");
            return None;
        }
    };

    let columns: Vec<String> = record.iter().map(clean_str).collect();
    if columns.len() < 2 {
        return None;
    }

    Some(MeetStatus {
        event: trailing_number(&columns[0]),
        heat: trailing_number(&columns[1]),
        updated_at: columns.get(2).cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(row: &str) -> String {
        format!("Event,Heat,Last Updated\n{}", row)
    }

    #[test]
    fn quoted_row_with_labels() {
        let parsed = parse_csv(&with_header(
            r#""Event 42","Heat 3","2024-01-20T10:00:00.000Z""#,
        ));
        assert_eq!(
            parsed,
            Some(MeetStatus::new("42", "3", "2024-01-20T10:00:00.000Z"))
        );
    }

    #[test]
    fn two_columns_leave_updated_at_empty() {
        assert_eq!(parse_csv(&with_header("5,2")), Some(MeetStatus::new("5", "2", "")));
    }

    #[test]
    fn mixed_label_formats() {
        let cases = [
            ("event 12,heat 3,2024-01-20T10:00:00.000Z", "12", "3"),
            ("Women's 50m Free Event 45,Heat 7,2024-01-20T10:00:00.000Z", "45", "7"),
            ("44,11,2024-01-20T10:00:00.000Z", "44", "11"),
            ("Finals Event 101,Heat 2,2024-01-20T10:00:00.000Z", "101", "2"),
        ];
        for (row, event, heat) in cases {
            let parsed = parse_csv(&with_header(row)).expect("row should parse");
            assert_eq!(parsed.event, event, "row {row}");
            assert_eq!(parsed.heat, heat, "row {row}");
        }
    }

    #[test]
    fn non_numeric_field_is_kept_verbatim() {
        let parsed = parse_csv(&with_header(" Warmup , Break ")).expect("row should parse");
        assert_eq!(parsed.event, "Warmup");
        assert_eq!(parsed.heat, "Break");
    }

    #[test]
    fn quoted_comma_stays_in_one_column() {
        let parsed = parse_csv(&with_header(r#""Relay, Event 8",Heat 1,stamp"#))
            .expect("row should parse");
        assert_eq!(parsed, MeetStatus::new("8", "1", "stamp"));
    }

    #[test]
    fn stray_quote_inside_unquoted_field_is_literal() {
        let parsed = parse_csv("Event,Heat,Time\n25\" Free Event 5,Heat 2,x")
            .expect("row should parse");
        assert_eq!(parsed, MeetStatus::new("5", "2", "x"));
    }

    #[test]
    fn escaped_quotes_inside_quoted_field() {
        let parsed = parse_csv(&with_header(r#""The ""A"" Final",Heat 1,x"#))
            .expect("row should parse");
        assert_eq!(parsed.event, r#"The "A" Final"#);
    }

    #[test]
    fn only_ascii_digits_count_as_a_number() {
        let parsed = parse_csv(&with_header("Event \u{0663},Heat 2,x")).expect("row should parse");
        assert_eq!(parsed.event, "Event \u{0663}");
        assert_eq!(parsed.heat, "2");
    }

    #[test]
    fn crlf_body_parses_like_lf() {
        let parsed = parse_csv("Event,Heat,Time\r\n7,4,x\r\n").expect("row should parse");
        assert_eq!(parsed, MeetStatus::new("7", "4", "x"));
    }

    #[test]
    fn short_or_empty_bodies_are_ignored() {
        assert_eq!(parse_csv(""), None);
        assert_eq!(parse_csv("Event,Heat,Time"), None);
        assert_eq!(parse_csv("Event,Heat,Time\n"), None);
        assert_eq!(parse_csv("Event,Heat,Time\n17"), None);
        assert_eq!(parse_csv("Event,Heat,Time\n\n5,2"), None);
    }
}
