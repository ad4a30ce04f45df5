//! Parsers for structured device data
//!
//! Android's `content query` tool prints one `Row: N key=value, key=value`
//! line per result, and `dumpsys usagestats` prints timestamped event lines.
//! Both are text contracts, not APIs, so the parsers here degrade to empty
//! results on unrecognized input instead of failing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed row from a content provider query, as a key/value map
pub type ContentRow = BTreeMap<String, String>;

/// Parse `content query` output into key/value rows.
///
/// Each `Row:` line becomes one map. The leading `Row: N` counter is
/// dropped, fields are comma separated, and each field splits on its first
/// `=` only, so values containing `=` survive. Lines that are not rows
/// (help text, error chatter) are ignored.
pub fn parse_content_rows(text: &str) -> Vec<ContentRow> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("Row:") else {
            continue;
        };

        // Drop the row counter that follows "Row:"
        let fields = match rest.trim_start().split_once(' ') {
            Some((_, fields)) => fields,
            None => continue,
        };

        let mut row = ContentRow::new();
        for field in fields.split(", ") {
            if let Some((key, value)) = field.split_once('=') {
                row.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    rows
}

/// Map a call-log `type` code to its label.
///
/// Total over any input: codes outside "1".."7" (including non-numeric
/// strings) map to "Unknown".
pub fn call_type_label(code: &str) -> &'static str {
    match code.trim() {
        "1" => "Incoming",
        "2" => "Outgoing",
        "3" => "Missed",
        "4" => "Voicemail",
        "5" => "Rejected",
        "6" => "Blocked",
        "7" => "Answered Externally",
        _ => "Unknown",
    }
}

/// One usage event parsed from a `dumpsys usagestats` dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Event timestamp, verbatim from the dump
    pub time: String,
    /// Event type name (e.g. ACTIVITY_RESUMED, MOVE_TO_FOREGROUND)
    pub event_type: String,
    /// Package the event belongs to
    pub package: String,
    /// Remainder of the line after the package field
    pub extra_info: String,
}

/// Parse a `dumpsys usagestats` dump into usage events.
///
/// Matches lines of the shape
/// `time="2024-01-15 10:30:00" type=ACTIVITY_RESUMED package=com.example ...`;
/// everything else in the dump (bucket summaries, headers) is skipped.
pub fn parse_usage_stats(text: &str) -> Vec<UsageEvent> {
    // The pattern is fixed; a compile failure here would be a programming
    // error, so fall back to no events rather than propagate.
    let Ok(re) = Regex::new(
        r#"time="([^"]+)"\s+type=(\S+)\s+package=(\S+)\s*(.*)"#,
    ) else {
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| {
            let caps = re.captures(line.trim())?;
            Some(UsageEvent {
                time: caps[1].to_string(),
                event_type: caps[2].to_string(),
                package: caps[3].to_string(),
                extra_info: caps[4].trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_rows_basic() {
        let text = "Row: 0 _id=1, number=5551234, type=2, duration=63\n\
                    Row: 1 _id=2, number=5559876, type=3, duration=0\n";
        let rows = parse_content_rows(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("number").map(String::as_str), Some("5551234"));
        assert_eq!(rows[1].get("type").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_parse_content_rows_value_containing_equals() {
        let text = "Row: 0 _id=1, body=meet at 5=ok?, address=5551234\n";
        let rows = parse_content_rows(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("body").map(String::as_str), Some("meet at 5=ok?"));
    }

    #[test]
    fn test_parse_content_rows_ignores_non_row_lines() {
        let text = "No result found.\nusage: content query --uri <URI>\n";
        assert!(parse_content_rows(text).is_empty());
    }

    #[test]
    fn test_parse_content_rows_null_kept_verbatim() {
        let text = "Row: 0 _id=1, name=NULL, number=5551234\n";
        let rows = parse_content_rows(text);
        assert_eq!(rows[0].get("name").map(String::as_str), Some("NULL"));
    }

    #[test]
    fn test_call_type_labels_total() {
        assert_eq!(call_type_label("1"), "Incoming");
        assert_eq!(call_type_label("2"), "Outgoing");
        assert_eq!(call_type_label("3"), "Missed");
        assert_eq!(call_type_label("4"), "Voicemail");
        assert_eq!(call_type_label("5"), "Rejected");
        assert_eq!(call_type_label("6"), "Blocked");
        assert_eq!(call_type_label("7"), "Answered Externally");
        assert_eq!(call_type_label("8"), "Unknown");
        assert_eq!(call_type_label("0"), "Unknown");
        assert_eq!(call_type_label("abc"), "Unknown");
        assert_eq!(call_type_label(""), "Unknown");
    }

    #[test]
    fn test_parse_usage_stats() {
        let text = r#"Usage stats
  time="2024-01-15 10:30:00" type=ACTIVITY_RESUMED package=com.whatsapp class=Main
  time="2024-01-15 10:31:12" type=ACTIVITY_PAUSED package=com.whatsapp
  package summary line that should be skipped
"#;
        let events = parse_usage_stats(text);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].time, "2024-01-15 10:30:00");
        assert_eq!(events[0].event_type, "ACTIVITY_RESUMED");
        assert_eq!(events[0].package, "com.whatsapp");
        assert_eq!(events[0].extra_info, "class=Main");
        assert_eq!(events[1].extra_info, "");
    }

    #[test]
    fn test_parse_usage_stats_empty_dump() {
        assert!(parse_usage_stats("").is_empty());
        assert!(parse_usage_stats("no events here").is_empty());
    }
}
