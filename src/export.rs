//! Flat JSON export of extracted text runs.
//!
//! Output is a single JSON array of records, one per run, in list order:
//! `[{"p":1,"x":10.00,"y":20.00,"w":50.00,"h":12.00,"t":"Hello"},...]`.
//! Numbers are fixed two-decimal, always dot-separated. Escaping is
//! deliberately partial: backslash and double quote are escaped, newline and
//! carriage return are each collapsed to a single space, and no other
//! characters are touched. Downstream consumers rely on this exact surface.

use crate::runs::TextRun;

/// Serializes runs to the flat JSON array format. Empty input yields `[]`.
pub fn serialize_runs(runs: &[TextRun]) -> String {
    let mut out = String::with_capacity(2 + runs.len() * 64);
    out.push('[');
    for (i, run) in runs.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"p":{},"x":{:.2},"y":{:.2},"w":{:.2},"h":{:.2},"t":"{}"}}"#,
            run.page,
            run.x,
            run.y,
            run.width,
            run.height,
            escape_text(&run.text)
        ));
    }
    out.push(']');
    out
}

/// Escapes run text for embedding in a JSON string literal.
///
/// Backslash is doubled before quotes are escaped so the inserted escape
/// backslashes survive untouched. Line breaks become spaces rather than
/// `\n`/`\r` sequences. Tabs and other control characters pass through.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ")
        .replace('\r', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(page: u32, text: &str, x: f32, y: f32, width: f32, height: f32) -> TextRun {
        TextRun {
            text: text.into(),
            x,
            y,
            width,
            height,
            page,
        }
    }

    #[test]
    fn test_empty_list_serializes_to_empty_array() {
        assert_eq!(serialize_runs(&[]), "[]");
    }

    #[test]
    fn test_single_record_format() {
        let runs = vec![run(1, "Hello", 10.0, 20.0, 50.0, 12.0)];
        assert_eq!(
            serialize_runs(&runs),
            r#"[{"p":1,"x":10.00,"y":20.00,"w":50.00,"h":12.00,"t":"Hello"}]"#
        );
    }

    #[test]
    fn test_records_joined_with_commas() {
        let runs = vec![
            run(1, "a", 0.0, 0.0, 1.0, 1.0),
            run(2, "b", 0.0, 0.0, 1.0, 1.0),
        ];
        let json = serialize_runs(&runs);
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
        assert_eq!(json.matches("},{").count(), 1);
    }

    #[test]
    fn test_two_decimal_formatting() {
        let runs = vec![run(1, "t", 1.0, 2.5, 3.333, 4.666)];
        let json = serialize_runs(&runs);
        assert!(json.contains(r#""x":1.00"#));
        assert!(json.contains(r#""y":2.50"#));
        assert!(json.contains(r#""w":3.33"#));
        assert!(json.contains(r#""h":4.67"#));
    }

    #[test]
    fn test_escape_backslash_and_quote() {
        let runs = vec![run(1, r#"a\b"c"#, 0.0, 0.0, 1.0, 1.0)];
        let json = serialize_runs(&runs);
        assert!(json.contains(r#""t":"a\\b\"c""#));
    }

    #[test]
    fn test_escape_backslash_before_quote() {
        // A backslash-quote pair must come out as \\\" not \\\\".
        assert_eq!(escape_text(r#"\""#), r#"\\\""#);
    }

    #[test]
    fn test_line_breaks_become_spaces() {
        assert_eq!(escape_text("a\nb\rc\r\nd"), "a b c  d");
    }

    #[test]
    fn test_other_controls_pass_through() {
        // Only the four listed characters are handled; tab survives as-is.
        assert_eq!(escape_text("a\tb"), "a\tb");
    }

    #[test]
    fn test_escaping_is_one_way() {
        // " J\"L\" " shape from the escaping contract: the escaped form
        // parses back to the space-collapsed text, not the original.
        let original = "J\"L\"\nSmith";
        let escaped = escape_text(original);
        assert_eq!(escaped, r#"J\"L\" Smith"#);
        // Undoing the escapes recovers the collapsed form.
        let unescaped = escaped.replace("\\\"", "\"").replace("\\\\", "\\");
        assert_eq!(unescaped, "J\"L\" Smith");
        assert_ne!(unescaped, original);
    }
}
