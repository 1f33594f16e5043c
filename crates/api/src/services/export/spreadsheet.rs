//! Helpers shared by the XML-based spreadsheet writers.

/// Longest worksheet name spreadsheet applications accept.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Escapes text for XML character data and attribute values. Characters
/// that XML 1.0 cannot carry are dropped.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Makes a label usable as a worksheet name.
pub fn sheet_name(label: &str) -> String {
    let name: String = label
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let name = name.trim().to_string();
    if name.is_empty() {
        "Sheet1".to_string()
    } else {
        name
    }
}
