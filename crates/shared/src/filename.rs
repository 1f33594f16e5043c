//! Export filename derivation.
//!
//! Every export artifact is named `sanitize(<date label>_<certificate name>).<ext>`.
//! The date label is `ddmmyyyy_ddmmyyyy` for a closed range and the export day
//! (`ddmmyyyy`) otherwise.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

lazy_static::lazy_static! {
    static ref UNSAFE_CHARS: regex::Regex = regex::Regex::new(r#"[\p{Cc}/\\:*?"<>|]"#).unwrap();
    static ref DOT_RUNS: regex::Regex = regex::Regex::new(r"\.{2,}").unwrap();
}

/// Name used when sanitizing leaves nothing behind.
pub const FALLBACK_FILENAME: &str = "export";

const LABEL_DATE_FORMAT: &str = "%d%m%Y";

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Removes characters that are unsafe in a path segment or a header value.
///
/// Control characters and `/ \ : * ? " < > |` are dropped, runs of dots are
/// collapsed to one, and leading/trailing dots and whitespace are trimmed.
/// The function is idempotent.
pub fn sanitize_filename(name: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(name, "");
    let collapsed = DOT_RUNS.replace_all(&stripped, ".");
    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the date part of an export filename.
pub fn date_label(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "{}_{}",
            start.format(LABEL_DATE_FORMAT),
            end.format(LABEL_DATE_FORMAT)
        ),
        _ => today.format(LABEL_DATE_FORMAT).to_string(),
    }
}

/// Derives the sanitized base name (without extension) of an export.
pub fn export_basename(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    certificate_name: &str,
) -> String {
    sanitize_filename(&format!(
        "{}_{}",
        date_label(start, end, today),
        certificate_name
    ))
}

/// Builds an `attachment` Content-Disposition value.
///
/// ASCII names are sent as a quoted `filename`. Names with other characters
/// additionally carry an RFC 5987 `filename*` parameter, with the plain
/// parameter holding an ASCII fallback.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(filename, ATTR_CHAR)
        )
    }
}
