//! Tab-separated text writer.

use async_trait::async_trait;
use domain::models::ExportFormat;
use std::io::Write;

use super::{ExportError, ExportSource, ExportWriter};

/// Extra response headers sent with text exports.
pub const TEXT_EXPORT_HEADERS: [(&str, &str); 3] = [
    ("cache-control", "must-revalidate,post-check=0,pre-check=0"),
    ("pragma", "public"),
    ("expires", "0"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter;

/// Tabs and line breaks inside a value would shift columns or rows.
fn clean(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['\t', '\n', '\r']) {
        value.replace(['\t', '\n', '\r'], " ").into()
    } else {
        value.into()
    }
}

fn write_line<'r, W: Write>(out: &mut W, fields: impl IntoIterator<Item = &'r str>) -> std::io::Result<()> {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.write_all(b"\t")?;
        }
        out.write_all(clean(field).as_bytes())?;
    }
    out.write_all(b"\n")
}

impl TextWriter {
    /// Streams the header line and one line per record into `out`.
    pub fn write_to<W: Write>(source: &ExportSource<'_>, out: &mut W) -> std::io::Result<usize> {
        write_line(out, source.labels.export_header())?;
        let mut rows = 0;
        for row in source.rows() {
            write_line(out, row.fields())?;
            rows += 1;
        }
        out.flush()?;
        Ok(rows)
    }
}

#[async_trait]
impl ExportWriter for TextWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    async fn write(&self, source: &ExportSource<'_>) -> Result<Vec<u8>, ExportError> {
        let mut body = Vec::new();
        Self::write_to(source, &mut body)?;
        Ok(body)
    }
}
