//! OpenDocument spreadsheet writer.

use async_trait::async_trait;
use domain::models::ExportFormat;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::spreadsheet::{sheet_name, xml_escape};
use super::{ExportError, ExportSource, ExportWriter};

const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
 <manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>
"#;

const CONTENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2">
<office:body><office:spreadsheet>"#;

const CONTENT_CLOSE: &str = "</office:spreadsheet></office:body></office:document-content>\n";

/// Builds a single-sheet `.ods` package in memory.
///
/// The `mimetype` entry comes first and uncompressed, as ODF requires.
/// Entry timestamps are fixed so identical input gives identical bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdsWriter;

fn write_row<'r, W: Write>(out: &mut W, cells: impl IntoIterator<Item = &'r str>) -> std::io::Result<()> {
    out.write_all(b"<table:table-row>")?;
    for cell in cells {
        write!(
            out,
            "<table:table-cell office:value-type=\"string\"><text:p>{}</text:p></table:table-cell>",
            xml_escape(cell)
        )?;
    }
    out.write_all(b"</table:table-row>\n")
}

impl OdsWriter {
    fn build(source: &ExportSource<'_>) -> zip::result::ZipResult<Vec<u8>> {
        let stored = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());
        let deflated = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        zip.start_file("META-INF/manifest.xml", deflated)?;
        zip.write_all(MANIFEST.as_bytes())?;

        zip.start_file("content.xml", deflated)?;
        zip.write_all(CONTENT_OPEN.as_bytes())?;
        write!(
            zip,
            "<table:table table:name=\"{}\">\n",
            xml_escape(&sheet_name(&source.labels.sheet_name))
        )?;
        write_row(&mut zip, source.labels.export_header())?;
        for row in source.rows() {
            write_row(&mut zip, row.fields())?;
        }
        zip.write_all(b"</table:table>")?;
        zip.write_all(CONTENT_CLOSE.as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }
}

#[async_trait]
impl ExportWriter for OdsWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Ods
    }

    async fn write(&self, source: &ExportSource<'_>) -> Result<Vec<u8>, ExportError> {
        Ok(Self::build(source)?)
    }
}
