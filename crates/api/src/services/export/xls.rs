//! Excel writer (XML Spreadsheet 2003 markup).

use async_trait::async_trait;
use domain::models::ExportFormat;

use super::spreadsheet::{sheet_name, xml_escape};
use super::{ExportError, ExportSource, ExportWriter};

const WORKBOOK_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<?mso-application progid="Excel.Sheet"?>
<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet" xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsWriter;

fn push_row<'r>(out: &mut String, cells: impl IntoIterator<Item = &'r str>) {
    out.push_str("<Row>");
    for cell in cells {
        out.push_str("<Cell><Data ss:Type=\"String\">");
        out.push_str(&xml_escape(cell));
        out.push_str("</Data></Cell>");
    }
    out.push_str("</Row>\n");
}

impl XlsWriter {
    fn build(source: &ExportSource<'_>) -> String {
        let mut xml = String::from(WORKBOOK_OPEN);
        xml.push_str(&format!(
            "<Worksheet ss:Name=\"{}\">\n<Table>\n",
            xml_escape(&sheet_name(&source.labels.sheet_name))
        ));
        push_row(&mut xml, source.labels.export_header());
        for row in source.rows() {
            push_row(&mut xml, row.fields());
        }
        xml.push_str("</Table>\n</Worksheet>\n</Workbook>\n");
        xml
    }
}

#[async_trait]
impl ExportWriter for XlsWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xls
    }

    async fn write(&self, source: &ExportSource<'_>) -> Result<Vec<u8>, ExportError> {
        Ok(Self::build(source).into_bytes())
    }
}
