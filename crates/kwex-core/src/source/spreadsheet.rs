//! Excel workbooks (.xls and .xlsx) via calamine.

use super::{DocumentReader, RawContent, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Workbook {
    Xls,
    Xlsx,
}

/// Reads every worksheet in workbook order and concatenates their rows
/// into one grid.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetReader {
    kind: Workbook,
}

impl SpreadsheetReader {
    pub fn xls() -> Self {
        Self { kind: Workbook::Xls }
    }

    pub fn xlsx() -> Self {
        Self { kind: Workbook::Xlsx }
    }
}

/// Render a numeric cell the way it reads in the sheet: integral values
/// lose the trailing `.0`.
pub fn format_cell_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(feature = "office")]
mod workbook {
    use std::fmt::Display;
    use std::io::{Read, Seek};

    use calamine::{Data, Reader};
    use tracing::{debug, trace};

    use super::format_cell_number;
    use crate::error::SourceError;

    pub(super) type Rows = Vec<Vec<Option<String>>>;

    pub(super) fn collect_rows<RS, R>(mut workbook: R) -> Result<Rows, SourceError>
    where
        RS: Read + Seek,
        R: Reader<RS>,
        R::Error: Display,
    {
        let mut rows = Vec::new();

        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| SourceError::Spreadsheet(format!("sheet '{}': {}", name, e)))?;
            // Ranges start at the first used cell; pad back to A1 so column
            // indices line up across sheets.
            let (first_row, first_col) = range.start().unwrap_or((0, 0));
            trace!(
                "Sheet '{}': {:?} from ({}, {})",
                name,
                range.get_size(),
                first_row,
                first_col
            );

            rows.extend((0..first_row).map(|_| Vec::new()));
            rows.extend(range.rows().map(|row| {
                std::iter::repeat_n(None, first_col as usize)
                    .chain(row.iter().map(cell_text))
                    .collect::<Vec<_>>()
            }));
        }

        debug!("Read {} rows from workbook", rows.len());
        Ok(rows)
    }

    pub(super) fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if s.is_empty() => None,
            Data::String(s) => Some(s.clone()),
            Data::Float(f) => Some(format_cell_number(*f)),
            Data::Int(i) => Some(i.to_string()),
            Data::Bool(b) => Some(b.to_string()),
            _ => Some(format!("{cell}")),
        }
    }
}

#[cfg(feature = "office")]
impl DocumentReader for SpreadsheetReader {
    fn read(&self, data: &[u8]) -> Result<RawContent> {
        use std::io::Cursor;

        use calamine::{Xls, Xlsx};

        use crate::error::SourceError;

        let cursor = Cursor::new(data);
        let rows = match self.kind {
            Workbook::Xls => {
                let workbook: Xls<_> = calamine::open_workbook_from_rs(cursor)
                    .map_err(|e| SourceError::Spreadsheet(format!("failed to open xls: {e}")))?;
                workbook::collect_rows(workbook)?
            }
            Workbook::Xlsx => {
                let workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
                    .map_err(|e| SourceError::Spreadsheet(format!("failed to open xlsx: {e}")))?;
                workbook::collect_rows(workbook)?
            }
        };

        Ok(RawContent::Table(rows))
    }
}

#[cfg(not(feature = "office"))]
impl DocumentReader for SpreadsheetReader {
    fn read(&self, _data: &[u8]) -> Result<RawContent> {
        let name = match self.kind {
            Workbook::Xls => "XLS",
            Workbook::Xlsx => "XLSX",
        };
        Err(crate::error::SourceError::Disabled(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell_number() {
        assert_eq!(format_cell_number(5.0), "5");
        assert_eq!(format_cell_number(-12.0), "-12");
        assert_eq!(format_cell_number(10.5), "10.5");
        assert_eq!(format_cell_number(0.25), "0.25");
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_cell_text() {
        use calamine::Data;

        assert_eq!(workbook::cell_text(&Data::Empty), None);
        assert_eq!(workbook::cell_text(&Data::String(String::new())), None);
        assert_eq!(workbook::cell_text(&Data::String("Qty".into())), Some("Qty".into()));
        assert_eq!(workbook::cell_text(&Data::Float(3.0)), Some("3".into()));
        assert_eq!(workbook::cell_text(&Data::Int(42)), Some("42".into()));
        assert_eq!(workbook::cell_text(&Data::Bool(true)), Some("true".into()));
    }

    #[cfg(feature = "office")]
    mod xlsx {
        use std::io::{Cursor, Write};

        const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
        const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

        /// Shared strings used by the sheets below, by index.
        const STRINGS: [&str; 5] = ["Code", "A1", "Qty", "Remarks", "fragile"];

        // S1: A1=Code, A2=A1, B2=Qty, C2=5
        const SHEET1: &str = r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row><row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="s"><v>2</v></c><c r="C2"><v>5</v></c></row>"#;

        // S2: C1=Remarks, C2=fragile, D2=12.5
        const SHEET2: &str = r#"<row r="1"><c r="C1" t="s"><v>3</v></c></row><row r="2"><c r="C2" t="s"><v>4</v></c><c r="D2"><v>12.5</v></c></row>"#;

        pub(super) fn workbook() -> Vec<u8> {
            let shared: String = STRINGS.iter().map(|s| format!("<si><t>{s}</t></si>")).collect();
            let parts = [
                (
                    "[Content_Types].xml",
                    r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#.to_string(),
                ),
                (
                    "_rels/.rels",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#),
                ),
                (
                    "xl/workbook.xml",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{NS}" xmlns:r="{REL_NS}"><sheets><sheet name="S1" sheetId="1" r:id="rId1"/><sheet name="S2" sheetId="2" r:id="rId2"/></sheets></workbook>"#),
                ),
                (
                    "xl/_rels/workbook.xml.rels",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{REL_NS}/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="{REL_NS}/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#),
                ),
                (
                    "xl/sharedStrings.xml",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{NS}" count="5" uniqueCount="5">{shared}</sst>"#),
                ),
                (
                    "xl/worksheets/sheet1.xml",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{NS}"><sheetData>{SHEET1}</sheetData></worksheet>"#),
                ),
                (
                    "xl/worksheets/sheet2.xml",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{NS}"><sheetData>{SHEET2}</sheetData></worksheet>"#),
                ),
            ];

            let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, content) in parts {
                writer.start_file(name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap().into_inner()
        }
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_read_workbook_keeps_absolute_columns() {
        use crate::source::{TextSource, adapt};
        use pretty_assertions::assert_eq;

        let raw = SpreadsheetReader::xlsx().read(&xlsx::workbook()).unwrap();
        assert_eq!(
            adapt(raw),
            TextSource::grid([
                vec!["Code", "", ""],
                vec!["A1", "Qty", "5"],
                vec!["", "", "Remarks", ""],
                vec!["", "", "fragile", "12.5"],
            ])
        );
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_vertical_scan_across_sheets() {
        use crate::extract::{ResolvedValue, resolve};
        use crate::models::column::{Behavior, ColumnSpec};
        use crate::rules::ExtractionRules;
        use crate::source::{FormatLoader, InputFile, SourceLoader};
        use pretty_assertions::assert_eq;

        let source = FormatLoader::new()
            .load(&InputFile::new("stock.xlsx", xlsx::workbook()))
            .unwrap();
        let rules = ExtractionRules::new(vec![
            ColumnSpec::new("Code", "Code", Behavior::Below),
            ColumnSpec::new("Remarks", "Remarks", Behavior::Below),
            ColumnSpec::new("Qty", "Qty", Behavior::Right),
        ])
        .unwrap();

        let resolution = resolve(&source, &rules);
        assert_eq!(resolution.get("Code"), Some(&ResolvedValue::Many(vec!["A1".into()])));
        assert_eq!(
            resolution.get("Remarks"),
            Some(&ResolvedValue::Many(vec!["fragile".into()]))
        );
        assert_eq!(resolution.get("Qty"), Some(&ResolvedValue::Single("5".into())));
    }

    #[cfg(feature = "office")]
    #[test]
    fn test_corrupt_workbook() {
        use crate::error::SourceError;

        let err = SpreadsheetReader::xlsx().read(b"not a workbook").unwrap_err();
        assert!(matches!(err, SourceError::Spreadsheet(_)));

        let err = SpreadsheetReader::xls().read(b"not a workbook").unwrap_err();
        assert!(matches!(err, SourceError::Spreadsheet(_)));
    }
}
