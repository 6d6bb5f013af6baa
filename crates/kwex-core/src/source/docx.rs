//! Word (.docx) paragraph text.

use super::{DocumentReader, RawContent, Result};

/// Reads `word/document.xml` from the package and emits one line per
/// paragraph, so empty paragraphs become blank lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxReader;

#[cfg(feature = "office")]
impl DocumentReader for DocxReader {
    fn read(&self, data: &[u8]) -> Result<RawContent> {
        let xml = document_xml(data)?;
        let paragraphs = paragraphs(&xml)?;
        Ok(RawContent::Text(paragraphs.join("\n")))
    }
}

#[cfg(not(feature = "office"))]
impl DocumentReader for DocxReader {
    fn read(&self, _data: &[u8]) -> Result<RawContent> {
        Err(crate::error::SourceError::Disabled("DOCX"))
    }
}

#[cfg(feature = "office")]
fn document_xml(data: &[u8]) -> Result<String> {
    use std::io::{Cursor, Read};

    use crate::error::SourceError;

    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| SourceError::Docx(e.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| SourceError::Docx(format!("word/document.xml: {}", e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| SourceError::Docx(e.to_string()))?;
    Ok(xml)
}

#[cfg(feature = "office")]
fn paragraphs(xml: &str) -> Result<Vec<String>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    use crate::error::SourceError;

    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SourceError::Docx(e.to_string()))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            // Tab stops under w:pPr share the w:tab name, hence the run check.
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| SourceError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
