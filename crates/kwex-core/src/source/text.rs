//! Plain text files.

use super::{DocumentReader, RawContent, Result};

/// UTF-8 text reader. A leading byte-order mark is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReader;

impl DocumentReader for TextReader {
    fn read(&self, data: &[u8]) -> Result<RawContent> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        let text = String::from_utf8(data.to_vec())?;
        Ok(RawContent::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;

    #[test]
    fn test_read_utf8() {
        let raw = TextReader.read("Data: 1\u{00a0}234\n".as_bytes()).unwrap();
        assert_eq!(raw, RawContent::Text("Data: 1\u{00a0}234\n".to_string()));
    }

    #[test]
    fn test_strip_bom() {
        let raw = TextReader.read(b"\xEF\xBB\xBFItem: A").unwrap();
        assert_eq!(raw, RawContent::Text("Item: A".to_string()));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = TextReader.read(&[0x49, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, SourceError::Encoding(_)));
    }
}
