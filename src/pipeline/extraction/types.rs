use serde::{Deserialize, Serialize};

/// An incoming document exactly as received, before any decoding.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

/// Physical format of a document, decided from MIME type, extension and
/// magic bytes. Distinct from `SourceKind`, which names the financial
/// document type and drives deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Pdf,
    Csv,
    Ofx,
    Image,
    Unsupported,
}

/// Free text recovered from a document, already line-normalized.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub format: SourceFormat,
}

/// One parsed CSV record. Keys are the lower-cased, trimmed header names;
/// order follows the header so rendered rows are stable.
#[derive(Debug, Clone)]
pub struct CsvRow {
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when any field whose key contains `fragment` has a value.
    pub fn has_field_like(&self, fragment: &str) -> bool {
        self.fields
            .iter()
            .any(|(k, v)| k.contains(fragment) && !v.trim().is_empty())
    }
}

/// What extraction hands to the rest of the pipeline.
#[derive(Debug, Clone)]
pub enum ExtractedContent {
    Text(ExtractedText),
    Rows(Vec<CsvRow>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_lookup_and_presence() {
        let row = CsvRow {
            line: 2,
            fields: vec![
                ("data".into(), "01/06/2025".into()),
                ("valor".into(), "120,00".into()),
                ("descricao".into(), "".into()),
            ],
        };
        assert_eq!(row.get("data"), Some("01/06/2025"));
        assert!(row.get("saldo").is_none());
        assert!(row.has_field_like("val"));
        assert!(!row.has_field_like("desc"));
    }
}
