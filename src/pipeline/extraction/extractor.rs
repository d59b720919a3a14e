use crate::config::PipelineConfig;

use super::csv::parse_csv;
use super::encoding::decode_chain;
use super::format::detect_format;
use super::ocr::OcrClient;
use super::ofx::extract_ofx_text;
use super::pdf::extract_pdf_text;
use super::sanitize::clean_text;
use super::types::{ExtractedContent, ExtractedText, RawDocument, SourceFormat};
use super::ExtractionError;

/// Front door of the extraction stage: detects the format, routes to the
/// right decoder, normalizes, and enforces the usable-text floor.
pub struct DocumentExtractor<'a> {
    config: &'a PipelineConfig,
    ocr: Option<&'a dyn OcrClient>,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(config: &'a PipelineConfig, ocr: Option<&'a dyn OcrClient>) -> Self {
        Self { config, ocr }
    }

    pub fn extract(&self, doc: &RawDocument) -> Result<ExtractedContent, ExtractionError> {
        let format = detect_format(doc);
        tracing::info!(file = %doc.file_name, ?format, bytes = doc.bytes.len(), "extracting document");

        match format {
            SourceFormat::Pdf => {
                let text = clean_text(&extract_pdf_text(&doc.bytes)?);
                self.usable(text, SourceFormat::Pdf)
            }
            SourceFormat::Csv => {
                let rows = parse_csv(&doc.bytes)?;
                if rows.is_empty() {
                    return Err(ExtractionError::NoUsableText);
                }
                Ok(ExtractedContent::Rows(rows))
            }
            SourceFormat::Ofx => {
                let text = extract_ofx_text(&doc.bytes);
                self.usable(text, SourceFormat::Ofx)
            }
            SourceFormat::Image => {
                let ocr = self
                    .ocr
                    .ok_or_else(|| ExtractionError::Ocr("no OCR client configured".into()))?;
                let text = clean_text(&ocr.extract_text(&doc.bytes)?);
                self.usable(text, SourceFormat::Image)
            }
            SourceFormat::Unsupported => {
                // plain-text fallback keeps .txt statement dumps working
                if doc.file_name.to_lowercase().ends_with(".txt")
                    || doc.mime_type.starts_with("text/")
                {
                    let text = clean_text(&decode_chain(&doc.bytes));
                    return self.usable(text, SourceFormat::Ofx);
                }
                Err(ExtractionError::UnsupportedFormat(doc.mime_type.clone()))
            }
        }
    }

    fn usable(
        &self,
        text: String,
        format: SourceFormat,
    ) -> Result<ExtractedContent, ExtractionError> {
        let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
        if meaningful < self.config.min_extracted_chars {
            return Err(ExtractionError::NoUsableText);
        }
        Ok(ExtractedContent::Text(ExtractedText { text, format }))
    }
}
