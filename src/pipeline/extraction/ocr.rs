use super::ExtractionError;

/// External OCR collaborator for photographed receipts. The pipeline only
/// needs raw text back; which engine or service produces it is the caller's
/// concern.
pub trait OcrClient: Send + Sync {
    fn extract_text(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

#[cfg(test)]
pub struct MockOcrClient {
    pub response: Result<String, String>,
}

#[cfg(test)]
impl MockOcrClient {
    pub fn returning(text: &str) -> Self {
        Self { response: Ok(text.to_string()) }
    }

    pub fn failing(message: &str) -> Self {
        Self { response: Err(message.to_string()) }
    }
}

#[cfg(test)]
impl OcrClient for MockOcrClient {
    fn extract_text(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        self.response
            .clone()
            .map_err(ExtractionError::Ocr)
    }
}
