use super::ExtractionError;

/// Extract the embedded text layer of a PDF. Page-by-page extraction
/// preserves reading order better on multi-column statements; if it fails
/// or comes back empty, whole-document extraction is attempted before
/// giving up.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(pages) => match join_pages(pages) {
            Some(text) => Ok(text),
            None => {
                tracing::debug!("per-page PDF extraction came back empty, trying whole document");
                extract_whole_document(bytes)
            }
        },
        Err(page_err) => {
            tracing::debug!(error = %page_err, "per-page PDF extraction failed, trying whole document");
            extract_whole_document(bytes)
        }
    }
}

fn extract_whole_document(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::PdfParsing(e.to_string()))
}

fn join_pages(pages: Vec<String>) -> Option<String> {
    let text = pages.join("\n");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
