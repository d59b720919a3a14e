use super::types::{RawDocument, SourceFormat};

/// Decide the physical format: MIME type first, filename extension as a
/// fallback, then a magic-byte check for PDFs sent with a generic MIME type.
pub fn detect_format(doc: &RawDocument) -> SourceFormat {
    if let Some(format) = from_mime(&doc.mime_type) {
        return format;
    }
    if let Some(format) = from_extension(&doc.file_name) {
        return format;
    }
    if doc.bytes.starts_with(b"%PDF") {
        return SourceFormat::Pdf;
    }
    SourceFormat::Unsupported
}

fn from_mime(mime: &str) -> Option<SourceFormat> {
    let mime = mime.trim().to_lowercase();
    match mime.as_str() {
        "application/pdf" => Some(SourceFormat::Pdf),
        "text/csv" | "application/csv" => Some(SourceFormat::Csv),
        "application/x-ofx" | "application/ofx" => Some(SourceFormat::Ofx),
        _ if mime.starts_with("image/") => Some(SourceFormat::Image),
        _ => None,
    }
}

fn from_extension(file_name: &str) -> Option<SourceFormat> {
    let ext = file_name.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some(SourceFormat::Pdf),
        "csv" => Some(SourceFormat::Csv),
        "ofx" => Some(SourceFormat::Ofx),
        "png" | "jpg" | "jpeg" | "webp" => Some(SourceFormat::Image),
        _ => None,
    }
}
