use super::encoding::decode_chain;
use super::sanitize::clean_text;

/// OFX files are SGML-ish text; the structuring service reads them as-is, so
/// extraction only has to decode (headers often lie about the charset, so the
/// full encoding chain runs) and normalize the lines.
pub fn extract_ofx_text(bytes: &[u8]) -> String {
    clean_text(&decode_chain(bytes))
}
