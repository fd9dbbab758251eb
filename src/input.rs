//! Document loading: PDF text layer or plain UTF-8 text.
//!
//! `pdf_extract` can panic on malformed input, so extraction runs under
//! [`std::panic::catch_unwind`] and panics surface as [`ExtractError::Pdf`].

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ExtractError, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Larger inputs are refused rather than read into memory.
const MAX_INPUT_SIZE: u64 = 256 * 1024 * 1024;

/// Read a document file and return its text, pages joined by line breaks.
pub fn load_document(path: &Path) -> Result<String> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_INPUT_SIZE {
        return Err(ExtractError::Document(format!(
            "{}: {} bytes exceeds the {} byte limit",
            path.display(),
            size,
            MAX_INPUT_SIZE
        )));
    }
    let data = std::fs::read(path)?;
    let text = document_text(data)?;
    info!(path = %path.display(), chars = text.len(), "loaded document");
    Ok(text)
}

/// Text of an in-memory document. PDFs are detected by signature, anything
/// else must be UTF-8.
pub fn document_text(data: Vec<u8>) -> Result<String> {
    if data.starts_with(PDF_MAGIC) {
        pdf_text(&data)
    } else {
        Ok(String::from_utf8(data)?)
    }
}

fn pdf_text(data: &[u8]) -> Result<String> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    let pages = match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => return Err(ExtractError::Pdf(e.to_string())),
        Err(_) => {
            return Err(ExtractError::Pdf(
                "extraction panicked (malformed document)".into(),
            ))
        }
    };

    debug!(pages = pages.len(), "extracted PDF pages");
    let text = pages.join("\n");
    if text.trim().is_empty() {
        return Err(ExtractError::Document(
            "PDF contains no extractable text (may be scanned/image-only)".into(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passthrough() {
        let text = document_text(b"HORIZON-A-2025-01: T\nCall: C".to_vec()).unwrap();
        assert_eq!(text, "HORIZON-A-2025-01: T\nCall: C");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let result = document_text(vec![0x48, 0xff, 0xfe, 0x49]);
        assert!(matches!(result, Err(ExtractError::Encoding(_))));
    }

    #[test]
    fn malformed_pdf_is_an_error() {
        let result = document_text(b"%PDF-1.4\n%%EOF\n".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_document(Path::new("tests/fixtures/does_not_exist.pdf"));
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }

    #[test]
    fn fixture_loads() {
        let text = load_document(Path::new("tests/fixtures/work_programme.txt")).unwrap();
        assert!(text.contains("HORIZON-CL5-2025-D3-01"));
    }
}
