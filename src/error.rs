//! Errors at the document boundary.
//!
//! Parsing itself never fails; only turning a file into text can.

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// PDF text layer could not be read (corrupt, encrypted, library panic).
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// Non-PDF input that is not UTF-8 text.
    #[error("input is not UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Document(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
