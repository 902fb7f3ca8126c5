use thiserror::Error;

/// Data-quality failures: the input itself is unusable. Terminal for the one
/// import call, never retried.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is not well-formed XML: {0}")]
    XmlSyntax(#[from] roxmltree::Error),

    #[error("input is not valid UTF-8 text")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("no supported fiscal document anchor found (expected NF-e or CT-e)")]
    UnrecognizedDocument,

    #[error("malformed {doc_type} document: {reason}")]
    Malformed {
        doc_type: &'static str,
        reason: String,
    },
}

/// Separates what the caller should skip (bad input) from what the caller may
/// retry (storage trouble).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl ImportError {
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
