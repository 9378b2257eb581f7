//! Error taxonomy for the content pipeline

/// Errors raised while turning CMS documents into pages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A raw document lacks a required field (or it has the wrong shape)
    #[error("malformed document {uid}: missing or invalid field `{field}`")]
    MalformedDocument { field: String, uid: String },

    /// The content source could not be reached or returned garbage
    #[error("content source unavailable: {0}")]
    SourceUnavailable(String),

    /// No document exists for the requested identity
    #[error("{doc_type} `{uid}` not found")]
    NotFound { doc_type: String, uid: String },
}

impl Error {
    pub fn malformed(field: impl Into<String>, uid: impl Into<String>) -> Self {
        Error::MalformedDocument {
            field: field.into(),
            uid: uid.into(),
        }
    }

    pub fn not_found(doc_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Error::NotFound {
            doc_type: doc_type.into(),
            uid: uid.into(),
        }
    }

    /// Whether a caller-initiated retry may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::SourceUnavailable(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::SourceUnavailable(e.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
