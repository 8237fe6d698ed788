use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog answered with an error status, or the request itself failed.
    #[error("catalog request {url} failed (status {status:?}): {message}")]
    Request {
        status: Option<u16>,
        url: String,
        message: String,
    },

    #[error("invalid catalog url: {0}")]
    Url(String),
}

impl CatalogError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Request { status, .. } => *status,
            CatalogError::Url(_) => None,
        }
    }

    /// Rate limiting and server errors are worth another attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self.status(), Some(429) | Some(500..=599))
    }
}
