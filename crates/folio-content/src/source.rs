//! Content source trait and error types.
//!
//! Provides the [`ContentSource`] trait for the three read-only queries a page
//! render needs, along with [`ContentError`] for unified error handling across
//! backends.

use crate::model::{Document, Sidebar, SiteSettings};

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentErrorKind {
    /// The backend rejected the credentials.
    Unauthorized,
    /// The backend rejected the query.
    InvalidQuery,
    /// Backend is temporarily unavailable.
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Response body could not be decoded.
    Decode,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (bad credentials, bad query, undecodable data).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Content error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct ContentError {
    /// Semantic error category.
    pub kind: ContentErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Query that failed (e.g., "document", "sidebar").
    pub query: Option<&'static str>,
    /// Backend identifier (e.g., "Http", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContentError {
    /// Create a new content error.
    #[must_use]
    pub fn new(kind: ContentErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            query: None,
            backend: None,
            source: None,
        }
    }

    /// Attach the name of the failing query.
    #[must_use]
    pub fn with_query(mut self, query: &'static str) -> Self {
        self.query = Some(query);
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create an error from an HTTP status code returned by the backend.
    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        let (kind, retry) = match status {
            401 | 403 => (ContentErrorKind::Unauthorized, ErrorStatus::Permanent),
            400 | 404 | 422 => (ContentErrorKind::InvalidQuery, ErrorStatus::Permanent),
            408 | 504 => (ContentErrorKind::Timeout, ErrorStatus::Temporary),
            429 => (ContentErrorKind::RateLimited, ErrorStatus::Persistent),
            502 | 503 => (ContentErrorKind::Unavailable, ErrorStatus::Persistent),
            _ => (ContentErrorKind::Other, ErrorStatus::Permanent),
        };
        Self::new(kind).with_status(retry)
    }

    /// Create a decode error from a JSON error.
    #[must_use]
    pub fn decode(err: serde_json::Error) -> Self {
        Self::new(ContentErrorKind::Decode).with_source(err)
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (query: document)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            ContentErrorKind::Unauthorized => "Unauthorized",
            ContentErrorKind::InvalidQuery => "Invalid query",
            ContentErrorKind::Unavailable => "Unavailable",
            ContentErrorKind::RateLimited => "Rate limited",
            ContentErrorKind::Timeout => "Timeout",
            ContentErrorKind::Decode => "Decode error",
            ContentErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(query) = self.query {
            write!(f, " (query: {query})")?;
        }

        Ok(())
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read-only access to the content backend.
///
/// Each query returns `Ok(None)` when the backend has no matching record;
/// errors are reserved for transport and decoding failures. A source is bound
/// to one perspective (published or draft content) when it is constructed.
pub trait ContentSource: Send + Sync {
    /// Fetch a document by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the backend cannot be queried.
    fn document(&self, slug: &str) -> Result<Option<Document>, ContentError>;

    /// Fetch the full sidebar tree.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the backend cannot be queried.
    fn sidebar(&self) -> Result<Option<Sidebar>, ContentError>;

    /// Fetch the site settings document.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the backend cannot be queried.
    fn settings(&self) -> Result<Option<SiteSettings>, ContentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_error_new() {
        let err = ContentError::new(ContentErrorKind::Timeout);

        assert_eq!(err.kind, ContentErrorKind::Timeout);
        assert_eq!(err.status, ErrorStatus::Permanent);
        assert!(err.query.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_content_error_from_http_status() {
        let cases = [
            (401, ContentErrorKind::Unauthorized, ErrorStatus::Permanent),
            (403, ContentErrorKind::Unauthorized, ErrorStatus::Permanent),
            (400, ContentErrorKind::InvalidQuery, ErrorStatus::Permanent),
            (429, ContentErrorKind::RateLimited, ErrorStatus::Persistent),
            (503, ContentErrorKind::Unavailable, ErrorStatus::Persistent),
            (504, ContentErrorKind::Timeout, ErrorStatus::Temporary),
            (500, ContentErrorKind::Other, ErrorStatus::Permanent),
        ];

        for (code, kind, status) in cases {
            let err = ContentError::from_http_status(code);
            assert_eq!(err.kind, kind, "status {code}");
            assert_eq!(err.status, status, "status {code}");
        }
    }

    #[test]
    fn test_content_error_decode_keeps_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ContentError::decode(json_err);

        assert_eq!(err.kind, ContentErrorKind::Decode);
        assert!(err.downcast_source::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_content_error_display_simple() {
        let err = ContentError::new(ContentErrorKind::Unavailable);

        assert_eq!(err.to_string(), "Unavailable");
    }

    #[test]
    fn test_content_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err = ContentError::new(ContentErrorKind::Timeout)
            .with_backend("Http")
            .with_query("sidebar")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Http] Timeout: read timed out (query: sidebar)"
        );
    }

    #[test]
    fn test_content_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContentError>();
    }
}
