//! HTTP content source.
//!
//! Sync client for a GROQ query API. Each source is bound to one
//! [`Perspective`]; the server keeps one for published content and one for
//! preview requests.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;

use crate::model::{Document, Sidebar, SiteSettings};
use crate::query::{self, Perspective};
use crate::source::{ContentError, ContentErrorKind, ContentSource, ErrorStatus};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Backend identifier used in error messages.
const BACKEND: &str = "Http";

/// Query response envelope.
#[derive(Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

/// Content source backed by the query HTTP API.
pub struct HttpSource {
    agent: Agent,
    base_url: String,
    dataset: String,
    api_version: String,
    token: Option<String>,
    perspective: Perspective,
}

impl HttpSource {
    /// Create a source.
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g. `https://<project>.api.sanity.io`)
    /// * `dataset` - Dataset name
    /// * `api_version` - API version date or `1`
    /// * `perspective` - Published or draft content
    #[must_use]
    pub fn new(base_url: &str, dataset: &str, api_version: &str, perspective: Perspective) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            dataset: dataset.to_owned(),
            api_version: api_version.to_owned(),
            token: None,
            perspective,
        }
    }

    /// Authenticate requests with a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Run a query and decode its `result`.
    fn fetch<T: DeserializeOwned>(
        &self,
        name: &'static str,
        groq: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, ContentError> {
        let url = query::query_url(
            &self.base_url,
            &self.api_version,
            &self.dataset,
            self.perspective,
            groq,
            params,
        );

        debug!(query = name, perspective = ?self.perspective, "Querying content backend");

        let mut request = self.agent.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request
            .call()
            .map_err(|e| transport_error(e).with_query(name))?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();
        let body = body_reader
            .read_to_string()
            .map_err(|e| transport_error(e).with_query(name))?;

        if status >= 400 {
            debug!(query = name, status, body = %body, "Content backend returned an error");
            return Err(ContentError::from_http_status(status)
                .with_backend(BACKEND)
                .with_query(name));
        }

        let response: QueryResponse<T> = serde_json::from_str(&body).map_err(|e| {
            ContentError::decode(e)
                .with_backend(BACKEND)
                .with_query(name)
        })?;
        Ok(response.result)
    }
}

/// Map a transport failure to a content error.
fn transport_error(err: ureq::Error) -> ContentError {
    let (kind, status) = match &err {
        ureq::Error::Timeout(_) => (ContentErrorKind::Timeout, ErrorStatus::Temporary),
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
            (ContentErrorKind::Unavailable, ErrorStatus::Temporary)
        }
        _ => (ContentErrorKind::Other, ErrorStatus::Permanent),
    };
    ContentError::new(kind)
        .with_status(status)
        .with_backend(BACKEND)
        .with_source(err)
}

impl ContentSource for HttpSource {
    fn document(&self, slug: &str) -> Result<Option<Document>, ContentError> {
        self.fetch("document", query::DOCUMENT_BY_SLUG, &[("slug", slug)])
    }

    fn sidebar(&self) -> Result<Option<Sidebar>, ContentError> {
        self.fetch("sidebar", query::SIDEBAR, &[])
    }

    fn settings(&self) -> Result<Option<SiteSettings>, ContentError> {
        self.fetch("settings", query::SETTINGS, &[])
    }
}
