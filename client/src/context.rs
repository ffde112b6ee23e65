use reqwest::{Client, Method, RequestBuilder, Url};

use crate::config::{ClientConfig, Session};
use crate::error::ConfigError;

/// Everything a request needs: HTTP client, base URL and bearer token.
///
/// Built once per session and passed to every call instead of living in
/// global state. Cloning is cheap; the HTTP connection pool is shared.
#[derive(Debug, Clone)]
pub struct RequestContext {
    http: Client,
    api_base: Url,
    token: String,
}

impl RequestContext {
    pub fn new(config: &ClientConfig, session: &Session) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("remeal-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::Http)?;
        Ok(Self {
            http,
            api_base: config.api_base().clone(),
            token: session.token.clone(),
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Resolve `segments` below the base URL. Each segment is percent-encoded,
    /// so opaque ids cannot escape their path position.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // ClientConfig rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start an authenticated request.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.url(segments))
            .bearer_auth(&self.token)
    }
}
