use std::{
    sync::{Arc, LazyLock, PoisonError, RwLock},
    time::Duration,
};

use ureq::{
    http::{self, HeaderMap, Uri},
    typestate::WithoutBody,
    Agent, Proxy, RequestBuilder,
};

/// Client identifier sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    concat!("yanked/", env!("CARGO_PKG_VERSION"), " (GitHub Package Manager)");

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    /// The default sets the yanked user agent and leaves proxy, headers, and timeout unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use yanked_dl::http_client::{ClientConfig, DEFAULT_USER_AGENT};
    ///
    /// let cfg = ClientConfig::default();
    /// assert_eq!(cfg.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
    /// assert!(cfg.proxy.is_none());
    /// ```
    fn default() -> Self {
        Self {
            user_agent: Some(DEFAULT_USER_AGENT.into()),
            proxy: None,
            headers: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    ///
    /// The returned `Agent` will incorporate the configured proxy, global timeout,
    /// and user agent header (if present).
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

struct SharedClient {
    agent: Agent,
    config: ClientConfig,
}

static SHARED_CLIENT_STATE: LazyLock<Arc<RwLock<SharedClient>>> = LazyLock::new(|| {
    let config = ClientConfig::default();
    let agent = config.build();

    Arc::new(RwLock::new(SharedClient {
        agent,
        config,
    }))
});

#[derive(Clone, Default)]
pub struct SharedAgent;

impl SharedAgent {
    pub fn new() -> Self {
        Self
    }

    /// Create a GET request builder for the given URI using the shared agent.
    ///
    /// Any global headers configured in the shared client are applied to the request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yanked_dl::http_client::SHARED_AGENT;
    ///
    /// let response = SHARED_AGENT.get("https://raw.githubusercontent.com/u/r/main/x.sh").call();
    /// ```
    pub fn get<T>(&self, uri: T) -> RequestBuilder<WithoutBody>
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        let state = SHARED_CLIENT_STATE
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let req = state.agent.get(uri);
        apply_headers(req, &state.config.headers)
    }

    /// Returns the user agent the shared client currently sends.
    pub fn user_agent(&self) -> Option<String> {
        SHARED_CLIENT_STATE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config
            .user_agent
            .clone()
    }
}

/// Apply headers from an optional `HeaderMap` to a `RequestBuilder`.
fn apply_headers<B>(mut req: RequestBuilder<B>, headers: &Option<HeaderMap>) -> RequestBuilder<B> {
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    req
}

pub static SHARED_AGENT: LazyLock<SharedAgent> = LazyLock::new(SharedAgent::new);

/// Updates the global shared HTTP client configuration by applying the provided updater and
/// rebuilding the shared Agent.
///
/// # Examples
///
/// ```
/// use yanked_dl::http_client::configure_http_client;
///
/// configure_http_client(|cfg| {
///     cfg.user_agent = Some("my-app/1.0".to_string());
/// });
/// ```
pub fn configure_http_client<F>(updater: F)
where
    F: FnOnce(&mut ClientConfig),
{
    let mut state = SHARED_CLIENT_STATE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let mut new_config = state.config.clone();
    updater(&mut new_config);
    let new_agent = new_config.build();
    state.agent = new_agent;
    state.config = new_config;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
        assert!(config.proxy.is_none());
        assert!(config.headers.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_default_user_agent_identifies_client() {
        assert!(DEFAULT_USER_AGENT.starts_with("yanked/"));
        assert!(DEFAULT_USER_AGENT.ends_with("(GitHub Package Manager)"));
    }

    #[test]
    fn test_client_config_with_timeout() {
        let config = ClientConfig {
            user_agent: Some("test-agent".to_string()),
            proxy: None,
            headers: None,
            timeout: Some(Duration::from_secs(30)),
        };
        let _agent = config.build();
    }

    #[test]
    fn test_apply_headers() {
        let agent: ureq::Agent = ureq::Agent::config_builder().build().into();

        let req = apply_headers(agent.get("https://example.com"), &None);
        assert!(req.headers_ref().is_some_and(|h| h.is_empty()));

        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::ACCEPT,
            http::HeaderValue::from_static("text/plain"),
        );
        let req = apply_headers(agent.get("https://example.com"), &Some(headers));
        assert!(req
            .headers_ref()
            .is_some_and(|h| h.contains_key(http::header::ACCEPT)));
    }

    #[test]
    fn test_configure_http_client() {
        configure_http_client(|cfg| {
            cfg.timeout = Some(Duration::from_secs(10));
        });
        assert_eq!(
            SHARED_AGENT.user_agent().as_deref(),
            Some(DEFAULT_USER_AGENT)
        );
        let _ = SHARED_AGENT.get("https://example.com");
    }
}
