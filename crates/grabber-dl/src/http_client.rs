use std::{
    sync::{Arc, LazyLock, PoisonError, RwLock},
    time::Duration,
};

use ureq::{
    http::{self, HeaderMap, Uri},
    typestate::WithoutBody,
    Agent, Proxy, RequestBuilder,
};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("galaxy-grabber/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    /// Creates a `ClientConfig` with the crate's user agent and no proxy, extra headers or
    /// timeout.
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
    /// The returned `Agent` incorporates the configured proxy, global timeout and user agent.
    /// Non-2xx responses are surfaced as `ureq::Error::StatusCode`.
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

    /// Returns a copy of the configuration the shared agent was built from.
    pub fn config(&self) -> ClientConfig {
        SHARED_CLIENT_STATE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config
            .clone()
    }
}

fn apply_headers<B>(mut req: RequestBuilder<B>, headers: &Option<HeaderMap>) -> RequestBuilder<B> {
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
    }
    req
}

pub static SHARED_AGENT: LazyLock<SharedAgent> = LazyLock::new(SharedAgent::new);

/// Updates the global shared HTTP client configuration and rebuilds the shared `Agent`.
///
/// The `updater` closure receives a copy of the current configuration; once it returns, a new
/// `Agent` is built and both are swapped in under the write lock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use grabber_dl::http_client::configure_http_client;
///
/// configure_http_client(|cfg| {
///     cfg.timeout = Some(Duration::from_secs(300));
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
