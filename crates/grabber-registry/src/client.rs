use std::{io::Read as _, time::Instant};

use grabber_dl::http_client::SHARED_AGENT;
use tracing::debug;
use ureq::http::header::CONTENT_LENGTH;
use url::Url;

use crate::{
    error::{ErrorContext, RegistryError, Result},
    metadata::CollectionMetadata,
};

/// Collection detail endpoint of the public Galaxy instance.
pub const DEFAULT_LOOKUP_URL: &str =
    "https://galaxy.ansible.com/api/internal/ui/repo-or-collection-detail/";

/// Host prefix the registry's relative download paths are resolved against.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://galaxy.ansible.com";

/// Looks up the description of a collection.
pub trait RegistryClient {
    /// Issues a single query for `namespace`/`name` and returns the parsed description.
    fn lookup(&self, namespace: &str, name: &str) -> Result<CollectionMetadata>;
}

impl<T: RegistryClient + ?Sized> RegistryClient for &T {
    fn lookup(&self, namespace: &str, name: &str) -> Result<CollectionMetadata> {
        (**self).lookup(namespace, name)
    }
}

/// [`RegistryClient`] talking to a Galaxy compatible HTTP API through the shared agent.
#[derive(Clone, Debug)]
pub struct GalaxyClient {
    lookup_url: String,
    trace: bool,
}

impl GalaxyClient {
    /// Creates a client for the given lookup endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if `lookup_url` is not an absolute URL.
    pub fn new(lookup_url: impl Into<String>) -> Result<Self> {
        let lookup_url = lookup_url.into();
        Url::parse(&lookup_url).map_err(|_| RegistryError::InvalidUrl(lookup_url.clone()))?;

        Ok(Self {
            lookup_url,
            trace: false,
        })
    }

    /// Logs status, size and timing of every registry response at debug level.
    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn lookup_url(&self) -> &str {
        &self.lookup_url
    }
}

impl RegistryClient for GalaxyClient {
    fn lookup(&self, namespace: &str, name: &str) -> Result<CollectionMetadata> {
        debug!("Fetching metadata for {}.{}", namespace, name);

        let started = Instant::now();
        let resp = SHARED_AGENT
            .get(&self.lookup_url)
            .query("namespace", namespace)
            .query("name", name)
            .call()
            .map_err(|err| {
                match err {
                    ureq::Error::StatusCode(status) => {
                        RegistryError::HttpStatus {
                            status,
                            url: self.lookup_url.clone(),
                        }
                    }
                    other => RegistryError::UreqError(other),
                }
            })?;

        let status = resp.status();
        let content_length = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        let mut body = String::new();
        resp.into_body()
            .into_reader()
            .read_to_string(&mut body)
            .with_context(|| format!("reading response from {}", self.lookup_url))?;

        if self.trace {
            debug!(
                namespace,
                name,
                status = status.as_u16(),
                content_length = content_length.as_deref().unwrap_or("-"),
                received = body.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "registry response"
            );
        }

        Ok(serde_json::from_str(&body)?)
    }
}
