//! Blocking HTTP fetcher backed by `ureq`.

use std::io::Read;

use tracing::debug;
use url::Url;

use super::{FetchError, FetchResponse, Fetcher};
use crate::config::FetchConfig;

/// [`Fetcher`] that issues real GET requests through a shared `ureq` agent.
///
/// Redirects are followed by the agent. Error statuses (4xx/5xx) are
/// returned as responses, not errors.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_body_bytes: u64,
}

impl HttpFetcher {
    /// Build a fetcher from the `[fetch]` configuration section.
    pub fn new(config: &FetchConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn read_response(&self, url: &str, response: ureq::Response) -> Result<FetchResponse, FetchError> {
        let status = response.status();
        let content_type = response.header("Content-Type").map(String::from);

        let mut body = Vec::new();
        response
            .into_reader()
            .take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;
        if body.len() as u64 > self.max_body_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_body_bytes,
            });
        }

        debug!(
            url,
            status,
            content_type = content_type.as_deref().unwrap_or(""),
            bytes = body.len(),
            "Fetched"
        );
        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let parsed = Url::parse(url).map_err(|err| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        match self.agent.get(parsed.as_str()).call() {
            Ok(resp) => self.read_response(url, resp),
            Err(ureq::Error::Status(_, resp)) => self.read_response(url, resp),
            Err(ureq::Error::Transport(err)) => Err(FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}
