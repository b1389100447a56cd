//! HTTP transport and sleeping for the search client.
//!
//! Uses `ureq` for synchronous HTTP requests. Both seams are traits so the
//! retry loop can be driven by scripted responses in tests.

use std::time::Duration;

use crate::error::{SearchError, SearchResult};

/// Status and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues an authenticated GET and returns whatever status came back.
///
/// Non-2xx statuses are responses, not errors; only failures to get a
/// response at all (DNS, TLS, timeouts) are `Err`.
pub trait SearchTransport {
    fn get(&self, url: &str, bearer: &str, params: &[(&str, String)]) -> SearchResult<HttpResponse>;
}

/// Blocking transport over a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl SearchTransport for UreqTransport {
    fn get(&self, url: &str, bearer: &str, params: &[(&str, String)]) -> SearchResult<HttpResponse> {
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {bearer}"));
        for (key, value) in params {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|e| SearchError::Transport {
                    url: url.into(),
                    message: format!("read body: {e}"),
                })?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(SearchError::Transport {
                url: url.into(),
                message: transport.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish()
    }
}

/// Blocks the caller for a backoff interval.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Exponential backoff: starts at `initial`, doubles, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial.min(max),
            max,
        }
    }

    /// The wait for this attempt; advances to the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }
}
