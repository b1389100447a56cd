//! Recent-search client for the Twitter v2 API.
//!
//! One request per fetch (no pagination). HTTP 429 is retried forever with
//! exponential backoff; any other non-200 status aborts immediately.
//! Results are joined with the response's `includes.users` side table so
//! each [`Record`] carries the author's username.

pub mod transport;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{SearchError, SearchResult};
use crate::record::Record;

pub use transport::{Backoff, HttpResponse, SearchTransport, Sleeper, ThreadSleeper, UreqTransport};

/// Path of the recent-search endpoint, relative to the API base URL.
pub const SEARCH_PATH: &str = "/2/tweets/search/recent";

/// Bounds the endpoint accepts for `max_results`.
pub const MIN_RESULTS: u32 = 10;
pub const MAX_RESULTS: u32 = 100;

const TWEET_FIELDS: &str = "id,text,created_at,public_metrics,author_id";
const USER_FIELDS: &str = "id,username,name";

/// Search client generic over its transport and sleeper.
pub struct SearchClient<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    url: String,
    bearer: String,
    backoff_initial: Duration,
    backoff_max: Duration,
}

impl<T: SearchTransport, S: Sleeper> SearchClient<T, S> {
    pub fn new(transport: T, sleeper: S, base_url: &str, bearer: impl Into<String>) -> Self {
        Self {
            transport,
            sleeper,
            url: format!("{}{SEARCH_PATH}", base_url.trim_end_matches('/')),
            bearer: bearer.into(),
            backoff_initial: Duration::from_secs(1),
            backoff_max: Duration::from_secs(60),
        }
    }

    /// Override the backoff schedule (defaults: 1 s initial, 60 s cap).
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.backoff_initial = initial;
        self.backoff_max = max;
        self
    }

    /// Full endpoint URL requests go to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch up to `max_results` recent English non-retweets matching `query`.
    ///
    /// The request asks for at least the endpoint minimum; surplus records
    /// are dropped so no more than `max_results` are returned.
    pub fn fetch(&self, query: &str, max_results: u32) -> SearchResult<Vec<Record>> {
        let params = search_params(query, max_results);
        let mut backoff = Backoff::new(self.backoff_initial, self.backoff_max);

        loop {
            let response = self.transport.get(&self.url, &self.bearer, &params)?;
            match response.status {
                200 => {
                    let mut records = parse_response(&response.body)?;
                    records.truncate(max_results as usize);
                    return Ok(records);
                }
                429 => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        seconds = delay.as_secs_f64(),
                        "rate limited by search API, backing off"
                    );
                    self.sleeper.sleep(delay);
                }
                status => {
                    tracing::error!(status, body = %response.body, "search API error");
                    return Err(SearchError::Status {
                        status,
                        body: response.body,
                    });
                }
            }
        }
    }
}

impl<T, S> std::fmt::Debug for SearchClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("url", &self.url)
            .field("bearer", &"<redacted>")
            .finish()
    }
}

/// Query parameters for one recent-search request.
pub fn search_params(query: &str, max_results: u32) -> Vec<(&'static str, String)> {
    vec![
        ("query", format!("{query} -is:retweet lang:en")),
        (
            "max_results",
            max_results.clamp(MIN_RESULTS, MAX_RESULTS).to_string(),
        ),
        ("tweet.fields", TWEET_FIELDS.to_string()),
        ("expansions", "author_id".to_string()),
        ("user.fields", USER_FIELDS.to_string()),
    ]
}

// ---------------------------------------------------------------------------
// Response shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ApiTweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    text: Option<String>,
    author_id: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    username: Option<String>,
}

/// Normalize a 200 response body into records, joining author usernames.
pub fn parse_response(body: &str) -> SearchResult<Vec<Record>> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| SearchError::Parse {
        message: e.to_string(),
    })?;

    let usernames: HashMap<&str, &str> = response
        .includes
        .users
        .iter()
        .filter_map(|u| Some((u.id.as_str(), u.username.as_deref()?)))
        .collect();

    Ok(response
        .data
        .iter()
        .map(|t| Record {
            id: t.id.clone(),
            text: t.text.clone(),
            author: t
                .author_id
                .as_deref()
                .and_then(|id| usernames.get(id))
                .map(|name| name.to_string()),
            created_at: t.created_at.clone(),
            metrics: t.public_metrics.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        calls: RefCell<Vec<(String, String, Vec<(String, String)>)>>,
    }

    impl Scripted {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SearchTransport for &Scripted {
        fn get(&self, url: &str, bearer: &str, params: &[(&str, String)]) -> SearchResult<HttpResponse> {
            self.calls.borrow_mut().push((
                url.to_string(),
                bearer.to_string(),
                params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    #[derive(Default)]
    struct Recording(RefCell<Vec<Duration>>);

    impl Sleeper for &Recording {
        fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    const BODY: &str = r#"{
        "data": [
            {"id": "1", "text": "hi @bob", "author_id": "u1",
             "created_at": "2024-05-01T12:00:00.000Z",
             "public_metrics": {"retweet_count": 2, "like_count": 5}},
            {"id": "2", "text": "orphan", "author_id": "u9"}
        ],
        "includes": {"users": [{"id": "u1", "username": "Alice", "name": "Alice A"}]},
        "meta": {"result_count": 2}
    }"#;

    #[test]
    fn parse_joins_usernames() {
        let records = parse_response(BODY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author.as_deref(), Some("Alice"));
        assert_eq!(records[0].metrics.get("like_count"), Some(&5));
        assert_eq!(records[0].created_at.as_deref(), Some("2024-05-01T12:00:00.000Z"));
        assert_eq!(records[1].author, None);
        assert!(records[1].metrics.is_empty());
    }

    #[test]
    fn parse_missing_data_is_empty() {
        let records = parse_response(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn parse_garbage_is_error() {
        assert!(matches!(
            parse_response("<html>"),
            Err(SearchError::Parse { .. })
        ));
    }

    #[test]
    fn params_clamp_max_results() {
        let params = search_params("GenAI", 500);
        assert_eq!(params[0], ("query", "GenAI -is:retweet lang:en".to_string()));
        assert_eq!(params[1], ("max_results", "100".to_string()));
        assert_eq!(search_params("x", 3)[1].1, "10");
        assert_eq!(search_params("x", 42)[1].1, "42");
    }

    #[test]
    fn fetch_below_minimum_returns_at_most_max() {
        let data: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"id": "{i}", "text": "t{i} @bob", "author_id": "u1"}}"#))
            .collect();
        let body = format!(
            r#"{{"data": [{}], "includes": {{"users": [{{"id": "u1", "username": "alice"}}]}}}}"#,
            data.join(",")
        );
        let transport = Scripted::new(vec![HttpResponse::new(200, body)]);
        let sleeper = Recording::default();
        let client = SearchClient::new(&transport, &sleeper, "http://localhost", "tok");

        let records = client.fetch("q", 5).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);

        let calls = transport.calls.borrow();
        assert!(calls[0].2.contains(&("max_results".to_string(), "10".to_string())));
    }

    #[test]
    fn rate_limit_then_success_backs_off_once() {
        let transport = Scripted::new(vec![
            HttpResponse::new(429, "slow down"),
            HttpResponse::new(200, BODY),
        ]);
        let sleeper = Recording::default();
        let client = SearchClient::new(&transport, &sleeper, "https://api.example.com/", "tok");

        let records = client.fetch("rust", 100).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(*sleeper.0.borrow(), vec![Duration::from_secs(1)]);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "https://api.example.com/2/tweets/search/recent");
        assert_eq!(calls[0].1, "tok");
    }

    #[test]
    fn repeated_rate_limits_grow_backoff() {
        let mut script: Vec<_> = (0..8).map(|_| HttpResponse::new(429, "")).collect();
        script.push(HttpResponse::new(200, r#"{"data": []}"#));
        let transport = Scripted::new(script);
        let sleeper = Recording::default();
        let client = SearchClient::new(&transport, &sleeper, "http://localhost", "tok");

        assert!(client.fetch("q", 10).unwrap().is_empty());
        let secs: Vec<u64> = sleeper.0.borrow().iter().map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[test]
    fn other_status_fails_immediately() {
        let transport = Scripted::new(vec![HttpResponse::new(401, "Unauthorized")]);
        let sleeper = Recording::default();
        let client = SearchClient::new(&transport, &sleeper, "http://localhost", "bad");

        match client.fetch("q", 10) {
            Err(SearchError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(sleeper.0.borrow().is_empty());
    }

    #[test]
    fn debug_redacts_bearer() {
        let transport = Scripted::new(vec![]);
        let sleeper = Recording::default();
        let client = SearchClient::new(&transport, &sleeper, "http://localhost", "secret-token");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
    }
}
