//! HTTP fetcher implementation
//!
//! One bounded-timeout GET per call with a rotated client identity. There is
//! no retry: a failed URL simply contributes nothing to the run.

use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

/// Default per-fetch timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser identities rotated across requests
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A 2xx response with its full body
    Success {
        body: String,
        /// Final URL after redirects
        final_url: String,
        status: u16,
    },

    /// Anything else; never carries a partial body
    Failure { reason: FetchFailure },
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Non-2xx HTTP status
    Status(u16),
    Timeout,
    Connect(String),
    /// Body could not be read or decoded
    Body(String),
    Other(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timed out"),
            Self::Connect(e) => write!(f, "connection failed: {}", e),
            Self::Body(e) => write!(f, "failed to read body: {}", e),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Stateless page fetcher
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Builds a fetcher with a fixed per-request timeout
    ///
    /// # Arguments
    ///
    /// * `timeout` - Upper bound on a whole request, connect through body
    ///
    /// # Returns
    ///
    /// * `Ok(PageFetcher)` - Successfully built HTTP client
    /// * `Err(reqwest::Error)` - Failed to build client
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Issues a single GET
    ///
    /// # Returns
    ///
    /// `Success` for a 2xx response whose body could be read, `Failure`
    /// otherwise.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let user_agent = random_user_agent();

        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return FetchResult::Failure {
                    reason: classify_error(&e),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::Failure {
                reason: FetchFailure::Status(status.as_u16()),
            };
        }

        let final_url = response.url().to_string();

        match response.text().await {
            Ok(body) => FetchResult::Success {
                body,
                final_url,
                status: status.as_u16(),
            },
            Err(e) if e.is_timeout() => FetchResult::Failure {
                reason: FetchFailure::Timeout,
            },
            Err(e) => FetchResult::Failure {
                reason: FetchFailure::Body(e.to_string()),
            },
        }
    }
}

/// Picks a User-Agent for one request
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect(e.to_string())
    } else {
        FetchFailure::Other(e.to_string())
    }
}
