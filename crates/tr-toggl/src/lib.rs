//! Toggl detail-report client.
//!
//! Fetches raw time entries from the Reports API v2 `details` endpoint, one
//! day at a time, following pagination until the reported `total_count` has
//! been collected.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tr_core::{DetailItem, EntryError, RawEntry, entries_from_items};

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_BASE_URL: &str = "https://toggl.com";
const DETAILS_PATH: &str = "/reports/api/v2/details";
const DEFAULT_ERROR_MESSAGE: &str = "error occurred";
const DEFAULT_ERROR_TIP: &str = "fix the problem";

/// Fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provided API token was invalid.
    #[error("invalid API token: {reason}")]
    InvalidApiToken { reason: &'static str },
    /// No workspace was configured.
    #[error("missing workspace id")]
    MissingWorkspace,
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service rejected the request (4xx).
    #[error("client error {status}: {detail}")]
    Client { status: u16, detail: ApiErrorDetail },
    /// The service failed to handle the request (5xx).
    #[error("server error {status}: {detail}")]
    Server { status: u16, detail: ApiErrorDetail },
    /// Any other non-success status.
    #[error("unexpected status {status}: {detail}")]
    Status { status: u16, detail: ApiErrorDetail },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// A returned item could not be turned into an entry.
    #[error("invalid entry in response: {0}")]
    Entry(#[from] EntryError),
}

/// Message, hint and URL of a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetail {
    pub message: String,
    pub tip: String,
    pub url: String,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\nRequest url: {}", self.message, self.tip, self.url)
    }
}

/// Connection options for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub workspace_id: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            workspace_id: String::new(),
            user_agent: env!("CARGO_PKG_NAME").to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Toggl reports client.
///
/// Cloning shares the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_token: String,
    details_url: String,
    workspace_id: String,
    user_agent: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_token", &"[REDACTED]")
            .field("details_url", &self.details_url)
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API token is empty or whitespace-only, if no
    /// workspace is set, or if the HTTP client fails to build.
    pub fn new(api_token: impl Into<String>, options: ClientOptions) -> Result<Self, FetchError> {
        let api_token = api_token.into();

        if api_token.is_empty() {
            return Err(FetchError::InvalidApiToken {
                reason: "API token cannot be empty",
            });
        }
        if api_token.trim().is_empty() {
            return Err(FetchError::InvalidApiToken {
                reason: "API token cannot be whitespace-only",
            });
        }
        if options.workspace_id.trim().is_empty() {
            return Err(FetchError::MissingWorkspace);
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            http,
            api_token,
            details_url: format!("{}{DETAILS_PATH}", options.base_url.trim_end_matches('/')),
            workspace_id: options.workspace_id,
            user_agent: options.user_agent,
        })
    }

    /// Fetches every entry for one day, across all result pages.
    pub async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEntry>, FetchError> {
        let day = date.format("%Y-%m-%d").to_string();
        let mut items: Vec<DetailItem> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let response = self
                .http
                .get(&self.details_url)
                .basic_auth(&self.api_token, Some("api_token"))
                .query(&[
                    ("user_agent", self.user_agent.as_str()),
                    ("workspace_id", self.workspace_id.as_str()),
                    ("since", day.as_str()),
                    ("until", day.as_str()),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await?;

            let status = response.status();
            let url = response.url().to_string();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(classify_error(status, &url, &body));
            }

            let payload: DetailPage = serde_json::from_str(&body)
                .map_err(|err| FetchError::InvalidResponse(err.to_string()))?;
            let received = payload.data.len();
            items.extend(payload.data);

            tracing::debug!(%date, page, received, total = ?payload.total_count, "fetched detail page");

            let complete = payload
                .total_count
                .is_none_or(|total| items.len() >= total);
            if received == 0 || complete {
                break;
            }
            page += 1;
        }

        Ok(entries_from_items(items)?)
    }

    /// Fetches every entry from `start` to `end`, both inclusive.
    pub async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawEntry>, FetchError> {
        let mut entries = Vec::new();
        for date in start.iter_days().take_while(|date| *date <= end) {
            entries.extend(self.fetch_day(date).await?);
        }
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct DetailPage {
    #[serde(default)]
    total_count: Option<usize>,
    #[serde(default)]
    data: Vec<DetailItem>,
}

/// Maps a non-success response to a client, server or generic error.
fn classify_error(status: StatusCode, url: &str, body: &str) -> FetchError {
    let detail = parse_error_detail(url, body);
    let status_code = status.as_u16();
    if status.is_client_error() {
        FetchError::Client {
            status: status_code,
            detail,
        }
    } else if status.is_server_error() {
        FetchError::Server {
            status: status_code,
            detail,
        }
    } else {
        FetchError::Status {
            status: status_code,
            detail,
        }
    }
}

fn parse_error_detail(url: &str, body: &str) -> ApiErrorDetail {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: Option<String>,
        tip: Option<String>,
    }

    let details = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error);
    let (message, tip) = details.map_or((None, None), |d| (d.message, d.tip));

    ApiErrorDetail {
        message: message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        tip: tip.unwrap_or_else(|| DEFAULT_ERROR_TIP.to_string()),
        url: url.to_string(),
    }
}
