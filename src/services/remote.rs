//! Vending API client: login, token cache and event range queries

use chrono::{Datelike, Months, NaiveDate};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::parsers::parse_events;
use crate::types::{ApiCredentials, ConsumptionRecord, RemoteDetail, Result, VendError};

const LOGIN_PATH: &str = "/api/Auth/login";
const RANGE_PATH: &str = "/api/EventVendingMaching/range";
const JSON_PATCH: &str = "application/json-patch+json";
const TEXT_PLAIN: &str = "text/plain";

/// Object keys checked for the token, in priority order
const TOKEN_KEYS: [&str; 4] = ["token", "Token", "accessToken", "access_token"];

/// Inclusive calendar date range for a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(VendError::Config(format!(
                "date range starts after it ends: {} > {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// First through last day of a `YYYY-MM` month
    pub fn month(month: &str) -> Result<Self> {
        let invalid = || VendError::Config(format!("invalid month {:?}, expected YYYY-MM", month));

        let (year, mon) = month.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let mon: u32 = mon.parse().map_err(|_| invalid())?;

        let start = NaiveDate::from_ymd_opt(year, mon, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;
        Ok(Self { start, end })
    }

    /// `YYYY-MM` label of the starting month
    pub fn month_label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeRequest {
    start_date: String,
    end_date: String,
    event_count: u32,
}

struct CachedToken {
    credentials: ApiCredentials,
    token: String,
}

/// Blocking client for the vending API
pub struct RemoteClient {
    client: Client,
    base_url: String,
    event_count: u32,
    cached: Option<CachedToken>,
}

impl RemoteClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VendError::Network(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            event_count: config.event_count,
            cached: None,
        })
    }

    /// Whether a token is cached for exactly these credentials
    pub fn has_token_for(&self, credentials: &ApiCredentials) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|c| &c.credentials == credentials)
    }

    /// Whether any token is cached
    pub fn has_token(&self) -> bool {
        self.cached.is_some()
    }

    /// Forget the cached token
    pub fn logout(&mut self) {
        if self.cached.take().is_some() {
            info!("discarded cached API token");
        }
    }

    /// Log in and cache the returned bearer token
    pub fn login(&mut self, credentials: &ApiCredentials) -> Result<String> {
        let request = redacted_login_body(credentials);
        let body = serde_json::to_string(credentials)
            .map_err(|e| VendError::Parse(format!("login body: {}", e)))?;

        info!(project_id = %credentials.project_id, id = %credentials.id, "logging in to vending API");
        let response = self.post(LOGIN_PATH, body, None)?;
        let status = response.status();
        let text = response.text().map_err(network)?;

        if !status.is_success() {
            self.forget_on_auth_failure(status);
            let detail = failure_detail(status, &text, Some(request), None);
            return Err(VendError::auth(format!("server returned {}", status), detail));
        }

        let token = extract_token(&text).ok_or_else(|| {
            let detail = failure_detail(status, &text, Some(request), None);
            VendError::auth("server returned an empty token", detail)
        })?;

        self.cached = Some(CachedToken {
            credentials: credentials.clone(),
            token: token.clone(),
        });
        Ok(token)
    }

    /// Fetch raw events for a range, logging in first unless a token is cached
    pub fn fetch_range(
        &mut self,
        credentials: &ApiCredentials,
        range: &DateRange,
    ) -> Result<Vec<ConsumptionRecord>> {
        let token = match &self.cached {
            Some(cached) if cached.credentials == *credentials => {
                debug!("reusing cached API token");
                cached.token.clone()
            }
            _ => self.login(credentials)?,
        };

        let request = RangeRequest {
            start_date: range.start.format("%Y-%m-%d").to_string(),
            end_date: range.end.format("%Y-%m-%d").to_string(),
            event_count: self.event_count,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| VendError::Parse(format!("range body: {}", e)))?;
        let request_detail = serde_json::to_string_pretty(&request).unwrap_or_else(|_| body.clone());

        info!(start = %request.start_date, end = %request.end_date, "fetching vending events");
        let response = self.post(RANGE_PATH, body, Some(&token))?;
        let status = response.status();
        let bytes = response.bytes().map_err(network)?;

        if !status.is_success() {
            self.forget_on_auth_failure(status);
            let text = String::from_utf8_lossy(&bytes);
            let detail =
                failure_detail(status, &text, Some(request_detail), Some(mask_token(&token)));
            return Err(VendError::data(format!("server returned {}", status), detail));
        }

        let mut payload = bytes.to_vec();
        parse_events(&mut payload).map_err(|e| {
            let text = String::from_utf8_lossy(&bytes);
            let detail =
                failure_detail(status, &text, Some(request_detail), Some(mask_token(&token)));
            VendError::data(format!("unexpected response payload ({})", e), detail)
        })
    }

    /// Fetch every event of a `YYYY-MM` month
    pub fn fetch_month(
        &mut self,
        credentials: &ApiCredentials,
        month: &str,
    ) -> Result<Vec<ConsumptionRecord>> {
        let range = DateRange::month(month)?;
        self.fetch_range(credentials, &range)
    }

    fn post(&self, path: &str, body: String, token: Option<&str>) -> Result<Response> {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, JSON_PATCH)
            .header(ACCEPT, TEXT_PLAIN)
            .body(body);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request.send().map_err(network)
    }

    fn forget_on_auth_failure(&mut self, status: StatusCode) {
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            self.logout();
        }
    }
}

fn network(err: reqwest::Error) -> VendError {
    VendError::Network(err.to_string())
}

/// Pull the bearer token out of a login response body
pub fn extract_token(body: &str) -> Option<String> {
    let trimmed = body.trim();
    let token = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => TOKEN_KEYS
            .iter()
            .chain(std::iter::once(&"data"))
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| trimmed.to_string()),
        _ => trimmed.to_string(),
    };

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Response body for display: pretty JSON, raw text, or the status reason
pub fn render_response_body(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    }
}

/// Show only the ends of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

fn redacted_login_body(credentials: &ApiCredentials) -> String {
    let redacted = ApiCredentials {
        password: "********".into(),
        ..credentials.clone()
    };
    serde_json::to_string_pretty(&redacted).unwrap_or_default()
}

fn failure_detail(
    status: StatusCode,
    body: &str,
    request: Option<String>,
    token: Option<String>,
) -> RemoteDetail {
    RemoteDetail {
        response: Some(render_response_body(status, body)),
        request,
        token,
        ..RemoteDetail::with_status(status.as_u16())
    }
}
