use std::fmt;

use thiserror::Error;

/// Which cell of a row failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Amount,
    Timestamp,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount => f.write_str("amount"),
            Self::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// Diagnostic context attached to remote API failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDetail {
    /// HTTP status code, when a response was received
    pub status: Option<u16>,
    /// Response body (pretty-printed when it was JSON)
    pub response: Option<String>,
    /// Request payload that was sent, with secrets redacted
    pub request: Option<String>,
    /// Bearer token used for the request, masked
    pub token: Option<String>,
}

impl RemoteDetail {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Multi-line diagnostic block for display under the summary
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        if let Some(status) = self.status {
            out.push(format!("status: {}", status));
        }
        if let Some(response) = &self.response {
            out.push(format!("response:\n{}", response));
        }
        if let Some(request) = &self.request {
            out.push(format!("request:\n{}", request));
        }
        if let Some(token) = &self.token {
            out.push(format!("token: {}", token));
        }
        out.join("\n")
    }
}

/// vendtrack error types
#[derive(Error, Debug)]
pub enum VendError {
    /// Input has a header (or nothing) but no data rows
    #[error("input is empty or only contains the header row")]
    EmptyInput,

    /// One or more required columns are absent
    #[error("missing required headers: {}", .0.join(", "))]
    MissingHeader(Vec<String>),

    /// A data row has an unparseable amount or timestamp
    #[error("row {row}: invalid {field}: {value:?}")]
    RowParse {
        row: usize,
        field: RowField,
        value: String,
    },

    /// Login failed or returned an empty token
    #[error("login failed: {summary}")]
    RemoteAuth {
        summary: String,
        detail: Box<RemoteDetail>,
    },

    /// Range query failed or returned an unexpected payload
    #[error("data request failed: {summary}")]
    RemoteData {
        summary: String,
        detail: Box<RemoteDetail>,
    },

    /// Transport-level failure (no response from the server)
    #[error("network error: {0} (the request never reached the server; check connectivity, proxy or firewall settings)")]
    Network(String),

    /// Workbook could not be opened or read
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Malformed text or JSON payload
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl VendError {
    pub fn auth(summary: impl Into<String>, detail: RemoteDetail) -> Self {
        Self::RemoteAuth {
            summary: summary.into(),
            detail: Box::new(detail),
        }
    }

    pub fn data(summary: impl Into<String>, detail: RemoteDetail) -> Self {
        Self::RemoteData {
            summary: summary.into(),
            detail: Box::new(detail),
        }
    }

    /// Expandable diagnostic detail, present only for remote failures
    pub fn detail(&self) -> Option<&RemoteDetail> {
        match self {
            Self::RemoteAuth { detail, .. } | Self::RemoteData { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// Result type alias for vendtrack
pub type Result<T> = std::result::Result<T, VendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_lists_all() {
        let err = VendError::MissingHeader(vec!["品名".into(), "金額".into()]);
        assert_eq!(err.to_string(), "missing required headers: 品名, 金額");
    }

    #[test]
    fn test_row_parse_display() {
        let err = VendError::RowParse {
            row: 2,
            field: RowField::Amount,
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "row 2: invalid amount: \"abc\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VendError = io_err.into();
        assert!(err.to_string().contains("io error"));
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_remote_detail_exposed() {
        let mut detail = RemoteDetail::with_status(500);
        detail.response = Some("boom".into());
        let err = VendError::data("HTTP 500", detail);

        let rendered = err.detail().map(RemoteDetail::render).unwrap();
        assert!(rendered.contains("status: 500"));
        assert!(rendered.contains("boom"));
        assert_eq!(err.to_string(), "data request failed: HTTP 500");
    }
}
