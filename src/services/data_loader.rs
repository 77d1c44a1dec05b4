//! Unified data loading service for CLI and TUI
//!
//! Every ingestion event goes through `DataLoaderService::load`, which picks
//! the parser (or the remote client) for an `IngestSource` and returns the
//! complete replacement record set.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::parsers::{DelimitedParser, ParserRegistry};
use crate::services::RemoteClient;
use crate::types::{ApiCredentials, ConsumptionRecord, Result, VendError};

/// Where a record set comes from
#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// Workbook, delimited text or saved API export on disk
    File(PathBuf),
    /// Pasted (or piped) delimited text
    Text { label: String, text: String },
    /// One calendar month from the vending API
    Remote {
        credentials: ApiCredentials,
        month: String,
    },
}

impl IngestSource {
    /// Display label for the loaded data set
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Text { label, .. } => label.clone(),
            Self::Remote { month, .. } => format!("API data ({})", month),
        }
    }

    /// Pasted text with the default label
    pub fn pasted(text: impl Into<String>) -> Self {
        Self::Text {
            label: "pasted text".to_string(),
            text: text.into(),
        }
    }
}

/// Result of one ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    pub label: String,
    pub records: Vec<ConsumptionRecord>,
}

/// Unified data loading service
///
/// Owns the remote client so its token cache survives repeated loads.
pub struct DataLoaderService {
    registry: ParserRegistry,
    text_parser: DelimitedParser,
    remote: RemoteClient,
}

impl DataLoaderService {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            registry: ParserRegistry::new(),
            text_parser: DelimitedParser::new(),
            remote: RemoteClient::new(api)?,
        })
    }

    /// Load a complete record set from `source`
    pub fn load(&mut self, source: &IngestSource) -> Result<LoadResult> {
        let label = source.label();
        debug!(source = %label, "loading records");

        let records = match source {
            IngestSource::File(path) => self.registry.parse_file(path)?,
            IngestSource::Text { text, .. } => self.text_parser.parse_text(text)?,
            IngestSource::Remote { credentials, month } => {
                if !credentials.is_complete() {
                    return Err(VendError::Config(
                        "project ID, account ID and password are all required".into(),
                    ));
                }
                self.remote.fetch_month(credentials, month)?
            }
        };

        info!(source = %label, records = records.len(), "loaded records");
        Ok(LoadResult { label, records })
    }

    /// Whether the remote client holds a token for these credentials
    pub fn has_token_for(&self, credentials: &ApiCredentials) -> bool {
        self.remote.has_token_for(credentials)
    }

    /// Discard the cached API token
    pub fn logout(&mut self) {
        self.remote.logout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "事件時間\t人臉辨識ID\t使用者名稱\t品名\t金額";

    fn loader() -> DataLoaderService {
        DataLoaderService::new(&ApiConfig::default()).unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            IngestSource::File(PathBuf::from("/tmp/exports/october.xlsx")).label(),
            "october.xlsx"
        );
        assert_eq!(IngestSource::pasted("x").label(), "pasted text");
        let remote = IngestSource::Remote {
            credentials: ApiCredentials::new("p", "i", "pw"),
            month: "2025-10".into(),
        };
        assert_eq!(remote.label(), "API data (2025-10)");
    }

    #[test]
    fn test_load_text() {
        let text = format!("{}\n2025-10-23 18:02:36\t362\tMing Lin\t八寶粥\t25\n", HEADER);
        let result = loader().load(&IngestSource::pasted(text)).unwrap();

        assert_eq!(result.label, "pasted text");
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].price, 25.0);
    }

    #[test]
    fn test_load_text_error_propagates() {
        let err = loader()
            .load(&IngestSource::pasted(HEADER))
            .unwrap_err();
        assert!(matches!(err, VendError::EmptyInput));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "2025-10-23 18:02:36\t362\tMing Lin\t八寶粥\t25").unwrap();

        let source = IngestSource::File(file.path().to_path_buf());
        let result = loader().load(&source).unwrap();
        assert_eq!(result.records.len(), 1);
        assert!(result.label.ends_with(".tsv"));
    }

    #[test]
    fn test_remote_requires_credentials() {
        let source = IngestSource::Remote {
            credentials: ApiCredentials::new("WFLK_CTSP", "", ""),
            month: "2025-10".into(),
        };
        let err = loader().load(&source).unwrap_err();
        assert!(matches!(err, VendError::Config(_)));
    }

    #[test]
    fn test_remote_load_via_mock() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/api/Auth/login").with_body("tok").create();
        server
            .mock("POST", "/api/EventVendingMaching/range")
            .with_body("[]")
            .create();

        let api = ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        };
        let mut loader = DataLoaderService::new(&api).unwrap();
        let creds = ApiCredentials::new("WFLK_CTSP", "admin", "secret");
        let source = IngestSource::Remote {
            credentials: creds.clone(),
            month: "2025-10".into(),
        };

        let result = loader.load(&source).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.label, "API data (2025-10)");
        assert!(loader.has_token_for(&creds));

        loader.logout();
        assert!(!loader.has_token_for(&creds));
    }
}
