mod report;

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::services::{DataLoaderService, IngestSource, Session};
use crate::types::ApiCredentials;

/// Vending-machine transaction analyzer
#[derive(Parser)]
#[command(name = "vendtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show spending summary, optionally for matching users
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Case-insensitive match against user ID or name
        #[arg(long, short = 'u', value_name = "QUERY")]
        user: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every user name in the data set
    Users {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where to read records from
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SourceArgs {
    /// Workbook (.xlsx/.xls/.ods), delimited text (.tsv/.csv/.txt) or saved API export (.json)
    #[arg(long, short = 'f', value_name = "PATH", group = "input")]
    file: Option<PathBuf>,

    /// Read tab-delimited rows from standard input
    #[arg(long, group = "input")]
    stdin: bool,

    /// Fetch one month from the vending API
    #[arg(long, short = 'm', value_name = "YYYY-MM", group = "input")]
    month: Option<String>,

    /// API project ID (defaults to the configured project)
    #[arg(long, value_name = "ID")]
    project_id: Option<String>,

    /// API account ID
    #[arg(long, env = "VENDTRACK_ID", value_name = "ID")]
    id: Option<String>,

    /// API password
    #[arg(long, env = "VENDTRACK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl SourceArgs {
    fn is_empty(&self) -> bool {
        self.file.is_none() && !self.stdin && self.month.is_none()
    }

    /// Credentials from flags/env, falling back to the configured project
    pub fn credentials(&self, config: &Config) -> ApiCredentials {
        ApiCredentials::new(
            self.project_id
                .clone()
                .unwrap_or_else(|| config.api.project_id.clone()),
            self.id.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    /// Resolve to an ingestion source; `None` when nothing was selected
    pub fn resolve(&self, config: &Config) -> anyhow::Result<Option<IngestSource>> {
        if let Some(path) = &self.file {
            return Ok(Some(IngestSource::File(path.clone())));
        }
        if self.stdin {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            return Ok(Some(IngestSource::Text {
                label: "stdin".to_string(),
                text,
            }));
        }
        if let Some(month) = &self.month {
            return Ok(Some(IngestSource::Remote {
                credentials: self.credentials(config),
                month: month.clone(),
            }));
        }
        Ok(None)
    }
}

impl Cli {
    /// Whether this invocation runs the interactive UI
    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui { .. }))
    }

    pub fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            None => run_tui(self.source, config),
            Some(Commands::Tui { source }) => {
                // Top-level flags still apply to the explicit subcommand
                let source = if source.is_empty() { self.source } else { source };
                run_tui(source, config)
            }
            Some(Commands::Report { source, user, json }) => {
                let mut session = load_session(&source, &config)?;
                let mut out = std::io::stdout().lock();
                if json {
                    report::write_report_json(&mut out, &mut session, user.as_deref())?;
                } else {
                    report::write_report(&mut out, &mut session, user.as_deref())?;
                }
                Ok(())
            }
            Some(Commands::Users { source, json }) => {
                let session = load_session(&source, &config)?;
                let mut out = std::io::stdout().lock();
                report::write_users(&mut out, &session, json)?;
                Ok(())
            }
        }
    }
}

fn run_tui(source: SourceArgs, config: Config) -> anyhow::Result<()> {
    if !std::io::stdout().is_terminal() {
        bail!("the interactive UI needs a terminal; use `vendtrack report` for scripted output");
    }
    let credentials = source.credentials(&config);
    let initial = source.resolve(&config)?;
    crate::tui::run(config, credentials, initial)
}

/// Load a source into a fresh session, surfacing remote detail on failure
fn load_session(source: &SourceArgs, config: &Config) -> anyhow::Result<Session> {
    let Some(ingest) = source.resolve(config)? else {
        bail!("no input given: pass --file PATH, --stdin or --month YYYY-MM");
    };

    let mut loader = DataLoaderService::new(&config.api)?;
    let mut session = Session::new();
    session.begin_ingest();
    let result = loader.load(&ingest);

    if let Err(err) = &result {
        if let Some(detail) = err.detail() {
            eprintln!("{}", detail.render());
        }
    }
    session.finish_ingest(Ok(result?));
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["vendtrack"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_tui());
    }

    #[test]
    fn test_cli_parse_report() {
        let cli =
            Cli::try_parse_from(["vendtrack", "report", "--file", "oct.xlsx", "--user", "ming"])
                .unwrap();
        match cli.command {
            Some(Commands::Report { source, user, json }) => {
                assert_eq!(source.file, Some(PathBuf::from("oct.xlsx")));
                assert_eq!(user.as_deref(), Some("ming"));
                assert!(!json);
            }
            _ => panic!("expected report"),
        }
        assert!(!Cli::try_parse_from(["vendtrack", "report"]).unwrap().is_tui());
    }

    #[test]
    fn test_cli_parse_users_json() {
        let cli = Cli::try_parse_from(["vendtrack", "users", "--stdin", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Users { json: true, ref source }) if source.stdin
        ));
    }

    #[test]
    fn test_sources_are_exclusive() {
        let result = Cli::try_parse_from([
            "vendtrack", "report", "--file", "a.tsv", "--month", "2025-10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_month_source_uses_configured_project() {
        let cli = Cli::try_parse_from([
            "vendtrack", "report", "--month", "2025-10", "--id", "admin", "--password", "pw",
        ])
        .unwrap();
        let Some(Commands::Report { source, .. }) = cli.command else {
            panic!("expected report");
        };

        let config = Config::default();
        match source.resolve(&config).unwrap() {
            Some(IngestSource::Remote { credentials, month }) => {
                assert_eq!(month, "2025-10");
                assert_eq!(credentials.project_id, "WFLK_CTSP");
                assert_eq!(credentials.id, "admin");
                assert_eq!(credentials.password, "pw");
            }
            other => panic!("expected remote source, got {:?}", other),
        }
    }

    #[test]
    fn test_no_source_resolves_to_none() {
        let source = SourceArgs::default();
        assert!(source.is_empty());
        assert_eq!(source.resolve(&Config::default()).unwrap(), None);
    }
}
