use clap::Parser;
use tracing::info;
use vendtrack::cli::Cli;
use vendtrack::config::{self, Config};
use vendtrack::logging::{init_logging, LogTarget};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // The TUI owns the terminal, so its logs go to a file
    let log_dir = config::data_dir().map(|dir| dir.join("logs"));
    let _guard = match (cli.is_tui(), log_dir) {
        (true, Some(dir)) => {
            std::fs::create_dir_all(&dir)?;
            init_logging(&config.logging, LogTarget::File, Some(dir.as_path()))
        }
        // No home directory: stay silent rather than draw over the UI
        (true, None) => None,
        (false, _) => init_logging(&config.logging, LogTarget::Stderr, None),
    };

    match Config::locate() {
        Some(path) => info!(config_file = %path.display(), "loaded configuration from file"),
        None => info!("no configuration file, using defaults"),
    }

    cli.run(config)
}
