use anyhow::Context;
use clap::Parser;
use std::path::Path;
use trade_sizer::cli::{Cli, Session};
use trade_sizer::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, falling back to the bundled example
    let config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)
            .with_context(|| format!("Could not load config from {}", cli.config))?
    } else {
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    };

    // Initialize telemetry
    trade_sizer::telemetry::init_telemetry(&config.telemetry)?;

    let session = Session::new(config, cli.journal);
    tracing::debug!(journal = %session.journal.display(), "Session ready");

    cli.command.execute(&session)
}
