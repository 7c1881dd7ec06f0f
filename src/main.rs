use anyhow::Result;
use clap::Parser;
use setwise::{
    cli::{Cli, Commands},
    commands,
    logging::{LogConfig, init_logging},
    types::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        json,
        log_level,
        cmd,
    } = Cli::parse();

    let config_path = Config::default_path()?;

    // config edits must work even when the stored values do not parse
    let cmd = match cmd {
        Commands::Config(c) => return commands::config::handle(c, &config_path),
        other => other,
    };

    let settings = Config::load(&config_path)?.settings()?;

    init_logging(&LogConfig {
        level: log_level.unwrap_or(settings.log_level),
        format: settings.log_format,
        ..LogConfig::default()
    })?;

    match cmd {
        Commands::Run(args) => commands::session::run(args, &settings, json).await?,
        Commands::Plan { plan } => commands::plan::handle(&plan, &settings, json)?,
        Commands::History { id, last } => commands::history::handle(id, last, &settings, json)?,
        Commands::Config(_) => {}
    }

    Ok(())
}
