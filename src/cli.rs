use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogLevel;

#[derive(Parser)]
#[command(name = "setwise", version, about = "Live workout session runner")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace); `RUST_LOG` overrides it.
    #[arg(global = true, long, value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a workout session interactively
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Validate and show a plan file
    #[command(visible_alias = "p")]
    Plan {
        /// Path to the plan TOML file
        plan: PathBuf,
    },

    /// Show finished sessions
    #[command(visible_alias = "h")]
    History {
        /// Show a single session in detail
        #[arg(long)]
        id: Option<String>,

        /// Show only the most recent session in detail
        #[arg(short, long, conflicts_with = "id")]
        last: bool,
    },

    /// View or edit setwise config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the plan TOML file
    pub plan: PathBuf,

    /// Do not save the finished session
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "setwise",
            "run",
            "push.toml",
            "--no-save",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.cmd {
            Commands::Run(args) => {
                assert_eq!(args.plan, PathBuf::from("push.toml"));
                assert!(args.no_save);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_history_flags_conflict() {
        assert!(Cli::try_parse_from(["setwise", "history", "--id", "x", "--last"]).is_err());
    }
}
