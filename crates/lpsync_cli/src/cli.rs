//! CLI argument parsing using clap derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Export and replay the launcher's page/folder layout
#[derive(Parser, Debug)]
#[command(name = "lpsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Launcher store file (defaults to the per-user launcher database)
    #[arg(long, global = true, env = "LPSYNC_DB")]
    pub db: Option<PathBuf>,

    /// Write rolling log files to this absolute directory instead of stderr
    #[arg(long, global = true, env = "LPSYNC_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "LPSYNC_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save the current layout to a document (.yaml or .json)
    Save {
        #[arg(default_value = "launchpad.yaml")]
        file: PathBuf,
    },

    /// Rebuild the launcher layout from a document
    Load {
        file: PathBuf,

        /// Do not restart the Dock afterwards
        #[arg(long)]
        no_restart: bool,

        /// Do not copy the store to `<db>.lpsync.bak` first
        #[arg(long)]
        no_backup: bool,
    },
}
