//! Launcher layout CLI.
//!
//! # Responsibility
//! - Resolve the store path and logging destination from flags/env.
//! - Run `save` (export) and `load` (import) passes via `lpsync_core`.
//! - Restart the Dock after a successful import.

mod cli;
mod host;

use clap::Parser;
use cli::{Cli, Command};
use log::{error, warn};
use lpsync_core::db::{backup_store, default_store_path};
use lpsync_core::{
    default_log_level, init_logging, load_document, open_store, save_document, DocumentError,
    ImportReport, IssueKind, LayoutService, LogTarget, SqliteLaunchpadRepository, StoreError,
    SyncError, TreeKind,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Store(StoreError),
    Document(DocumentError),
    Sync(SyncError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Document(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<DocumentError> for CliError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<SyncError> for CliError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_deref().unwrap_or(default_log_level())
    };
    let started = LogTarget::from_dir(cli.log_dir.as_deref())
        .and_then(|target| init_logging(level, target));
    if let Err(err) = started {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store_path = match cli.db {
        Some(path) => path,
        None => default_store_path()?,
    };

    match cli.command {
        Command::Save { file } => save(&store_path, &file),
        Command::Load {
            file,
            no_restart,
            no_backup,
        } => load(&store_path, &file, !no_restart, !no_backup),
    }
}

fn save(store_path: &Path, file: &Path) -> Result<(), CliError> {
    let conn = open_store(store_path)?;
    let service = LayoutService::new(SqliteLaunchpadRepository::new(&conn));
    let document = service.export_layout()?;
    save_document(file, &document)?;

    println!(
        "saved {} app pages and {} widget pages to {}",
        document.apps.pages.len(),
        document.widgets.pages.len(),
        file.display()
    );
    Ok(())
}

fn load(store_path: &Path, file: &Path, restart: bool, backup: bool) -> Result<(), CliError> {
    let document = load_document(file)?;

    let backup_path: Option<PathBuf> = if backup {
        Some(backup_store(store_path)?)
    } else {
        None
    };

    let conn = open_store(store_path)?;
    let service = LayoutService::new(SqliteLaunchpadRepository::new(&conn));
    let report = service.import_layout(&document)?;
    print_report(&report);
    if let Some(path) = backup_path {
        println!("previous store saved to {}", path.display());
    }

    if restart {
        if let Err(err) = host::restart_dock() {
            warn!(
                "event=host_restart module=cli status=error process=Dock error={}",
                err
            );
            eprintln!("warning: layout written, but the Dock was not restarted: {err}");
        }
    }
    Ok(())
}

fn print_report(report: &ImportReport) {
    for tree in TreeKind::ALL {
        let sync = report.tree(tree);
        println!(
            "{}: {} pages, {} folders, {} entries placed",
            tree.as_str(),
            sync.pages_created,
            sync.folders_created,
            sync.entries_placed
        );
        if !sync.appended_missing.is_empty() {
            println!(
                "  {} entries missing from the document were added to the last page",
                sync.appended_missing.len()
            );
        }
        for issue in &sync.issues {
            let reason = match issue.kind {
                IssueKind::Unmatched => "no installed entry with title",
                IssueKind::Duplicate => "title listed more than once",
            };
            println!("  skipped: {reason} `{}`", issue.title);
        }
    }
}
