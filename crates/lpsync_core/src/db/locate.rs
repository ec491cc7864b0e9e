//! Launcher store location and pre-import backup.

use super::{StoreError, StoreResult};
use log::info;
use std::path::{Path, PathBuf};

const LAUNCHPAD_DB_RELATIVE: &str = "../0/com.apple.dock.launchpad/db/db";
const BACKUP_SUFFIX: &str = "lpsync.bak";
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Resolves the per-user launcher store from `$TMPDIR`.
///
/// The launcher keeps its store next to the per-user temporary directory,
/// e.g. `/var/folders/xx/<id>/T/../0/com.apple.dock.launchpad/db/db`.
pub fn default_store_path() -> StoreResult<PathBuf> {
    let tmp_dir = std::env::var_os("TMPDIR")
        .filter(|value| !value.is_empty())
        .ok_or(StoreError::Unresolvable("TMPDIR is not set"))?;
    Ok(store_path_under(Path::new(&tmp_dir)))
}

fn store_path_under(tmp_dir: &Path) -> PathBuf {
    tmp_dir.join(LAUNCHPAD_DB_RELATIVE)
}

/// Copies the store file to `<path>.lpsync.bak`, replacing an older backup.
///
/// WAL sidecars (`-wal`, `-shm`) present next to the store are copied to
/// `<path>.lpsync.bak-wal` / `-shm` so the backup opens with the same
/// committed content. Stale sidecars of an older backup are removed.
///
/// Returns the backup path.
pub fn backup_store(path: &Path) -> StoreResult<PathBuf> {
    if !path.is_file() {
        return Err(StoreError::StoreNotFound(path.to_path_buf()));
    }

    let backup = with_suffix(path, &format!(".{BACKUP_SUFFIX}"));
    copy_file(path, &backup)?;

    let mut sidecars = 0;
    for suffix in SIDECAR_SUFFIXES {
        let source = with_suffix(path, suffix);
        let target = with_suffix(&backup, suffix);
        if source.is_file() {
            copy_file(&source, &target)?;
            sidecars += 1;
        } else if target.exists() {
            std::fs::remove_file(&target).map_err(|source| StoreError::Io {
                path: target.clone(),
                source,
            })?;
        }
    }

    info!(
        "event=store_backup module=db status=ok path={} sidecars={}",
        backup.display(),
        sidecars
    );
    Ok(backup)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn copy_file(from: &Path, to: &Path) -> StoreResult<()> {
    std::fs::copy(from, to).map_err(|source| StoreError::Io {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
