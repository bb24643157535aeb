// src/history/mod.rs

pub mod commit;

pub use commit::{to_batch, CommitRow};

use anyhow::{Context, Result};
use deltalake::{kernel::CommitInfo, logstore::LogStore};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::table::{latest_version, table_uri};

/// Version history of the Delta table at `path`, newest first.
///
/// Walks the log one version at a time so each row carries the version of the
/// commit file it came from. A commit without a `commitInfo` action still
/// yields a row with only its version set. Versions whose commit file is gone
/// (log cleanup) are skipped. `limit = None` lists every version.
pub async fn table_history(
    path: impl AsRef<Path>,
    limit: Option<usize>,
) -> Result<Vec<CommitRow>> {
    let uri = table_uri(path.as_ref())?;
    let table = deltalake::open_table(uri)
        .await
        .with_context(|| format!("opening Delta table {}", uri))?;
    let latest = latest_version(&table)?;
    let oldest = match limit {
        Some(n) => (latest - n as i64 + 1).max(0),
        None => 0,
    };

    let log_store = table.log_store();
    let mut rows = Vec::new();
    for version in (oldest..=latest).rev() {
        let Some(entry) = log_store
            .read_commit_entry(version)
            .await
            .with_context(|| format!("reading commit {} of {}", version, uri))?
        else {
            debug!(uri, version, "commit file missing, skipped");
            continue;
        };
        let row = match commit_info(&entry)
            .with_context(|| format!("parsing commit {} of {}", version, uri))?
        {
            Some(info) => CommitRow::from_commit(version, &info),
            None => CommitRow::bare(version),
        };
        rows.push(row);
    }

    debug!(uri, latest, commits = rows.len(), "loaded table history");
    Ok(rows)
}

/// The `commitInfo` action of one newline-delimited commit file, if present.
fn commit_info(entry: &[u8]) -> Result<Option<CommitInfo>> {
    for line in entry.split(|b| *b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let mut action: Value = serde_json::from_slice(line).context("decoding log action")?;
        if let Some(info) = action.get_mut("commitInfo") {
            let info = serde_json::from_value(info.take()).context("decoding commitInfo")?;
            return Ok(Some(info));
        }
    }
    Ok(None)
}
