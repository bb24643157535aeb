// src/table/mod.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use datafusion::dataframe::DataFrame;
use deltalake::{
    kernel::transaction::CommitProperties, protocol::SaveMode, DeltaOps, DeltaTable,
};
use parquet::{basic::Compression, file::properties::WriterProperties};
use std::{fs, path::Path, sync::Arc};
use tracing::{info, instrument};

use crate::session::Session;

/// Local table location as the string URI the table format expects.
pub(crate) fn table_uri(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("table path {:?} is not valid UTF-8", path))
}

/// Overwrite the Delta table at `path` with `batches`, creating it if absent.
///
/// Each call is one commit. Data files are Snappy-compressed Parquet and the
/// commit metadata carries `app_name`.
#[instrument(skip(path, batches), fields(path = %path.as_ref().display()))]
pub async fn write_overwrite(
    path: impl AsRef<Path>,
    batches: Vec<RecordBatch>,
    app_name: &str,
) -> Result<DeltaTable> {
    let path = path.as_ref();
    fs::create_dir_all(path)
        .with_context(|| format!("creating table directory {}", path.display()))?;
    let uri = table_uri(path)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let commit = CommitProperties::default().with_metadata(vec![(
        "appName".to_string(),
        serde_json::Value::String(app_name.to_string()),
    )]);

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    let table = DeltaOps::try_from_uri(uri)
        .await
        .with_context(|| format!("opening Delta location {}", uri))?
        .write(batches)
        .with_save_mode(SaveMode::Overwrite)
        .with_writer_properties(props)
        .with_commit_properties(commit)
        .await
        .with_context(|| format!("writing Delta table {}", uri))?;

    info!(rows, version = latest_version(&table)?, "delta write committed");
    Ok(table)
}

/// Version of the snapshot `table` currently holds.
pub fn latest_version(table: &DeltaTable) -> Result<i64> {
    Ok(table
        .snapshot()
        .context("Delta table has no loaded snapshot")?
        .version())
}

/// Full load of the latest version.
pub async fn load(session: &Session, path: impl AsRef<Path>) -> Result<DataFrame> {
    let uri = table_uri(path.as_ref())?;
    let table = deltalake::open_table(uri)
        .await
        .with_context(|| format!("opening Delta table {}", uri))?;
    session
        .ctx()
        .read_table(Arc::new(table))
        .with_context(|| format!("scanning Delta table {}", uri))
}

/// Full load of an earlier `version`.
pub async fn load_version(
    session: &Session,
    path: impl AsRef<Path>,
    version: i64,
) -> Result<DataFrame> {
    let uri = table_uri(path.as_ref())?;
    let table = deltalake::open_table_with_version(uri, version)
        .await
        .with_context(|| format!("opening Delta table {} at version {}", uri, version))?;
    session
        .ctx()
        .read_table(Arc::new(table))
        .with_context(|| format!("scanning Delta table {} at version {}", uri, version))
}
