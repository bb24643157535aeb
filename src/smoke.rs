// src/smoke.rs

use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{info, instrument};

use crate::{
    aggregate,
    config::SmokeConfig,
    dataset::{self, people},
    history, render,
    session::Session,
    table,
};

/// What one run observed.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeReport {
    pub rows: usize,
    pub columns: usize,
    pub mean_age: Option<f64>,
    pub table_version: i64,
    pub history_len: usize,
    /// Rows read back from the table, in scan order.
    pub reloaded: Vec<dataset::Person>,
}

fn banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "=== {} ===", title)
}

/// Build, aggregate, persist, reload and inspect the people dataset,
/// printing each stage to stdout.
pub async fn run(cfg: &SmokeConfig) -> Result<SmokeReport> {
    let mut stdout = io::stdout();
    run_to(cfg, &mut stdout).await
}

/// Same as `run`, with stage output going to `out`.
#[instrument(skip(cfg, out), fields(app = %cfg.app_name, path = %cfg.table_path.display()))]
pub async fn run_to(cfg: &SmokeConfig, out: &mut impl Write) -> Result<SmokeReport> {
    let session = Session::start(cfg)?;

    let df = session.create_dataframe(&people())?;
    let batches = df.clone().collect().await.context("collecting dataset")?;
    let schema = df.schema().as_arrow().clone();

    banner(out, "DataFrame")?;
    writeln!(out, "{}", render::batches(&batches)?)?;

    banner(out, "Schema")?;
    write!(out, "{}", render::schema_tree(&schema))?;

    banner(out, "Simple aggregation")?;
    let avg_batches = aggregate::mean_frame(&df, "age")?
        .collect()
        .await
        .context("computing avg(age)")?;
    writeln!(out, "{}", render::batches(&avg_batches)?)?;
    let mean_age = aggregate::mean_value(&avg_batches)?;

    banner(out, "Writing Delta Table")?;
    let written = table::write_overwrite(&cfg.table_path, batches.clone(), &cfg.app_name).await?;
    let table_version = table::latest_version(&written)?;
    writeln!(
        out,
        "Wrote Delta table to {} (version {})",
        cfg.table_path.display(),
        table_version
    )?;

    banner(out, "Reading Delta Table")?;
    let read_batches = table::load(&session, &cfg.table_path)
        .await?
        .collect()
        .await
        .context("collecting reloaded table")?;
    writeln!(out, "{}", render::batches(&read_batches)?)?;
    let reloaded = dataset::from_batches(&read_batches)?;

    banner(out, "Delta Table History")?;
    let commits = history::table_history(&cfg.table_path, None).await?;
    writeln!(out, "{}", render::batches(&[history::to_batch(&commits)?])?)?;

    let report = SmokeReport {
        rows: batches.iter().map(|b| b.num_rows()).sum(),
        columns: schema.fields().len(),
        mean_age,
        table_version,
        history_len: commits.len(),
        reloaded,
    };
    info!(?report, "smoke run finished");

    session.stop();
    writeln!(out, "\nSession closed successfully!")?;
    out.flush()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sorted;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_full_run_on_fresh_path() {
        let tmp = tempdir().unwrap();
        let cfg = SmokeConfig::default().with_table_path(tmp.path().join("delta_smoke"));

        let report = run_to(&cfg, &mut io::sink()).await.unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.columns, 2);
        assert_eq!(report.mean_age, Some(36.0));
        assert_eq!(report.table_version, 0);
        assert_eq!(report.history_len, 1);
        assert_eq!(sorted(report.reloaded), sorted(people()));
    }

    #[tokio::test]
    async fn test_rerun_appends_history() {
        let tmp = tempdir().unwrap();
        let cfg = SmokeConfig::default().with_table_path(tmp.path().join("delta_smoke"));

        run_to(&cfg, &mut io::sink()).await.unwrap();
        let second = run(&cfg).await.unwrap();
        assert_eq!(second.table_version, 1);
        assert_eq!(second.history_len, 2);
        assert_eq!(second.reloaded.len(), 3);
    }

    #[tokio::test]
    async fn test_stage_banners_in_order() {
        let tmp = tempdir().unwrap();
        let cfg = SmokeConfig::default().with_table_path(tmp.path().join("delta_smoke"));

        let mut buf = Vec::new();
        run_to(&cfg, &mut buf).await.unwrap();
        let text = String::from_utf8(buf).unwrap();

        let stages = [
            "=== DataFrame ===",
            "=== Schema ===",
            "=== Simple aggregation ===",
            "=== Writing Delta Table ===",
            "=== Reading Delta Table ===",
            "=== Delta Table History ===",
        ];
        let mut last = 0;
        for stage in stages {
            let at = text[last..]
                .find(stage)
                .unwrap_or_else(|| panic!("missing {} in output:\n{}", stage, text));
            last += at + stage.len();
        }
        assert!(text.contains(" |-- age: long (nullable = true)"));
        assert!(text.contains("avg(age)"));
        assert!(text.contains("36.0"));
        assert!(text.trim_end().ends_with("Session closed successfully!"));
    }
}
