use anyhow::Result;
use deltasmoke::SmokeConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,deltalake=warn,datafusion=warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) fixed configuration ──────────────────────────────────────
    let cfg = SmokeConfig::default();
    info!(app = %cfg.app_name, path = %cfg.table_path.display(), "config");

    // ─── 3) run every stage ──────────────────────────────────────────
    let report = deltasmoke::run(&cfg).await?;

    info!(
        rows = report.rows,
        version = report.table_version,
        history = report.history_len,
        "all done"
    );
    Ok(())
}
