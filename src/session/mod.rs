// src/session/mod.rs

use anyhow::{bail, Context, Result};
use datafusion::{
    dataframe::DataFrame,
    execution::session_state::SessionStateBuilder,
    prelude::{SessionConfig, SessionContext},
};
use deltalake::delta_datafusion::DeltaTableFactory;
use std::{path::Path, sync::Arc};
use tracing::{debug, info, instrument};

use crate::config::SmokeConfig;
use crate::dataset::{self, Person};
use crate::table::table_uri;

/// File-format name the Delta table factory is registered under.
pub const DELTA_FORMAT: &str = "DELTATABLE";

/// An in-process compute session.
///
/// Dropping the session releases it; `stop` does the same and logs it.
pub struct Session {
    app_name: String,
    ctx: SessionContext,
    delta_extensions: bool,
}

impl Session {
    /// Build a context from the fixed engine settings in `cfg`.
    #[instrument(skip(cfg), fields(app = %cfg.app_name))]
    pub fn start(cfg: &SmokeConfig) -> Result<Self> {
        let mut config = SessionConfig::new();
        for (key, value) in &cfg.settings {
            config
                .options_mut()
                .set(key, value)
                .with_context(|| format!("engine setting {} = {}", key, value))?;
        }
        debug!(settings = cfg.settings.len(), "engine settings applied");

        let mut state = SessionStateBuilder::new()
            .with_default_features()
            .with_config(config)
            .build();
        if cfg.delta_extensions {
            state
                .table_factories_mut()
                .insert(DELTA_FORMAT.to_string(), Arc::new(DeltaTableFactory {}));
        }

        info!(
            target_partitions = state.config().target_partitions(),
            delta = cfg.delta_extensions,
            "session started"
        );
        Ok(Self {
            app_name: cfg.app_name.clone(),
            ctx: SessionContext::new_with_state(state),
            delta_extensions: cfg.delta_extensions,
        })
    }

    pub fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The given rows as a single-batch dataframe.
    pub fn create_dataframe(&self, rows: &[Person]) -> Result<DataFrame> {
        let batch = dataset::to_batch(rows)?;
        self.ctx
            .read_batch(batch)
            .context("creating dataframe from literal rows")
    }

    /// Register the Delta table at `path` as `name` through SQL DDL.
    pub async fn register_delta(&self, name: &str, path: impl AsRef<Path>) -> Result<DataFrame> {
        if !self.delta_extensions {
            bail!("Delta extensions are disabled for session {}", self.app_name);
        }
        let location = table_uri(path.as_ref())?;
        let ddl = format!(
            "CREATE EXTERNAL TABLE {} STORED AS {} LOCATION '{}'",
            name, DELTA_FORMAT, location
        );
        self.ctx
            .sql(&ddl)
            .await
            .with_context(|| format!("registering Delta table {} at {}", name, location))?;
        self.ctx
            .table(name)
            .await
            .with_context(|| format!("resolving registered table {}", name))
    }

    pub fn stop(self) {
        info!(app = %self.app_name, "session stopped");
    }
}
