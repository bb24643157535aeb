// src/render/mod.rs

pub mod schema;

pub use schema::{schema_tree, type_name};

use anyhow::{Context, Result};
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};

/// Batches as an ASCII table.
pub fn batches(batches: &[RecordBatch]) -> Result<String> {
    Ok(pretty_format_batches(batches)
        .context("formatting record batches")?
        .to_string())
}
