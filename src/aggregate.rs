// src/aggregate.rs

use anyhow::{Context, Result};
use arrow::{
    array::{Array, Float64Array},
    compute::cast,
    datatypes::DataType,
    record_batch::RecordBatch,
};
use datafusion::{dataframe::DataFrame, functions_aggregate::expr_fn::avg, prelude::col};

/// Ungrouped mean of `column`, output column named `avg(<column>)`.
pub fn mean_frame(df: &DataFrame, column: &str) -> Result<DataFrame> {
    df.clone()
        .aggregate(vec![], vec![avg(col(column)).alias(format!("avg({})", column))])
        .with_context(|| format!("planning avg({})", column))
}

/// Mean of `column`, or `None` when there are no rows to average.
pub async fn mean(df: &DataFrame, column: &str) -> Result<Option<f64>> {
    let batches = mean_frame(df, column)?
        .collect()
        .await
        .with_context(|| format!("computing avg({})", column))?;
    mean_value(&batches)
}

/// Read the single mean out of collected `mean_frame` output.
pub fn mean_value(batches: &[RecordBatch]) -> Result<Option<f64>> {
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok(None);
    };
    let values = cast(batch.column(0), &DataType::Float64).context("casting mean to Float64")?;
    let values = values
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("mean column is not Float64")?;
    if values.is_null(0) {
        Ok(None)
    } else {
        Ok(Some(values.value(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SmokeConfig, dataset::people, session::Session};

    #[tokio::test]
    async fn test_mean_age() {
        let session = Session::start(&SmokeConfig::default()).unwrap();
        let df = session.create_dataframe(&people()).unwrap();
        let mean_age = mean(&df, "age").await.unwrap();
        assert_eq!(mean_age, Some(36.0));
    }

    #[tokio::test]
    async fn test_mean_of_no_rows_is_none() {
        let session = Session::start(&SmokeConfig::default()).unwrap();
        let df = session.create_dataframe(&[]).unwrap();
        assert_eq!(mean(&df, "age").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mean_frame_column_name() {
        let session = Session::start(&SmokeConfig::default()).unwrap();
        let df = session.create_dataframe(&people()).unwrap();
        let frame = mean_frame(&df, "age").unwrap();
        assert_eq!(frame.schema().field(0).name(), "avg(age)");
    }

    #[tokio::test]
    async fn test_unknown_column_is_error() {
        let session = Session::start(&SmokeConfig::default()).unwrap();
        let df = session.create_dataframe(&people()).unwrap();
        assert!(mean_frame(&df, "height").is_err());
    }

    #[test]
    fn test_mean_value_of_no_batches() {
        assert_eq!(mean_value(&[]).unwrap(), None);
    }

    #[tokio::test]
    async fn test_mean_value_from_collected_frame() {
        let session = Session::start(&SmokeConfig::default()).unwrap();
        let df = session.create_dataframe(&people()).unwrap();
        let batches = mean_frame(&df, "age").unwrap().collect().await.unwrap();
        assert_eq!(mean_value(&batches).unwrap(), Some(36.0));
    }
}
