use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, BooleanArray, Int64Array, StringArray, TimestampMillisecondArray},
    datatypes::{DataType as ArrowDataType, Field, Schema as ArrowSchema, TimeUnit},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Utc};
use deltalake::kernel::CommitInfo;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

/// One entry of a table's version history.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRow {
    pub version: i64,
    pub timestamp: Option<DateTime<Utc>>,
    pub operation: Option<String>,
    /// JSON object, keys sorted.
    pub operation_parameters: Option<String>,
    pub read_version: Option<i64>,
    pub is_blind_append: Option<bool>,
    /// JSON object, keys sorted.
    pub operation_metrics: Option<String>,
    pub client_version: Option<String>,
}

impl CommitRow {
    pub fn from_commit(version: i64, info: &CommitInfo) -> Self {
        Self {
            version,
            timestamp: info.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis),
            operation: info.operation.clone(),
            operation_parameters: info
                .operation_parameters
                .as_ref()
                .map(|params| sorted_json(params.iter())),
            read_version: info.read_version,
            is_blind_append: info.is_blind_append,
            operation_metrics: info.info.get("operationMetrics").map(|m| match m {
                Value::Object(map) => sorted_json(map.iter()),
                other => other.to_string(),
            }),
            client_version: info
                .info
                .get("clientVersion")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// A version whose commit carries no `commitInfo` action.
    pub fn bare(version: i64) -> Self {
        Self {
            version,
            timestamp: None,
            operation: None,
            operation_parameters: None,
            read_version: None,
            is_blind_append: None,
            operation_metrics: None,
            client_version: None,
        }
    }

    pub fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            Field::new("version", ArrowDataType::Int64, false),
            Field::new(
                "timestamp",
                ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
                true,
            ),
            Field::new("operation", ArrowDataType::Utf8, true),
            Field::new("operationParameters", ArrowDataType::Utf8, true),
            Field::new("readVersion", ArrowDataType::Int64, true),
            Field::new("isBlindAppend", ArrowDataType::Boolean, true),
            Field::new("operationMetrics", ArrowDataType::Utf8, true),
            Field::new("clientVersion", ArrowDataType::Utf8, true),
        ])
    }
}

/// Rows as a single batch in `CommitRow::schema()` layout.
pub fn to_batch(rows: &[CommitRow]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.version))),
        Arc::new(TimestampMillisecondArray::from(
            rows.iter()
                .map(|r| r.timestamp.map(|t| t.timestamp_millis()))
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.operation.as_deref())
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.operation_parameters.as_deref())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(
            rows.iter().map(|r| r.read_version).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.is_blind_append).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.operation_metrics.as_deref())
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.client_version.as_deref())
                .collect::<Vec<_>>(),
        )),
    ];
    RecordBatch::try_new(Arc::new(CommitRow::schema()), columns)
        .context("building history record batch")
}

fn sorted_json<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>) -> String {
    let sorted: BTreeMap<&String, &Value> = entries.collect();
    Value::Object(
        sorted
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use chrono::TimeZone;
    use serde_json::json;

    fn row(version: i64) -> CommitRow {
        CommitRow {
            version,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()),
            operation: Some("WRITE".to_string()),
            operation_parameters: Some(r#"{"mode":"Overwrite"}"#.to_string()),
            read_version: if version == 0 { None } else { Some(version - 1) },
            is_blind_append: Some(false),
            operation_metrics: None,
            client_version: Some("delta-rs.0.26.0".to_string()),
        }
    }

    #[test]
    fn test_batch_layout() {
        let batch = to_batch(&[row(1), row(0)]).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);
        assert_eq!(batch.schema().field(0).name(), "version");

        let versions = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(versions.value(0), 1);

        let read_versions = batch
            .column(4)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(read_versions.value(0), 0);
        assert!(read_versions.is_null(1));
        assert!(batch.column(6).is_null(0));
    }

    #[test]
    fn test_empty_history_batch() {
        let batch = to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 8);
    }

    #[test]
    fn test_sorted_json_orders_keys() {
        let map: serde_json::Map<String, Value> =
            serde_json::from_value(json!({"partitionBy": "[]", "mode": "Overwrite"})).unwrap();
        assert_eq!(
            sorted_json(map.iter()),
            r#"{"mode":"Overwrite","partitionBy":"[]"}"#
        );
    }
}
