// src/dataset/mod.rs

use anyhow::{bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int64Array, StringArray},
    compute::cast,
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// One row of the smoke dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

/// The fixed literal rows.
pub fn people() -> Vec<Person> {
    vec![
        Person::new("Alice", 34),
        Person::new("Bob", 45),
        Person::new("Charlie", 29),
    ]
}

/// `name: Utf8, age: Int64`, both nullable as an inferred schema would be.
pub fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, true),
    ]))
}

pub fn to_batch(rows: &[Person]) -> Result<RecordBatch> {
    let names: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|p| p.name.as_str()),
    ));
    let ages: ArrayRef = Arc::new(Int64Array::from_iter_values(rows.iter().map(|p| p.age)));
    RecordBatch::try_new(schema(), vec![names, ages]).context("building people record batch")
}

/// Decode batches produced by the engine back into `Person` rows.
///
/// Columns are looked up by name and cast, so view/large string encodings and
/// narrower integer widths are accepted. Nulls are rejected.
pub fn from_batches(batches: &[RecordBatch]) -> Result<Vec<Person>> {
    let mut out = Vec::new();
    for batch in batches {
        let names = column_as(batch, "name", &DataType::Utf8)?;
        let names = names
            .as_any()
            .downcast_ref::<StringArray>()
            .context("name column did not cast to Utf8")?;
        let ages = column_as(batch, "age", &DataType::Int64)?;
        let ages = ages
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("age column did not cast to Int64")?;

        for row in 0..batch.num_rows() {
            if names.is_null(row) || ages.is_null(row) {
                bail!("null value in people row {}", row);
            }
            out.push(Person::new(names.value(row), ages.value(row)));
        }
    }
    Ok(out)
}

/// Canonical order, for comparing reads whose row order is not guaranteed.
pub fn sorted(mut rows: Vec<Person>) -> Vec<Person> {
    rows.sort();
    rows
}

fn column_as(batch: &RecordBatch, name: &str, ty: &DataType) -> Result<ArrayRef> {
    let col = batch
        .column_by_name(name)
        .with_context(|| format!("missing column `{}`", name))?;
    cast(col, ty).with_context(|| format!("casting column `{}` to {}", name, ty))
}
