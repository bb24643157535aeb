// src/render/schema.rs

use arrow::datatypes::{DataType, Field, Schema};

/// Engine-neutral name for an Arrow type, as shown in schema listings.
///
/// Covers:
/// - Utf8, LargeUtf8, Utf8View      → string
/// - Int8 / Int16 / Int32 / Int64   → byte / short / integer / long
/// - UInt*                          → same width names as the signed types
/// - Float32 / Float64              → float / double
/// - Decimal128/256(p, s)           → decimal(p,s)
/// - Boolean                        → boolean
/// - Date32, Date64                 → date
/// - Timestamp(*)                   → timestamp
/// - Binary, LargeBinary, view      → binary
/// - List*, Struct, Map             → array / struct / map
/// - fallback                       → lowercased Arrow name
pub fn type_name(ty: &DataType) -> String {
    match ty {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "string".into(),
        DataType::Int8 | DataType::UInt8 => "byte".into(),
        DataType::Int16 | DataType::UInt16 => "short".into(),
        DataType::Int32 | DataType::UInt32 => "integer".into(),
        DataType::Int64 | DataType::UInt64 => "long".into(),
        DataType::Float16 | DataType::Float32 => "float".into(),
        DataType::Float64 => "double".into(),
        DataType::Decimal128(p, s) | DataType::Decimal256(p, s) => format!("decimal({},{})", p, s),
        DataType::Boolean => "boolean".into(),
        DataType::Date32 | DataType::Date64 => "date".into(),
        DataType::Timestamp(_, _) => "timestamp".into(),
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => "binary".into(),
        DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => {
            "array".into()
        }
        DataType::Struct(_) => "struct".into(),
        DataType::Map(_, _) => "map".into(),
        DataType::Null => "void".into(),
        other => other.to_string().to_lowercase(),
    }
}

/// Tree listing of `schema`:
///
/// ```text
/// root
///  |-- name: string (nullable = true)
///  |-- age: long (nullable = true)
/// ```
pub fn schema_tree(schema: &Schema) -> String {
    let mut out = String::from("root\n");
    for field in schema.fields() {
        write_field(&mut out, field, 1);
    }
    out
}

fn write_field(out: &mut String, field: &Field, depth: usize) {
    out.push_str(&format!(
        "{}-- {}: {} (nullable = {})\n",
        prefix(depth),
        field.name(),
        type_name(field.data_type()),
        field.is_nullable()
    ));
    write_children(out, field.data_type(), depth + 1);
}

fn write_children(out: &mut String, ty: &DataType, depth: usize) {
    match ty {
        DataType::Struct(fields) => {
            for child in fields {
                write_field(out, child, depth);
            }
        }
        DataType::List(item) | DataType::LargeList(item) | DataType::FixedSizeList(item, _) => {
            out.push_str(&format!(
                "{}-- element: {} (containsNull = {})\n",
                prefix(depth),
                type_name(item.data_type()),
                item.is_nullable()
            ));
            write_children(out, item.data_type(), depth + 1);
        }
        _ => {}
    }
}

fn prefix(depth: usize) -> String {
    let mut p = String::from(" ");
    for _ in 1..depth {
        p.push_str("|    ");
    }
    p.push('|');
    p
}
