//! Decoding of catalog rows whose column set is not known up front.
//!
//! `DESCRIBE` and `SHOW INDEX` return different columns depending on the
//! server flavour and version, so these rows are turned into a [`Record`]
//! keyed by whatever column names the server sent.

use serde_json::Value;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::app::models::Record;

pub fn to_record(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info())?;
        record.insert(column.name().to_owned(), value);
    }
    Ok(record)
}

/// Kind of JSON value a column of this SQL type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    DateTime,
    Date,
    Bytes,
    Text,
}

pub(crate) fn value_kind(type_name: &str) -> ValueKind {
    match type_name {
        "BOOLEAN" => ValueKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ValueKind::Signed,
        name if name.ends_with(" UNSIGNED") => ValueKind::Unsigned,
        "FLOAT" | "DOUBLE" => ValueKind::Float,
        "DATETIME" | "TIMESTAMP" => ValueKind::DateTime,
        "DATE" => ValueKind::Date,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            ValueKind::Bytes
        }
        _ => ValueKind::Text,
    }
}

// Catalog columns carry odd collations (binary, utf8mb3_tolower_ci) across
// server versions, so decoding is driven by the reported type name and skips
// sqlx's compatibility check.
fn decode_column(row: &MySqlRow, index: usize, ty: &MySqlTypeInfo) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match value_kind(ty.name()) {
        ValueKind::Bool => Value::Bool(row.try_get_unchecked::<bool, _>(index)?),
        ValueKind::Signed => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        ValueKind::Unsigned => Value::from(row.try_get_unchecked::<u64, _>(index)?),
        ValueKind::Float => {
            let raw = row.try_get_unchecked::<f64, _>(index)?;
            match serde_json::Number::from_f64(raw) {
                Some(number) => Value::Number(number),
                None => {
                    tracing::warn!(column = index, value = raw, "non-finite float rendered as null");
                    Value::Null
                }
            }
        }
        ValueKind::DateTime => Value::String(
            row.try_get_unchecked::<chrono::NaiveDateTime, _>(index)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        ValueKind::Date => Value::String(
            row.try_get_unchecked::<chrono::NaiveDate, _>(index)?
                .to_string(),
        ),
        ValueKind::Bytes => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        ValueKind::Text => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
