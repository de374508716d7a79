//! backend/src/io/rest/mappers/form_mapper.rs

use shared::{Record, Value};

use crate::storage::table::{Column, ColumnKind};

/// Normalises submitted records before they reach the collections.
///
/// The storage layer never coerces types, so this is where form input is
/// cleaned up: text is trimmed, numeric strings destined for integer columns
/// become integers, and bare numbers destined for text columns become text.
/// Anything that still does not fit is left alone for validation to report.
pub struct FormMapper;

impl FormMapper {
    pub fn normalize(columns: &[Column], mut record: Record) -> Record {
        for (field, value) in record.iter_mut() {
            let kind = columns
                .iter()
                .find(|column| column.name == field)
                .map(|column| column.kind);
            *value = Self::normalize_value(kind, std::mem::replace(value, Value::Null));
        }
        record
    }

    fn normalize_value(kind: Option<ColumnKind>, value: Value) -> Value {
        match (kind, value) {
            (Some(ColumnKind::Integer), Value::Text(text)) => match text.trim().parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::Text(text),
            },
            (Some(ColumnKind::Text), Value::Integer(n)) => Value::Text(n.to_string()),
            (_, Value::Text(text)) => Value::Text(text.trim().to_string()),
            (_, other) => other,
        }
    }
}
