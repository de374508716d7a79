use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar column value.
///
/// Every column in the school records schema is either text or an integer.
/// Serialises untagged, so JSON numbers, strings and `null` map directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// Short name of the variant, used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A flat row keyed by column name.
///
/// This is the currency between the storage collections and whatever
/// presentation layer sits on top of them: inserts and updates take a
/// `Record`, lookups hand one back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set a field, returning the previous value if there was one
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Text value of a field, `None` if missing or not text
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    /// Integer value of a field, `None` if missing or not an integer
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_integer)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.0.iter_mut().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// Response for list endpoints (all rows, traversal results)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub records: Vec<Record>,
}

/// Request to replace one relation pair with another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePairRequest {
    pub old: Record,
    pub new: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Response for a student's class lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNameResponse {
    pub student_id: String,
    pub class_name: Option<String>,
}

/// Response for a student's CCA memberships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcaNamesResponse {
    pub student_id: String,
    pub cca_names: Vec<String>,
}

/// Error body returned by the REST surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder_and_accessors() {
        let record = Record::new()
            .with("id", "S1")
            .with("student_age", 20)
            .with("class_id", None::<String>);

        assert_eq!(record.text("id"), Some("S1"));
        assert_eq!(record.integer("student_age"), Some(20));
        assert_eq!(record.get("class_id"), Some(&Value::Null));
        assert_eq!(record.text("student_age"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_record_json_shape() {
        let record = Record::new().with("id", "A1").with("hours", 12);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "A1", "hours": 12 }));
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let record: Record =
            serde_json::from_str(r#"{"name": "Jack", "hours": 3, "award": null}"#).unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("Jack".to_string())));
        assert_eq!(record.get("hours"), Some(&Value::Integer(3)));
        assert_eq!(record.get("award"), Some(&Value::Null));
    }

    #[test]
    fn test_record_equality_ignores_insertion_order() {
        let a = Record::new().with("id", "C1").with("name", "Chess");
        let b = Record::new().with("name", "Chess").with("id", "C1");
        assert_eq!(a, b);
    }
}
