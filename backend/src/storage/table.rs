//! # Table Descriptors
//!
//! Each table is described once, declaratively: its name, its primary key,
//! and its ordered column list. The generic collection engine reads these
//! descriptors to build SQL, validate records and decode rows, so the five
//! entity tables and three relation tables share one implementation.

use std::fmt;

use shared::{Record, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite};

use crate::storage::error::ValidationError;

pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

impl ColumnKind {
    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ColumnKind::Text, Value::Text(_)) | (ColumnKind::Integer, Value::Integer(_))
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Integer => write!(f, "integer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

/// An entity table addressed by a single primary-key column
#[derive(Debug)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub key: &'static str,
    /// Column order used for every SELECT, INSERT and UPDATE
    pub columns: &'static [Column],
    pub schema: &'static str,
}

impl TableDescriptor {
    pub fn column_list(&self) -> String {
        column_list(self.columns)
    }

    pub fn find_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.column_list(),
            self.name,
            self.key
        )
    }

    pub fn find_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.column_list(),
            self.name,
            self.key
        )
    }

    pub fn exists_sql(&self) -> String {
        format!("SELECT 1 FROM {} WHERE {} = ?", self.name, self.key)
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.name)
    }

    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            self.column_list(),
            placeholders(self.columns.len())
        )
    }

    /// Every column is rewritten, the key included, so an update may rename the row
    pub fn update_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|column| format!("{} = ?", column.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.name, assignments, self.key
        )
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {} = ?", self.name, self.key)
    }

    pub fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        validate_columns(self.name, self.columns, record)
    }

    /// Bind the record's values in declared column order
    pub fn bind_record<'q>(&self, query: SqliteQuery<'q>, record: &'q Record) -> SqliteQuery<'q> {
        bind_columns(query, self.columns, record)
    }

    pub fn decode(&self, row: &SqliteRow) -> Result<Record, sqlx::Error> {
        decode_row(row, self.columns)
    }
}

/// A two-column relation table with no key of its own; a row is identified
/// by the full (left, right) pair
#[derive(Debug)]
pub struct RelationDescriptor {
    pub name: &'static str,
    /// Both columns, left first
    pub columns: &'static [Column; 2],
    pub schema: &'static str,
}

impl RelationDescriptor {
    pub fn left(&self) -> &Column {
        &self.columns[0]
    }

    pub fn right(&self) -> &Column {
        &self.columns[1]
    }

    fn pair_condition(&self) -> String {
        format!("{} = ? AND {} = ?", self.left().name, self.right().name)
    }

    pub fn exists_sql(&self) -> String {
        format!("SELECT 1 FROM {} WHERE {}", self.name, self.pair_condition())
    }

    pub fn find_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}, {}",
            column_list(self.columns),
            self.name,
            self.left().name,
            self.right().name
        )
    }

    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES (?, ?)",
            self.name,
            column_list(self.columns)
        )
    }

    pub fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET {} = ?, {} = ? WHERE {}",
            self.name,
            self.left().name,
            self.right().name,
            self.pair_condition()
        )
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {}", self.name, self.pair_condition())
    }

    pub fn validate(&self, pair: &Record) -> Result<(), ValidationError> {
        validate_columns(self.name, self.columns, pair)
    }

    pub fn bind_pair<'q>(&self, query: SqliteQuery<'q>, pair: &'q Record) -> SqliteQuery<'q> {
        bind_columns(query, self.columns, pair)
    }

    pub fn decode(&self, row: &SqliteRow) -> Result<Record, sqlx::Error> {
        decode_row(row, self.columns)
    }
}

fn column_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|column| column.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Check that `record` carries exactly the declared columns with matching types
fn validate_columns(
    table: &'static str,
    columns: &'static [Column],
    record: &Record,
) -> Result<(), ValidationError> {
    for column in columns {
        let value = record.get(column.name).ok_or(ValidationError::MissingField {
            table,
            column: column.name,
        })?;

        if value.is_null() {
            return Err(ValidationError::NullValue {
                table,
                column: column.name,
            });
        }

        if !column.kind.accepts(value) {
            return Err(ValidationError::TypeMismatch {
                table,
                column: column.name,
                expected: column.kind,
                found: value.type_name(),
            });
        }
    }

    if let Some(field) = record
        .fields()
        .find(|field| !columns.iter().any(|column| column.name == *field))
    {
        return Err(ValidationError::UnknownField {
            table,
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Bind one value per column, in column order. Callers validate first, so a
/// missing field only shows up here as NULL.
fn bind_columns<'q>(
    mut query: SqliteQuery<'q>,
    columns: &[Column],
    record: &'q Record,
) -> SqliteQuery<'q> {
    for column in columns {
        query = match record.get(column.name) {
            Some(value) => bind_value(query, value),
            None => query.bind(None::<String>),
        };
    }
    query
}

pub fn bind_value<'q>(query: SqliteQuery<'q>, value: &'q Value) -> SqliteQuery<'q> {
    match value {
        Value::Text(text) => query.bind(text.as_str()),
        Value::Integer(n) => query.bind(*n),
        Value::Null => query.bind(None::<String>),
    }
}

/// Decode a row into a record using the given columns' names and kinds
pub fn decode_row<'a>(
    row: &SqliteRow,
    columns: impl IntoIterator<Item = &'a Column>,
) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in columns {
        let value = match column.kind {
            ColumnKind::Text => Value::from(row.try_get::<Option<String>, _>(column.name)?),
            ColumnKind::Integer => Value::from(row.try_get::<Option<i64>, _>(column.name)?),
        };
        record.insert(column.name, value);
    }
    Ok(record)
}

pub static STUDENT: TableDescriptor = TableDescriptor {
    name: "Student",
    key: "id",
    columns: &[
        Column::text("id"),
        Column::text("name"),
        Column::integer("student_age"),
        Column::integer("year_enrolled"),
        Column::integer("graduating_year"),
        Column::text("class_id"),
    ],
    schema: r#"
        CREATE TABLE IF NOT EXISTS Student (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            student_age INTEGER NOT NULL,
            year_enrolled INTEGER NOT NULL,
            graduating_year INTEGER NOT NULL,
            class_id TEXT NOT NULL REFERENCES Class (id)
        );
    "#,
};

pub static CLASS: TableDescriptor = TableDescriptor {
    name: "Class",
    key: "id",
    columns: &[Column::text("id"), Column::text("name"), Column::text("level")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS Class (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            level TEXT NOT NULL
        );
    "#,
};

pub static SUBJECT: TableDescriptor = TableDescriptor {
    name: "Subject",
    key: "id",
    columns: &[Column::text("id"), Column::text("name"), Column::text("level")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS Subject (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            level TEXT NOT NULL
        );
    "#,
};

pub static CCA: TableDescriptor = TableDescriptor {
    name: "CCA",
    key: "id",
    columns: &[Column::text("id"), Column::text("name"), Column::text("type")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS CCA (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL
        );
    "#,
};

pub static ACTIVITY: TableDescriptor = TableDescriptor {
    name: "Activity",
    key: "id",
    columns: &[
        Column::text("id"),
        Column::text("name"),
        Column::text("start_date"),
        Column::text("end_date"),
        Column::text("description"),
        Column::text("category"),
        Column::text("role"),
        Column::text("award"),
        Column::integer("hours"),
        Column::text("cca_id"),
    ],
    schema: r#"
        CREATE TABLE IF NOT EXISTS Activity (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            role TEXT NOT NULL,
            award TEXT NOT NULL,
            hours INTEGER NOT NULL,
            cca_id TEXT NOT NULL REFERENCES CCA (id)
        );
    "#,
};

pub static STUDENT_ACTIVITY: RelationDescriptor = RelationDescriptor {
    name: "StudentActivity",
    columns: &[Column::text("student_id"), Column::text("activity_id")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS StudentActivity (
            student_id TEXT NOT NULL REFERENCES Student (id),
            activity_id TEXT NOT NULL REFERENCES Activity (id),
            UNIQUE (student_id, activity_id)
        );
    "#,
};

pub static STUDENT_CCA: RelationDescriptor = RelationDescriptor {
    name: "StudentCCA",
    columns: &[Column::text("student_id"), Column::text("cca_id")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS StudentCCA (
            student_id TEXT NOT NULL REFERENCES Student (id),
            cca_id TEXT NOT NULL REFERENCES CCA (id),
            UNIQUE (student_id, cca_id)
        );
    "#,
};

pub static STUDENT_SUBJECT: RelationDescriptor = RelationDescriptor {
    name: "StudentSubject",
    columns: &[Column::text("student_id"), Column::text("subject_id")],
    schema: r#"
        CREATE TABLE IF NOT EXISTS StudentSubject (
            student_id TEXT NOT NULL REFERENCES Student (id),
            subject_id TEXT NOT NULL REFERENCES Subject (id),
            UNIQUE (student_id, subject_id)
        );
    "#,
};

pub static TABLES: [&TableDescriptor; 5] = [&CLASS, &CCA, &SUBJECT, &STUDENT, &ACTIVITY];

pub static RELATIONS: [&RelationDescriptor; 3] =
    [&STUDENT_ACTIVITY, &STUDENT_CCA, &STUDENT_SUBJECT];

#[cfg(test)]
mod tests {
    use super::*;

    fn class_record() -> Record {
        Record::new()
            .with("id", "Y1234")
            .with("name", "2227")
            .with("level", "JC2")
    }

    #[test]
    fn test_generated_sql_follows_column_order() {
        assert_eq!(
            CLASS.insert_sql(),
            "INSERT INTO Class (id, name, level) VALUES (?, ?, ?)"
        );
        assert_eq!(
            CLASS.update_sql(),
            "UPDATE Class SET id = ?, name = ?, level = ? WHERE id = ?"
        );
        assert_eq!(CLASS.find_sql(), "SELECT id, name, level FROM Class WHERE id = ?");
        assert_eq!(
            STUDENT_CCA.update_sql(),
            "UPDATE StudentCCA SET student_id = ?, cca_id = ? WHERE student_id = ? AND cca_id = ?"
        );
    }

    #[test]
    fn test_validate_accepts_complete_record() {
        assert_eq!(CLASS.validate(&class_record()), Ok(()));
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let mut record = class_record();
        record.remove("level");
        assert_eq!(
            CLASS.validate(&record),
            Err(ValidationError::MissingField {
                table: "Class",
                column: "level"
            })
        );
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let record = class_record().with("teacher", "Mr Tan");
        assert_eq!(
            CLASS.validate(&record),
            Err(ValidationError::UnknownField {
                table: "Class",
                field: "teacher".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_wrong_type_for_integer_column() {
        let record = Record::new()
            .with("id", "S1")
            .with("name", "Jack")
            .with("student_age", "twenty")
            .with("year_enrolled", 2200)
            .with("graduating_year", 2220)
            .with("class_id", "Y1234");
        assert_eq!(
            STUDENT.validate(&record),
            Err(ValidationError::TypeMismatch {
                table: "Student",
                column: "student_age",
                expected: ColumnKind::Integer,
                found: "text"
            })
        );
    }

    #[test]
    fn test_validate_rejects_null() {
        let record = Record::new()
            .with("student_id", "S1")
            .with("cca_id", Value::Null);
        assert_eq!(
            STUDENT_CCA.validate(&record),
            Err(ValidationError::NullValue {
                table: "StudentCCA",
                column: "cca_id"
            })
        );
    }
}
