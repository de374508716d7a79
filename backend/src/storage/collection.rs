//! # Generic Collection
//!
//! One CRUD engine for every entity table. A `Collection` pairs the shared
//! connection with a [`TableDescriptor`]; all SQL, validation and row
//! decoding come from the descriptor.
//!
//! Guarded writes rely on the engine's own constraints: an insert that hits
//! the primary key, or an update/delete that touches no row, comes back as
//! `Ok(false)` rather than an error. Each write is a single statement, so
//! there is no window between the check and the write.

use shared::Record;
use sqlx::Row;
use tracing::{debug, error, info, warn};

use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::table::TableDescriptor;

#[derive(Clone)]
pub struct Collection {
    db: DbConnection,
    table: &'static TableDescriptor,
}

impl Collection {
    pub fn new(db: DbConnection, table: &'static TableDescriptor) -> Self {
        Self { db, table }
    }

    pub fn table(&self) -> &'static TableDescriptor {
        self.table
    }

    pub fn db(&self) -> &DbConnection {
        &self.db
    }

    /// Look up one row by primary key
    pub async fn find(&self, key: &str) -> StorageResult<Option<Record>> {
        let sql = self.table.find_sql();
        debug!("{}: {}", self.table.name, sql);

        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(self.table.decode(&r)?)),
            None => {
                warn!("{}: no row with {} = {}", self.table.name, self.table.key, key);
                Ok(None)
            }
        }
    }

    /// Every row in the table, ordered by primary key. An empty table gives
    /// an empty vector.
    pub async fn find_all(&self) -> StorageResult<Vec<Record>> {
        let sql = self.table.find_all_sql();
        debug!("{}: {}", self.table.name, sql);

        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;

        let records = rows
            .iter()
            .map(|row| self.table.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        let row = sqlx::query(&self.table.exists_sql())
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    pub async fn count(&self) -> StorageResult<i64> {
        let row = sqlx::query(&self.table.count_sql())
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get(0)?)
    }

    /// Insert a full record. Returns `false`, leaving storage untouched, when
    /// a row with the same primary key already exists.
    pub async fn insert(&self, record: &Record) -> StorageResult<bool> {
        self.table.validate(record)?;
        let key = record.text(self.table.key).unwrap_or_default();
        info!("{}: inserting {}", self.table.name, key);

        let sql = self.table.insert_sql();
        let result = self
            .table
            .bind_record(sqlx::query(&sql), record)
            .execute(self.db.pool())
            .await
            .map_err(StorageError::from);

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_unique_violation() => {
                warn!("{}: {} already exists", self.table.name, key);
                Ok(false)
            }
            Err(e) => {
                error!("{}: insert of {} failed: {}", self.table.name, key, e);
                Err(e)
            }
        }
    }

    /// Overwrite every column of the row stored under `key` with `record`.
    ///
    /// The record's own key may differ from `key`, in which case the row is
    /// renamed. Returns `false` when no row is stored under `key`, or when the
    /// new key is already taken by another row.
    pub async fn update(&self, key: &str, record: &Record) -> StorageResult<bool> {
        self.table.validate(record)?;
        info!("{}: updating {}", self.table.name, key);

        let sql = self.table.update_sql();
        let result = self
            .table
            .bind_record(sqlx::query(&sql), record)
            .bind(key)
            .execute(self.db.pool())
            .await
            .map_err(StorageError::from);

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(true),
            Ok(_) => {
                warn!("{}: cannot update {}, not found", self.table.name, key);
                Ok(false)
            }
            Err(e) if e.is_unique_violation() => {
                warn!(
                    "{}: cannot rename {} to {:?}, key already taken",
                    self.table.name,
                    key,
                    record.text(self.table.key)
                );
                Ok(false)
            }
            Err(e) => {
                error!("{}: update of {} failed: {}", self.table.name, key, e);
                Err(e)
            }
        }
    }

    /// Remove the row stored under `key`; `false` when there is none
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        info!("{}: deleting {}", self.table.name, key);

        let result = sqlx::query(&self.table.delete_sql())
            .bind(key)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            warn!("{}: cannot delete {}, not found", self.table.name, key);
            return Ok(false);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::{ACTIVITY, CCA, CLASS};
    use shared::Value;

    async fn setup_test(table: &'static TableDescriptor) -> Collection {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        Collection::new(db, table)
    }

    fn cca(id: &str, name: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("name", name)
            .with("type", "Sports")
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let ccas = setup_test(&CCA).await;

        assert!(ccas.find("1").await.unwrap().is_none());
        assert!(ccas.insert(&cca("1", "Tchoukball")).await.unwrap());

        let found = ccas.find("1").await.unwrap().expect("CCA should exist");
        assert_eq!(found, cca("1", "Tchoukball"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_refused_and_storage_unchanged() {
        let ccas = setup_test(&CCA).await;

        assert!(ccas.insert(&cca("1", "Tchoukball")).await.unwrap());
        assert!(!ccas.insert(&cca("1", "Basketball")).await.unwrap());

        let found = ccas.find("1").await.unwrap().unwrap();
        assert_eq!(found.text("name"), Some("Tchoukball"));
        assert_eq!(ccas.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_all_empty_table_is_empty_vec() {
        let classes = setup_test(&CLASS).await;
        assert!(classes.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_key() {
        let ccas = setup_test(&CCA).await;
        ccas.insert(&cca("3", "Chess")).await.unwrap();
        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        ccas.insert(&cca("2", "Basketball")).await.unwrap();

        let ids: Vec<String> = ccas
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|record| record.text("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_update_requires_existing_row() {
        let ccas = setup_test(&CCA).await;

        assert!(!ccas.update("1", &cca("1", "Chess")).await.unwrap());
        assert!(ccas.find("1").await.unwrap().is_none());

        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        assert!(ccas.update("1", &cca("1", "Chess")).await.unwrap());
        assert_eq!(
            ccas.find("1").await.unwrap().unwrap().text("name"),
            Some("Chess")
        );
    }

    #[tokio::test]
    async fn test_update_can_rename_key() {
        let ccas = setup_test(&CCA).await;
        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();

        assert!(ccas.update("1", &cca("9", "Tchoukball")).await.unwrap());
        assert!(ccas.find("1").await.unwrap().is_none());
        assert!(ccas.find("9").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_rename_onto_taken_key_is_refused() {
        let ccas = setup_test(&CCA).await;
        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        ccas.insert(&cca("2", "Basketball")).await.unwrap();

        assert!(!ccas.update("1", &cca("2", "Tchoukball")).await.unwrap());
        assert_eq!(
            ccas.find("2").await.unwrap().unwrap().text("name"),
            Some("Basketball")
        );
        assert!(ccas.exists("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_requires_existing_row() {
        let ccas = setup_test(&CCA).await;

        assert!(!ccas.delete("1").await.unwrap());

        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        assert!(ccas.delete("1").await.unwrap());
        assert!(ccas.find("1").await.unwrap().is_none());
        assert!(!ccas.delete("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_record_fails_without_writing() {
        let activities = setup_test(&ACTIVITY).await;

        let record = Record::new()
            .with("id", "A1")
            .with("name", "Beach clean up")
            .with("start_date", "20190212")
            .with("end_date", "20190212")
            .with("description", "Clearing litter")
            .with("category", "Service")
            .with("role", "Member")
            .with("award", "None")
            .with("hours", "fifty")
            .with("cca_id", "1");

        let err = activities.insert(&record).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(activities.count().await.unwrap(), 0);

        let mut fixed = record.clone();
        fixed.insert("hours", Value::Integer(50));
        assert!(activities.insert(&fixed).await.unwrap());
        assert_eq!(activities.find("A1").await.unwrap().unwrap().integer("hours"), Some(50));
    }

    #[tokio::test]
    async fn test_engine_failure_is_database_error() {
        let ccas = setup_test(&CCA).await;
        sqlx::query("DROP TABLE CCA")
            .execute(ccas.db().pool())
            .await
            .unwrap();

        let err = ccas.find("1").await.unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));

        let err = ccas.insert(&cca("1", "Tchoukball")).await.unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        assert!(!err.is_unique_violation());

        let err = ccas.delete("1").await.unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
    }
}
