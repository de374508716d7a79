//! # Junction Collections
//!
//! Guarded CRUD over the two-column relation tables. A row has no key of
//! its own; it is identified by the full pair, and the table's UNIQUE
//! constraint keeps each pair at most once.

use shared::Record;
use tracing::{error, info, warn};

use crate::storage::connection::DbConnection;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::table::{RelationDescriptor, STUDENT_ACTIVITY, STUDENT_CCA, STUDENT_SUBJECT};

#[derive(Clone)]
pub struct JunctionCollection {
    db: DbConnection,
    relation: &'static RelationDescriptor,
}

impl JunctionCollection {
    pub fn new(db: DbConnection, relation: &'static RelationDescriptor) -> Self {
        Self { db, relation }
    }

    pub fn student_activity(db: DbConnection) -> Self {
        Self::new(db, &STUDENT_ACTIVITY)
    }

    pub fn student_cca(db: DbConnection) -> Self {
        Self::new(db, &STUDENT_CCA)
    }

    pub fn student_subject(db: DbConnection) -> Self {
        Self::new(db, &STUDENT_SUBJECT)
    }

    pub fn relation(&self) -> &'static RelationDescriptor {
        self.relation
    }

    /// Build a pair record for this relation's two columns
    pub fn pair(&self, left: &str, right: &str) -> Record {
        Record::new()
            .with(self.relation.left().name, left)
            .with(self.relation.right().name, right)
    }

    fn describe(&self, pair: &Record) -> String {
        format!(
            "({}, {})",
            pair.text(self.relation.left().name).unwrap_or_default(),
            pair.text(self.relation.right().name).unwrap_or_default()
        )
    }

    /// True iff a row matches both columns of `pair`
    pub async fn exists(&self, pair: &Record) -> StorageResult<bool> {
        self.relation.validate(pair)?;

        let sql = self.relation.exists_sql();
        let row = self
            .relation
            .bind_pair(sqlx::query(&sql), pair)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }

    /// Every pair, ordered by left then right column
    pub async fn find_all(&self) -> StorageResult<Vec<Record>> {
        let rows = sqlx::query(&self.relation.find_all_sql())
            .fetch_all(self.db.pool())
            .await?;

        let pairs = rows
            .iter()
            .map(|row| self.relation.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pairs)
    }

    /// Insert `pair`; `false` when it is already present
    pub async fn insert(&self, pair: &Record) -> StorageResult<bool> {
        self.relation.validate(pair)?;
        info!("{}: inserting {}", self.relation.name, self.describe(pair));

        let sql = self.relation.insert_sql();
        let result = self
            .relation
            .bind_pair(sqlx::query(&sql), pair)
            .execute(self.db.pool())
            .await
            .map_err(StorageError::from);

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.is_unique_violation() => {
                warn!("{}: {} already exists", self.relation.name, self.describe(pair));
                Ok(false)
            }
            Err(e) => {
                error!("{}: insert failed: {}", self.relation.name, e);
                Err(e)
            }
        }
    }

    /// Replace `old` with `new`. Refused when `old` is absent, or when `new`
    /// is already present, so a pair never ends up stored twice.
    pub async fn update(&self, old: &Record, new: &Record) -> StorageResult<bool> {
        self.relation.validate(old)?;
        self.relation.validate(new)?;
        info!(
            "{}: replacing {} with {}",
            self.relation.name,
            self.describe(old),
            self.describe(new)
        );

        let sql = self.relation.update_sql();
        let query = self.relation.bind_pair(sqlx::query(&sql), new);
        let result = self
            .relation
            .bind_pair(query, old)
            .execute(self.db.pool())
            .await
            .map_err(StorageError::from);

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(true),
            Ok(_) => {
                warn!("{}: {} not found", self.relation.name, self.describe(old));
                Ok(false)
            }
            Err(e) if e.is_unique_violation() => {
                warn!("{}: {} already exists", self.relation.name, self.describe(new));
                Ok(false)
            }
            Err(e) => {
                error!("{}: update failed: {}", self.relation.name, e);
                Err(e)
            }
        }
    }

    /// Remove `pair`; `false` when it is not present
    pub async fn delete(&self, pair: &Record) -> StorageResult<bool> {
        self.relation.validate(pair)?;
        info!("{}: deleting {}", self.relation.name, self.describe(pair));

        let sql = self.relation.delete_sql();
        let result = self
            .relation
            .bind_pair(sqlx::query(&sql), pair)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            warn!("{}: {} not found", self.relation.name, self.describe(pair));
            return Ok(false);
        }

        Ok(true)
    }
}
