//! # Storage Traits
//!
//! The contracts the presentation layer programs against. Entity tables are
//! addressed by a single key; relation tables by a full pair.

use async_trait::async_trait;
use shared::Record;

use crate::storage::collection::Collection;
use crate::storage::error::StorageResult;
use crate::storage::junction::JunctionCollection;

/// Guarded CRUD over one entity table
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Name of the backing table
    fn table_name(&self) -> &'static str;

    /// Name of the primary-key field in records
    fn key_field(&self) -> &'static str;

    /// Retrieve a record by primary key
    async fn find(&self, key: &str) -> StorageResult<Option<Record>>;

    /// All records ordered by primary key
    async fn find_all(&self) -> StorageResult<Vec<Record>>;

    /// Returns false if the key is already taken
    async fn insert(&self, record: &Record) -> StorageResult<bool>;

    /// Returns false if nothing is stored under `key` or the new key is taken
    async fn update(&self, key: &str, record: &Record) -> StorageResult<bool>;

    /// Returns false if nothing is stored under `key`
    async fn delete(&self, key: &str) -> StorageResult<bool>;
}

/// Guarded CRUD over one relation table
#[async_trait]
pub trait PairStorage: Send + Sync {
    fn table_name(&self) -> &'static str;

    /// The two pair fields, left first
    fn pair_fields(&self) -> [&'static str; 2];

    async fn exists(&self, pair: &Record) -> StorageResult<bool>;

    async fn find_all(&self) -> StorageResult<Vec<Record>>;

    async fn insert(&self, pair: &Record) -> StorageResult<bool>;

    async fn update(&self, old: &Record, new: &Record) -> StorageResult<bool>;

    async fn delete(&self, pair: &Record) -> StorageResult<bool>;
}

#[async_trait]
impl RecordStorage for Collection {
    fn table_name(&self) -> &'static str {
        self.table().name
    }

    fn key_field(&self) -> &'static str {
        self.table().key
    }

    async fn find(&self, key: &str) -> StorageResult<Option<Record>> {
        Collection::find(self, key).await
    }

    async fn find_all(&self) -> StorageResult<Vec<Record>> {
        Collection::find_all(self).await
    }

    async fn insert(&self, record: &Record) -> StorageResult<bool> {
        Collection::insert(self, record).await
    }

    async fn update(&self, key: &str, record: &Record) -> StorageResult<bool> {
        Collection::update(self, key, record).await
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        Collection::delete(self, key).await
    }
}

#[async_trait]
impl PairStorage for JunctionCollection {
    fn table_name(&self) -> &'static str {
        self.relation().name
    }

    fn pair_fields(&self) -> [&'static str; 2] {
        [self.relation().left().name, self.relation().right().name]
    }

    async fn exists(&self, pair: &Record) -> StorageResult<bool> {
        JunctionCollection::exists(self, pair).await
    }

    async fn find_all(&self) -> StorageResult<Vec<Record>> {
        JunctionCollection::find_all(self).await
    }

    async fn insert(&self, pair: &Record) -> StorageResult<bool> {
        JunctionCollection::insert(self, pair).await
    }

    async fn update(&self, old: &Record, new: &Record) -> StorageResult<bool> {
        JunctionCollection::update(self, old, new).await
    }

    async fn delete(&self, pair: &Record) -> StorageResult<bool> {
        JunctionCollection::delete(self, pair).await
    }
}
