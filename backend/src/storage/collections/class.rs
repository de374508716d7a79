use shared::Record;
use std::ops::Deref;

use crate::storage::collection::Collection;
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::table::{CLASS, STUDENT};

#[derive(Clone)]
pub struct ClassCollection {
    collection: Collection,
}

impl ClassCollection {
    pub fn new(db: DbConnection) -> Self {
        Self {
            collection: Collection::new(db, &CLASS),
        }
    }

    /// Students whose class reference is `class_id`, ordered by student id
    pub async fn students(&self, class_id: &str) -> StorageResult<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, student_age, year_enrolled, graduating_year, class_id
            FROM Student
            WHERE class_id = ?
            ORDER BY id
            "#,
        )
        .bind(class_id)
        .fetch_all(self.db().pool())
        .await?;

        let students = rows
            .iter()
            .map(|row| STUDENT.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }
}

impl Deref for ClassCollection {
    type Target = Collection;

    fn deref(&self) -> &Collection {
        &self.collection
    }
}
