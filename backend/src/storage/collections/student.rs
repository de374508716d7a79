use shared::Record;
use sqlx::Row;
use std::ops::Deref;
use tracing::info;

use crate::storage::collection::Collection;
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::table::{decode_row, Column, ACTIVITY, STUDENT, SUBJECT};

/// Extra columns carried by each row of [`StudentCollection::view_all`]
const OVERVIEW_COLUMNS: &[Column] = &[
    Column::text("class_name"),
    Column::text("cca_id"),
    Column::text("cca_name"),
];

/// Student records plus the queries that walk out from a student
#[derive(Clone)]
pub struct StudentCollection {
    collection: Collection,
}

impl StudentCollection {
    pub fn new(db: DbConnection) -> Self {
        Self {
            collection: Collection::new(db, &STUDENT),
        }
    }

    /// Activities the student took part in, ordered by activity id
    pub async fn activities(&self, student_id: &str) -> StorageResult<Vec<Record>> {
        info!("Listing activities for student {}", student_id);

        let rows = sqlx::query(
            r#"
            SELECT a.id, a.name, a.start_date, a.end_date, a.description,
                   a.category, a.role, a.award, a.hours, a.cca_id
            FROM StudentActivity sa
            INNER JOIN Activity a ON a.id = sa.activity_id
            WHERE sa.student_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db().pool())
        .await?;

        let activities = rows
            .iter()
            .map(|row| ACTIVITY.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(activities)
    }

    /// Name of the class the student belongs to; `None` when the student or
    /// the referenced class does not exist
    pub async fn class_name(&self, student_id: &str) -> StorageResult<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT c.name
            FROM Student s
            INNER JOIN Class c ON c.id = s.class_id
            WHERE s.id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db().pool())
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("name")?)),
            None => Ok(None),
        }
    }

    /// Names of the CCAs the student is a member of, ordered by CCA id
    pub async fn cca_names(&self, student_id: &str) -> StorageResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT cca.name
            FROM StudentCCA sc
            INNER JOIN CCA cca ON cca.id = sc.cca_id
            WHERE sc.student_id = ?
            ORDER BY cca.id
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db().pool())
        .await?;

        let names = rows
            .iter()
            .map(|row| row.try_get("name"))
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Subjects the student takes, ordered by subject id
    pub async fn subjects(&self, student_id: &str) -> StorageResult<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT sub.id, sub.name, sub.level
            FROM StudentSubject ss
            INNER JOIN Subject sub ON sub.id = ss.subject_id
            WHERE ss.student_id = ?
            ORDER BY sub.id
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db().pool())
        .await?;

        let subjects = rows
            .iter()
            .map(|row| SUBJECT.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subjects)
    }

    /// One row per (student, CCA membership) with the student's class name.
    ///
    /// Inner joins throughout: students with no CCA, or whose class row is
    /// missing, do not appear.
    pub async fn view_all(&self) -> StorageResult<Vec<Record>> {
        info!("Building student overview");

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.student_age, s.year_enrolled, s.graduating_year, s.class_id,
                   c.name AS class_name, cca.id AS cca_id, cca.name AS cca_name
            FROM Student s
            INNER JOIN Class c ON c.id = s.class_id
            INNER JOIN StudentCCA sc ON sc.student_id = s.id
            INNER JOIN CCA cca ON cca.id = sc.cca_id
            ORDER BY s.id, cca.id
            "#,
        )
        .fetch_all(self.db().pool())
        .await?;

        let overview = rows
            .iter()
            .map(|row| decode_row(row, STUDENT.columns.iter().chain(OVERVIEW_COLUMNS)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(overview)
    }
}

impl Deref for StudentCollection {
    type Target = Collection;

    fn deref(&self) -> &Collection {
        &self.collection
    }
}
