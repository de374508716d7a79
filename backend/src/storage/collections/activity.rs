use shared::Record;
use std::ops::Deref;
use tracing::info;

use crate::storage::collection::Collection;
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::table::{ACTIVITY, STUDENT};

#[derive(Clone)]
pub struct ActivityCollection {
    collection: Collection,
}

impl ActivityCollection {
    pub fn new(db: DbConnection) -> Self {
        Self {
            collection: Collection::new(db, &ACTIVITY),
        }
    }

    /// Students who took part in the activity, ordered by student id
    pub async fn students(&self, activity_id: &str) -> StorageResult<Vec<Record>> {
        info!("Listing participants of activity {}", activity_id);

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.student_age, s.year_enrolled, s.graduating_year, s.class_id
            FROM StudentActivity sa
            INNER JOIN Student s ON s.id = sa.student_id
            WHERE sa.activity_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(activity_id)
        .fetch_all(self.db().pool())
        .await?;

        let students = rows
            .iter()
            .map(|row| STUDENT.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }
}

impl Deref for ActivityCollection {
    type Target = Collection;

    fn deref(&self) -> &Collection {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::collections::test_support::*;
    use crate::storage::collections::StudentCollection;
    use crate::storage::junction::JunctionCollection;

    #[tokio::test]
    async fn test_students_joins_on_activity_id() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let activities = ActivityCollection::new(db.clone());
        let students = StudentCollection::new(db.clone());
        let participation = JunctionCollection::student_activity(db);

        activities.insert(&activity("A1", "Beach clean up", "1")).await.unwrap();
        activities.insert(&activity("A2", "Painting", "1")).await.unwrap();
        students.insert(&student("S2", "Nolan", "Y1234")).await.unwrap();
        students.insert(&student("S1", "John", "Y1234")).await.unwrap();
        participation.insert(&participation.pair("S2", "A1")).await.unwrap();
        participation.insert(&participation.pair("S1", "A1")).await.unwrap();
        participation.insert(&participation.pair("S1", "A2")).await.unwrap();

        let ids: Vec<String> = activities
            .students("A1")
            .await
            .unwrap()
            .iter()
            .map(|s| s.text("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["S1", "S2"]);

        assert_eq!(
            activities.students("A2").await.unwrap(),
            vec![student("S1", "John", "Y1234")]
        );
    }

    #[tokio::test]
    async fn test_student_id_is_not_matched_as_activity_id() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let activities = ActivityCollection::new(db.clone());
        let students = StudentCollection::new(db.clone());
        let participation = JunctionCollection::student_activity(db);

        students.insert(&student("X", "John", "Y1234")).await.unwrap();
        participation.insert(&participation.pair("X", "A1")).await.unwrap();

        assert!(activities.students("X").await.unwrap().is_empty());
    }
}
