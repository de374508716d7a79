use shared::Record;
use std::ops::Deref;

use crate::storage::collection::Collection;
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::table::{STUDENT, SUBJECT};

#[derive(Clone)]
pub struct SubjectCollection {
    collection: Collection,
}

impl SubjectCollection {
    pub fn new(db: DbConnection) -> Self {
        Self {
            collection: Collection::new(db, &SUBJECT),
        }
    }

    /// Students taking the subject, ordered by student id
    pub async fn students(&self, subject_id: &str) -> StorageResult<Vec<Record>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.student_age, s.year_enrolled, s.graduating_year, s.class_id
            FROM StudentSubject ss
            INNER JOIN Student s ON s.id = ss.student_id
            WHERE ss.subject_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(subject_id)
        .fetch_all(self.db().pool())
        .await?;

        let students = rows
            .iter()
            .map(|row| STUDENT.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }
}

impl Deref for SubjectCollection {
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
    async fn test_students_taking_subject() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let subjects = SubjectCollection::new(db.clone());
        let students = StudentCollection::new(db.clone());
        let enrolment = JunctionCollection::student_subject(db);

        subjects.insert(&subject("MA", "Mathematics")).await.unwrap();
        students.insert(&student("S1", "John", "Y1234")).await.unwrap();
        students.insert(&student("S2", "Nolan", "Y1234")).await.unwrap();
        enrolment.insert(&enrolment.pair("S2", "MA")).await.unwrap();

        assert_eq!(
            subjects.students("MA").await.unwrap(),
            vec![student("S2", "Nolan", "Y1234")]
        );
        assert!(subjects.students("PH").await.unwrap().is_empty());
    }
}
