use shared::Record;
use std::ops::Deref;
use tracing::info;

use crate::storage::collection::Collection;
use crate::storage::connection::DbConnection;
use crate::storage::error::StorageResult;
use crate::storage::table::{decode_row, Column, CCA, STUDENT};

const MEMBER_COLUMNS: &[Column] = &[Column::text("class_name")];

#[derive(Clone)]
pub struct CcaCollection {
    collection: Collection,
}

impl CcaCollection {
    pub fn new(db: DbConnection) -> Self {
        Self {
            collection: Collection::new(db, &CCA),
        }
    }

    /// Members of the CCA with their class name, ordered by student id.
    /// Members whose class row is missing are left out.
    pub async fn students(&self, cca_id: &str) -> StorageResult<Vec<Record>> {
        info!("Listing members of CCA {}", cca_id);

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.name, s.student_age, s.year_enrolled, s.graduating_year, s.class_id,
                   c.name AS class_name
            FROM StudentCCA sc
            INNER JOIN Student s ON s.id = sc.student_id
            INNER JOIN Class c ON c.id = s.class_id
            WHERE sc.cca_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(cca_id)
        .fetch_all(self.db().pool())
        .await?;

        let members = rows
            .iter()
            .map(|row| decode_row(row, STUDENT.columns.iter().chain(MEMBER_COLUMNS)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }
}

impl Deref for CcaCollection {
    type Target = Collection;

    fn deref(&self) -> &Collection {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::collections::test_support::*;
    use crate::storage::collections::{ClassCollection, StudentCollection};
    use crate::storage::junction::JunctionCollection;

    #[tokio::test]
    async fn test_students_lists_members_with_class_name() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let ccas = CcaCollection::new(db.clone());
        let classes = ClassCollection::new(db.clone());
        let students = StudentCollection::new(db.clone());
        let membership = JunctionCollection::student_cca(db);

        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        classes.insert(&class("Y1234", "2227")).await.unwrap();
        classes.insert(&class("Y5678", "2228")).await.unwrap();
        students.insert(&student("S2", "Nolan", "Y5678")).await.unwrap();
        students.insert(&student("S1", "John", "Y1234")).await.unwrap();
        students.insert(&student("S3", "Mary", "Y1234")).await.unwrap();
        membership.insert(&membership.pair("S2", "1")).await.unwrap();
        membership.insert(&membership.pair("S1", "1")).await.unwrap();

        let members = ccas.students("1").await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].text("id"), Some("S1"));
        assert_eq!(members[0].text("class_name"), Some("2227"));
        assert_eq!(members[1].text("id"), Some("S2"));
        assert_eq!(members[1].text("class_name"), Some("2228"));

        assert!(ccas.students("2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_students_leaves_out_members_without_class_row() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let ccas = CcaCollection::new(db.clone());
        let classes = ClassCollection::new(db.clone());
        let students = StudentCollection::new(db.clone());
        let membership = JunctionCollection::student_cca(db);

        ccas.insert(&cca("1", "Tchoukball")).await.unwrap();
        classes.insert(&class("Y1234", "2227")).await.unwrap();
        students.insert(&student("S1", "John", "Y1234")).await.unwrap();
        students.insert(&student("S2", "Nolan", "Y9999")).await.unwrap();
        membership.insert(&membership.pair("S1", "1")).await.unwrap();
        membership.insert(&membership.pair("S2", "1")).await.unwrap();

        let members = ccas.students("1").await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].text("id"), Some("S1"));

        assert!(membership.exists(&membership.pair("S2", "1")).await.unwrap());
    }
}
