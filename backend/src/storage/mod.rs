//! # Storage Module
//!
//! Persistence for the school records: five entity tables (students,
//! classes, subjects, CCAs, activities) and three relation tables linking
//! students to activities, CCAs and subjects.
//!
//! ## Layout
//!
//! - **table** - declarative descriptors: table name, key, ordered columns, schema
//! - **collection** - the generic CRUD engine driven by a descriptor
//! - **collections/** - one collection per entity, with its join queries
//! - **junction** - guarded CRUD over relation tables keyed by a full pair
//! - **connection** - the shared SQLite pool and schema bootstrap
//! - **traits** - `RecordStorage` / `PairStorage`, what the REST layer sees
//!
//! Expected outcomes are values, not errors: a missing row is `None`, a
//! refused write is `false`. Only malformed records and database failures
//! surface as [`StorageError`].

pub mod collection;
pub mod collections;
pub mod connection;
pub mod error;
pub mod junction;
pub mod table;
pub mod traits;

use std::fmt;
use std::str::FromStr;

pub use collection::Collection;
pub use collections::{
    ActivityCollection, CcaCollection, ClassCollection, StudentCollection, SubjectCollection,
};
pub use connection::DbConnection;
pub use error::{StorageError, StorageResult, ValidationError};
pub use junction::JunctionCollection;
pub use table::{RelationDescriptor, TableDescriptor};
pub use traits::{PairStorage, RecordStorage};

/// The entity tables, as addressed by the REST layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Class,
    Subject,
    Cca,
    Activity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Student,
        EntityKind::Class,
        EntityKind::Subject,
        EntityKind::Cca,
        EntityKind::Activity,
    ];

    /// URL path segment
    pub fn path(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Class => "classes",
            EntityKind::Subject => "subjects",
            EntityKind::Cca => "ccas",
            EntityKind::Activity => "activities",
        }
    }

    pub fn table(&self) -> &'static TableDescriptor {
        match self {
            EntityKind::Student => &table::STUDENT,
            EntityKind::Class => &table::CLASS,
            EntityKind::Subject => &table::SUBJECT,
            EntityKind::Cca => &table::CCA,
            EntityKind::Activity => &table::ACTIVITY,
        }
    }

    /// Human-readable singular label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Student => "Student",
            EntityKind::Class => "Class",
            EntityKind::Subject => "Subject",
            EntityKind::Cca => "CCA",
            EntityKind::Activity => "Activity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| format!("Unknown entity: {}", s))
    }
}

/// The relation tables, as addressed by the REST layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    StudentActivity,
    StudentCca,
    StudentSubject,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::StudentActivity,
        RelationKind::StudentCca,
        RelationKind::StudentSubject,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            RelationKind::StudentActivity => "student-activities",
            RelationKind::StudentCca => "student-ccas",
            RelationKind::StudentSubject => "student-subjects",
        }
    }

    pub fn relation(&self) -> &'static RelationDescriptor {
        match self {
            RelationKind::StudentActivity => &table::STUDENT_ACTIVITY,
            RelationKind::StudentCca => &table::STUDENT_CCA,
            RelationKind::StudentSubject => &table::STUDENT_SUBJECT,
        }
    }
}

/// Every collection, built over one shared connection
#[derive(Clone)]
pub struct Storage {
    pub students: StudentCollection,
    pub classes: ClassCollection,
    pub subjects: SubjectCollection,
    pub ccas: CcaCollection,
    pub activities: ActivityCollection,
    pub student_activities: JunctionCollection,
    pub student_ccas: JunctionCollection,
    pub student_subjects: JunctionCollection,
}

impl Storage {
    pub fn new(db: DbConnection) -> Self {
        Self {
            students: StudentCollection::new(db.clone()),
            classes: ClassCollection::new(db.clone()),
            subjects: SubjectCollection::new(db.clone()),
            ccas: CcaCollection::new(db.clone()),
            activities: ActivityCollection::new(db.clone()),
            student_activities: JunctionCollection::student_activity(db.clone()),
            student_ccas: JunctionCollection::student_cca(db.clone()),
            student_subjects: JunctionCollection::student_subject(db),
        }
    }

    pub fn records(&self, kind: EntityKind) -> &dyn RecordStorage {
        match kind {
            EntityKind::Student => &*self.students,
            EntityKind::Class => &*self.classes,
            EntityKind::Subject => &*self.subjects,
            EntityKind::Cca => &*self.ccas,
            EntityKind::Activity => &*self.activities,
        }
    }

    pub fn pairs(&self, kind: RelationKind) -> &dyn PairStorage {
        match kind {
            RelationKind::StudentActivity => &self.student_activities,
            RelationKind::StudentCca => &self.student_ccas,
            RelationKind::StudentSubject => &self.student_subjects,
        }
    }
}
