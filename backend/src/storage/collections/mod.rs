//! Entity collections: the generic engine fixed to one table each, plus the
//! join queries that start from that entity.

pub mod activity;
pub mod cca;
pub mod class;
pub mod student;
pub mod subject;

#[cfg(test)]
pub(crate) mod test_support;

pub use activity::ActivityCollection;
pub use cca::CcaCollection;
pub use class::ClassCollection;
pub use student::StudentCollection;
pub use subject::SubjectCollection;
