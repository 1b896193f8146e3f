//! Service layer providing the school/student operations on top of models.
//! - Separates business rules (capacity, cascade, search) from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Serialization to wire documents lives in `views`.

pub mod errors;
pub mod search;
pub mod views;
pub mod school_service;
pub mod student_service;
#[cfg(test)]
pub mod test_support;
