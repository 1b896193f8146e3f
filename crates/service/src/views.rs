//! Wire documents for schools and students.
//!
//! Serialization is total: any loaded record maps to a document.

use models::{school, student};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolView {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub student_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<StudentView>>,
}

pub fn serialize_student(s: &student::Model) -> StudentView {
    StudentView {
        id: s.id.clone(),
        first_name: s.first_name.clone(),
        last_name: s.last_name.clone(),
        school_id: s.school_id,
    }
}

/// `student_count` is always present; the `students` list only when `include_students`.
pub fn serialize_school(
    school: &school::Model,
    students: &[student::Model],
    include_students: bool,
) -> SchoolView {
    SchoolView {
        id: school.id,
        name: school.name.clone(),
        capacity: school.capacity,
        student_count: students.len(),
        students: include_students.then(|| students.iter().map(serialize_student).collect()),
    }
}
