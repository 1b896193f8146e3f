use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{info, warn};

use models::{school, student};

use crate::errors::ServiceError;
use crate::search;

/// A school together with the students it owns, ordered by student id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolWithStudents {
    pub school: school::Model,
    pub students: Vec<student::Model>,
}

/// Create a school. Names are unique (case-sensitive).
pub async fn create_school(
    db: &DatabaseConnection,
    name: &str,
    capacity: i64,
) -> Result<school::Model, ServiceError> {
    school::validate_name(name)?;
    school::validate_capacity(capacity)?;

    let taken = school::Entity::find()
        .filter(school::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if taken.is_some() {
        warn!(%name, "school name already taken");
        return Err(ServiceError::Conflict("School name must be unique".into()));
    }

    // the unique index still catches a concurrent insert of the same name
    let created = school::create(db, name, capacity).await?;
    info!(id = created.id, name = %created.name, capacity = created.capacity, "school created");
    Ok(created)
}

/// Delete a school and every student it owns, in one transaction.
/// Returns the number of students removed with it.
pub async fn delete_school(db: &DatabaseConnection, id: i32) -> Result<u64, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    match delete_school_in(&txn, id).await {
        Ok(removed) => {
            txn.commit().await.map_err(ServiceError::db)?;
            info!(id, students_removed = removed, "school deleted");
            Ok(removed)
        }
        Err(e) => {
            txn.rollback().await.map_err(ServiceError::db)?;
            Err(e)
        }
    }
}

async fn delete_school_in(txn: &DatabaseTransaction, id: i32) -> Result<u64, ServiceError> {
    school::Entity::find_by_id(id)
        .one(txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("School"))?;

    let removed = student::Entity::delete_many()
        .filter(student::Column::SchoolId.eq(id))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?
        .rows_affected;
    school::Entity::delete_by_id(id).exec(txn).await.map_err(ServiceError::db)?;
    Ok(removed)
}

/// All schools with their students, ordered by id.
pub async fn list_schools(db: &DatabaseConnection) -> Result<Vec<SchoolWithStudents>, ServiceError> {
    let schools = school::Entity::find()
        .order_by_asc(school::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    attach_students(db, schools).await
}

/// One school with its students.
pub async fn get_school(db: &DatabaseConnection, id: i32) -> Result<SchoolWithStudents, ServiceError> {
    let school = school::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("School"))?;
    let students = school
        .find_related(student::Entity)
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(SchoolWithStudents { school, students })
}

/// Schools whose name contains `query`, ignoring case. An empty result is not an error.
pub async fn search_schools(
    db: &DatabaseConnection,
    query: Option<&str>,
) -> Result<Vec<SchoolWithStudents>, ServiceError> {
    let query = search::normalize_query(query)?;
    let schools = school::Entity::find()
        .filter(search::contains_ci(school::Column::Name, &query))
        .order_by_asc(school::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    info!(%query, hits = schools.len(), "school search");
    attach_students(db, schools).await
}

/// Load students for many schools with a single query.
async fn attach_students(
    db: &DatabaseConnection,
    schools: Vec<school::Model>,
) -> Result<Vec<SchoolWithStudents>, ServiceError> {
    if schools.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = schools.iter().map(|s| s.id).collect();
    let mut by_school: HashMap<i32, Vec<student::Model>> = HashMap::new();
    for s in student::Entity::find()
        .filter(student::Column::SchoolId.is_in(ids))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?
    {
        by_school.entry(s.school_id).or_default().push(s);
    }
    Ok(schools
        .into_iter()
        .map(|school| {
            let students = by_school.remove(&school.id).unwrap_or_default();
            SchoolWithStudents { school, students }
        })
        .collect())
}
