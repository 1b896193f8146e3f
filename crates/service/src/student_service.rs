use sea_orm::{
    sea_query::Expr, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{info, instrument, warn};

use models::{school, student};

use crate::errors::ServiceError;
use crate::search;

/// Input for [`create_student`]; every field already present.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school_id: i32,
}

/// Enrol a student.
///
/// Checks run in this order: field validation, school exists, school has a
/// free seat, id is unused. Claim, count and insert share one transaction that
/// holds the write lock from its first statement, so concurrent enrolments
/// queue instead of pushing a school past its capacity.
#[instrument(skip(db, input), fields(student_id = %input.id, school_id = input.school_id))]
pub async fn create_student(
    db: &DatabaseConnection,
    input: NewStudent,
) -> Result<student::Model, ServiceError> {
    student::validate_id(&input.id)?;
    student::validate_name("first_name", &input.first_name)?;
    student::validate_name("last_name", &input.last_name)?;

    let txn = db.begin().await.map_err(ServiceError::db)?;
    match enrol(&txn, &input).await {
        Ok(created) => {
            txn.commit().await.map_err(ServiceError::db)?;
            info!("student created");
            Ok(created)
        }
        Err(e) => {
            txn.rollback().await.map_err(ServiceError::db)?;
            warn!(error = %e, "student rejected");
            Err(e)
        }
    }
}

async fn enrol(txn: &DatabaseTransaction, input: &NewStudent) -> Result<student::Model, ServiceError> {
    // no-op write: SQLite's write lock, or the row lock on PostgreSQL, before the count
    let claimed = school::Entity::update_many()
        .col_expr(school::Column::Capacity, Expr::col(school::Column::Capacity).into())
        .filter(school::Column::Id.eq(input.school_id))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?;
    if claimed.rows_affected == 0 {
        return Err(ServiceError::not_found("School"));
    }

    let school = school::Entity::find_by_id(input.school_id)
        .one(txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("School"))?;

    let enrolled = student::Entity::find()
        .filter(student::Column::SchoolId.eq(school.id))
        .count(txn)
        .await
        .map_err(ServiceError::db)?;
    if school.remaining_capacity(enrolled) == 0 {
        return Err(ServiceError::Capacity("School is at maximum capacity".into()));
    }

    let taken = student::Entity::find_by_id(input.id.clone())
        .one(txn)
        .await
        .map_err(ServiceError::db)?;
    if taken.is_some() {
        return Err(ServiceError::Conflict("Student ID already exists".into()));
    }

    let created = student::create(
        txn,
        &input.id,
        &input.first_name,
        &input.last_name,
        school.id,
    )
    .await?;
    Ok(created)
}

/// Delete a student by id.
pub async fn delete_student(db: &DatabaseConnection, id: &str) -> Result<(), ServiceError> {
    let res = student::Entity::delete_by_id(id.to_string())
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Student"));
    }
    info!(%id, "student deleted");
    Ok(())
}

/// All students, flat, ordered by id.
pub async fn list_students(db: &DatabaseConnection) -> Result<Vec<student::Model>, ServiceError> {
    student::Entity::find()
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

pub async fn get_student(db: &DatabaseConnection, id: &str) -> Result<student::Model, ServiceError> {
    student::Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("Student"))
}

/// Students whose first OR last name contains `query`, ignoring case.
pub async fn search_students(
    db: &DatabaseConnection,
    query: Option<&str>,
) -> Result<Vec<student::Model>, ServiceError> {
    let query = search::normalize_query(query)?;
    let hits = student::Entity::find()
        .filter(
            Condition::any()
                .add(search::contains_ci(student::Column::FirstName, &query))
                .add(search::contains_ci(student::Column::LastName, &query)),
        )
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    info!(%query, hits = hits.len(), "student search");
    Ok(hits)
}

/// `full_name` as computed by the store through [`student::full_name_expr`].
pub async fn full_name_in_store(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<String>, ServiceError> {
    student::Entity::find_by_id(id.to_string())
        .select_only()
        .column_as(student::full_name_expr(), "full_name")
        .into_tuple::<String>()
        .one(db)
        .await
        .map_err(ServiceError::db)
}
