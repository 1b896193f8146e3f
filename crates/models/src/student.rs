use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, SimpleExpr},
    ConnectionTrait, Set,
};
use serde::{Deserialize, Serialize};

use crate::{errors, school};

pub const ID_MAX_LEN: usize = 9;
pub const NAME_MAX_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    School,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::School => Entity::belongs_to(school::Entity)
                .from(Column::SchoolId)
                .to(school::Column::Id)
                .into(),
        }
    }
}

impl Related<school::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Full name is `first_name + " " + last_name`.
///
/// It is evaluated in two places that must agree: [`Model::full_name`] on a
/// loaded row, and [`full_name_expr`] inside SQL. Both use a single ASCII space
/// and no trimming.
impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Store-side `full_name`. `||` concatenation works on SQLite and PostgreSQL.
pub fn full_name_expr() -> SimpleExpr {
    Expr::cust_with_exprs(
        "$1 || ' ' || $2",
        [
            Expr::col((Entity, Column::FirstName)).into(),
            Expr::col((Entity, Column::LastName)).into(),
        ],
    )
}

pub fn validate_id(id: &str) -> Result<(), errors::ModelError> {
    if id.trim().is_empty() {
        return Err(errors::ModelError::Validation("Student id must not be empty".into()));
    }
    if id.chars().count() > ID_MAX_LEN {
        return Err(errors::ModelError::Validation(format!(
            "Student id must be at most {ID_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), errors::ModelError> {
    if value.trim().is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!(
            "{field} must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Insert a student. A taken id yields `Conflict`. Capacity is the caller's concern.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    id: &str,
    first_name: &str,
    last_name: &str,
    school_id: i32,
) -> Result<Model, errors::ModelError> {
    validate_id(id)?;
    validate_name("first_name", first_name)?;
    validate_name("last_name", last_name)?;
    let am = ActiveModel {
        id: Set(id.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        school_id: Set(school_id),
    };
    am.insert(db)
        .await
        .map_err(|e| errors::ModelError::from_insert(e, "Student ID already exists"))
}
