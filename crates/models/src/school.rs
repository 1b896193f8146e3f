use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::{errors, student};

pub const NAME_MAX_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub capacity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Student,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Student => Entity::has_many(student::Entity).into(),
        }
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Seats left given the current enrolment; never negative.
    pub fn remaining_capacity(&self, enrolled: u64) -> u64 {
        u64::try_from(self.capacity).unwrap_or(0).saturating_sub(enrolled)
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("School name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!(
            "School name must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_capacity(capacity: i64) -> Result<i32, errors::ModelError> {
    match i32::try_from(capacity) {
        Ok(c) if c > 0 => Ok(c),
        _ => Err(errors::ModelError::Validation("Capacity must be a positive integer".into())),
    }
}

/// Insert a school. A taken name yields `Conflict`.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    capacity: i64,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let capacity = validate_capacity(capacity)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        capacity: Set(capacity),
        ..Default::default()
    };
    am.insert(db)
        .await
        .map_err(|e| errors::ModelError::from_insert(e, "School name must be unique"))
}
