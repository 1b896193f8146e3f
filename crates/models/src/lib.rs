//! SeaORM entities for schools and students, their field validators and the
//! database connection helpers shared by the service and server crates.

pub mod errors;
pub mod db;
pub mod school;
pub mod student;

#[cfg(test)]
mod tests;
