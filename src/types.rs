use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub type Id = i32;
pub type Time = DateTime<Utc>;
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Creation and update times carried by every row.
///
/// Embedded by value in each entity; both fields are set from a clock read at
/// insert time, and `updated_at` is refreshed by every update statement.
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct Stamps {
	pub created_at: Time,
	pub updated_at: Time,
}
