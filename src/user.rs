use chrono::Utc;
use diesel::prelude::*;

use crate::db::PgPool;
use crate::schema::users;
use crate::types::{Id, Result, Stamps, Time};
use crate::validate;

/// Someone internal to the organization who records and approves transfers.
///
/// Donors are not users; they only ever appear as payer accounts. Users are
/// the treasurers and reviewers a transaction is attributed to.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
	pub id: Id,
	/// Name internal to the system
	pub username: String,
	/// Slack handle
	pub slack: String,
	pub email: String,
	pub name_first: Option<String>,
	pub name_last: Option<String>,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
	pub username: &'a str,
	pub slack: &'a str,
	pub email: &'a str,
	pub name_first: Option<&'a str>,
	pub name_last: Option<&'a str>,
}

impl NewUser<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("username", self.username)?;
		validate::required("slack", self.slack)?;
		validate::email("email", self.email)
	}
}

/// Key for looking up a user.
pub enum UserKey<'a> {
	Id(Id),
	Username(&'a str),
	Email(&'a str),
}

type AllColumns = (
	users::id,
	users::username,
	users::slack,
	users::email,
	users::name_first,
	users::name_last,
	(users::created_at, users::updated_at),
);

const ALL_COLUMNS: AllColumns = (
	users::id,
	users::username,
	users::slack,
	users::email,
	users::name_first,
	users::name_last,
	(users::created_at, users::updated_at),
);

/// Data store for users
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_user: NewUser) -> Result<User> {
		let conn = &mut self.db.get()?;
		create(conn, &new_user, Utc::now())
	}

	pub fn find(&self, key: UserKey) -> Result<User> {
		let conn = &mut self.db.get()?;
		let found = match key {
			UserKey::Id(id) => users::table.find(id).select(ALL_COLUMNS).first(conn),
			UserKey::Username(username) => users::table
				.filter(users::username.eq(username))
				.select(ALL_COLUMNS)
				.first(conn),
			UserKey::Email(email) => users::table
				.filter(users::email.eq(email))
				.select(ALL_COLUMNS)
				.first(conn),
		};
		found.map_err(Into::into)
	}
}

pub(crate) fn create(conn: &mut PgConnection, new_user: &NewUser, now: Time) -> Result<User> {
	new_user.validate()?;
	diesel::insert_into(users::table)
		.values((new_user, users::created_at.eq(now), users::updated_at.eq(now)))
		.returning(ALL_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::validate::Rule;

	fn new_user<'a>() -> NewUser<'a> {
		NewUser {
			username: "bob",
			slack: "@bob",
			email: "bob@example.com",
			name_first: Some("Bob"),
			name_last: None,
		}
	}

	#[test]
	fn accepts_complete_user() {
		assert!(new_user().validate().is_ok());
	}

	#[test]
	fn rejects_blank_handles() {
		let user = NewUser { username: "", ..new_user() };
		let err = user.validate().unwrap_err();
		assert_eq!(err.field(), "username");
		assert_eq!(err.rule(), &Rule::Required);

		let user = NewUser { slack: " ", ..new_user() };
		assert_eq!(user.validate().unwrap_err().field(), "slack");
	}

	#[test]
	fn rejects_malformed_email() {
		let user = NewUser { email: "bob-at-example", ..new_user() };
		let err = user.validate().unwrap_err();
		assert_eq!(err.field(), "email");
		assert_eq!(err.rule(), &Rule::Email);
	}
}
