use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;

use crate::db::PgPool;
use crate::schema::projects;
use crate::types::{Id, Result, Stamps, Time};
use crate::validate;

/// A fundraising goal tied to an account.
///
/// The linked account records what has been donated toward the goal; how far
/// along the project is gets computed from the account balance on demand and
/// is never stored.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = projects)]
pub struct Project {
	pub id: Id,
	pub name: String,
	pub account_id: Id,
	/// Amount required to reach the goal, in minor units
	pub goal: BigDecimal,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject<'a> {
	pub name: &'a str,
	pub account_id: Id,
	pub goal: &'a BigDecimal,
}

impl NewProject<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("name", self.name)?;
		validate::non_negative("goal", self.goal)
	}
}

type AllColumns = (
	projects::id,
	projects::name,
	projects::account_id,
	projects::goal,
	(projects::created_at, projects::updated_at),
);

const ALL_COLUMNS: AllColumns = (
	projects::id,
	projects::name,
	projects::account_id,
	projects::goal,
	(projects::created_at, projects::updated_at),
);

/// Data store for projects
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_project: NewProject) -> Result<Project> {
		let conn = &mut self.db.get()?;
		create(conn, &new_project, Utc::now())
	}

	pub fn find_by_name(&self, name: &str) -> Result<Project> {
		let conn = &mut self.db.get()?;
		find_by_name(conn, name)
	}

	/// All projects, sorted by name
	pub fn list(&self) -> Result<Vec<Project>> {
		let conn = &mut self.db.get()?;
		projects::table
			.order(projects::name.asc())
			.select(ALL_COLUMNS)
			.load(conn)
			.map_err(Into::into)
	}

	pub fn set_goal(&self, id: Id, goal: &BigDecimal) -> Result<Project> {
		validate::non_negative("goal", goal)?;
		let conn = &mut self.db.get()?;
		diesel::update(projects::table.find(id))
			.set((projects::goal.eq(goal), projects::updated_at.eq(Utc::now())))
			.returning(ALL_COLUMNS)
			.get_result(conn)
			.map_err(Into::into)
	}
}

pub(crate) fn create(conn: &mut PgConnection, new_project: &NewProject, now: Time) -> Result<Project> {
	new_project.validate()?;
	diesel::insert_into(projects::table)
		.values((
			new_project,
			projects::created_at.eq(now),
			projects::updated_at.eq(now),
		))
		.returning(ALL_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

pub(crate) fn find_by_name(conn: &mut PgConnection, name: &str) -> Result<Project> {
	projects::table
		.filter(projects::name.eq(name))
		.select(ALL_COLUMNS)
		.first(conn)
		.map_err(Into::into)
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn goal_may_be_zero_but_not_negative() {
		let zero = BigDecimal::from(0);
		assert!(NewProject { name: "Laser Cutter", account_id: 1, goal: &zero }
			.validate()
			.is_ok());

		let negative = BigDecimal::from_str("-1").unwrap();
		let err = NewProject { name: "Laser Cutter", account_id: 1, goal: &negative }
			.validate()
			.unwrap_err();
		assert_eq!(err.field(), "goal");
	}

	#[test]
	fn name_required() {
		let goal = BigDecimal::from(500);
		let err = NewProject { name: "", account_id: 1, goal: &goal }
			.validate()
			.unwrap_err();
		assert_eq!(err.field(), "name");
	}
}
