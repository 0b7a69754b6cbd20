use chrono::Utc;
use diesel::prelude::*;

use crate::db::PgPool;
use crate::error::{Error, ErrorKind};
use crate::schema::accounts;
use crate::types::{Id, Result, Stamps, Time};
use crate::validate;

/// A named bucket of value denominated in exactly one currency.
///
/// An account stores no balance; its balance is derived from the
/// transactions that credit and debit it.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = accounts)]
pub struct Account {
	pub id: Id,
	pub name: String,
	pub ccy_id: Id,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount<'a> {
	pub name: &'a str,
	pub ccy_id: Id,
}

impl NewAccount<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("name", self.name)
	}
}

type AllColumns = (
	accounts::id,
	accounts::name,
	accounts::ccy_id,
	(accounts::created_at, accounts::updated_at),
);

const ALL_COLUMNS: AllColumns = (
	accounts::id,
	accounts::name,
	accounts::ccy_id,
	(accounts::created_at, accounts::updated_at),
);

/// Data store for accounts
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_account: NewAccount) -> Result<Account> {
		let conn = &mut self.db.get()?;
		create(conn, &new_account, Utc::now())
	}

	pub fn find_by_id(&self, id: Id) -> Result<Account> {
		let conn = &mut self.db.get()?;
		find(conn, id)
	}

	pub fn find_by_name(&self, name: &str) -> Result<Account> {
		let conn = &mut self.db.get()?;
		accounts::table
			.filter(accounts::name.eq(name))
			.select(ALL_COLUMNS)
			.first(conn)
			.map_err(Into::into)
	}

	/// Look up an account by name, creating it in the given currency when it
	/// does not exist yet. An existing account denominated differently is a
	/// currency mismatch, not a match.
	pub fn find_or_create(&self, name: &str, ccy_id: Id) -> Result<Account> {
		let conn = &mut self.db.get()?;
		find_or_create(conn, name, ccy_id, Utc::now())
	}
}

pub(crate) fn create(conn: &mut PgConnection, new_account: &NewAccount, now: Time) -> Result<Account> {
	new_account.validate()?;
	diesel::insert_into(accounts::table)
		.values((
			new_account,
			accounts::created_at.eq(now),
			accounts::updated_at.eq(now),
		))
		.returning(ALL_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

pub(crate) fn find(conn: &mut PgConnection, id: Id) -> Result<Account> {
	accounts::table
		.find(id)
		.select(ALL_COLUMNS)
		.first(conn)
		.map_err(Into::into)
}

pub(crate) fn find_or_create(
	conn: &mut PgConnection,
	name: &str,
	ccy_id: Id,
	now: Time,
) -> Result<Account> {
	match accounts::table
		.filter(accounts::name.eq(name))
		.select(ALL_COLUMNS)
		.first::<Account>(conn)
	{
		Ok(account) if account.ccy_id != ccy_id => Err(Error::new(ErrorKind::CurrencyMismatch {
			account_id: account.id,
			ccy_id,
		})),
		Ok(account) => Ok(account),
		Err(diesel::result::Error::NotFound) => create(conn, &NewAccount { name, ccy_id }, now),
		Err(e) => Err(e.into()),
	}
}
