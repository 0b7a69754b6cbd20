use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Utc;
use diesel::prelude::*;

use crate::db::PgPool;
use crate::schema::currencies;
use crate::types::{Id, Result, Stamps, Time};
use crate::validate;

/// Length every currency code must have, ISO 4217 style
pub const CODE_LEN: usize = 3;

/// Decimal places of the minor unit; two for every supported currency
const MINOR_UNIT_SCALE: i64 = 2;

/// Unit of account for amounts, e.g. USD or BTC.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = currencies)]
pub struct Currency {
	pub id: Id,
	pub name: String,
	pub code: String,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = currencies)]
pub struct NewCurrency<'a> {
	pub name: &'a str,
	pub code: &'a str,
}

impl NewCurrency<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("name", self.name)?;
		validate::required("code", self.code)?;
		validate::length("code", self.code, CODE_LEN)
	}
}

type AllColumns = (
	currencies::id,
	currencies::name,
	currencies::code,
	(currencies::created_at, currencies::updated_at),
);

const ALL_COLUMNS: AllColumns = (
	currencies::id,
	currencies::name,
	currencies::code,
	(currencies::created_at, currencies::updated_at),
);

/// Convert a major-unit amount ("12.34") to whole minor units (1234).
///
/// Rounds half-to-even at the minor unit, so everything stored in the ledger
/// is an exact integer count of cents.
pub fn to_minor_units(amount: &BigDecimal) -> BigDecimal {
	(amount.with_scale_round(MINOR_UNIT_SCALE, RoundingMode::HalfEven) * BigDecimal::from(100))
		.with_scale(0)
}

/// Data store for currencies
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_currency: NewCurrency) -> Result<Currency> {
		let conn = &mut self.db.get()?;
		create(conn, &new_currency, Utc::now())
	}

	pub fn find_by_code(&self, code: &str) -> Result<Currency> {
		let conn = &mut self.db.get()?;
		find_by_code(conn, code)
	}
}

pub(crate) fn create(
	conn: &mut PgConnection,
	new_currency: &NewCurrency,
	now: Time,
) -> Result<Currency> {
	new_currency.validate()?;
	diesel::insert_into(currencies::table)
		.values((
			new_currency,
			currencies::created_at.eq(now),
			currencies::updated_at.eq(now),
		))
		.returning(ALL_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

pub(crate) fn find_by_code(conn: &mut PgConnection, code: &str) -> Result<Currency> {
	currencies::table
		.filter(currencies::code.eq(code))
		.select(ALL_COLUMNS)
		.first(conn)
		.map_err(Into::into)
}
