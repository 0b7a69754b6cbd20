use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::dsl::sum;
use diesel::prelude::*;

use crate::db::PgPool;
use crate::schema::transactions;
use crate::types::{Id, Result, Stamps, Time};
use crate::validate::{self, Rule};

/// An immutable movement of an amount from one account to another.
///
/// When a transaction occurs one account is debited and one is credited;
/// both sides share the transaction's currency. Once written, a transaction
/// is history: there are no update or delete operations.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = transactions)]
pub struct Transaction {
	pub id: Id,
	/// Amount in the currency's minor unit
	pub amount: BigDecimal,
	pub ccy_id: Id,
	/// When the movement happened, which may predate the row itself
	pub datetime: Time,
	/// The account debited
	pub payer_id: Id,
	/// The account credited
	pub recvr_id: Id,
	/// The user who requested the transfer
	pub requestor_id: Id,
	/// The user who approved the transfer
	pub approver_id: Id,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction<'a> {
	pub amount: &'a BigDecimal,
	pub ccy_id: Id,
	pub datetime: Time,
	pub payer_id: Id,
	pub recvr_id: Id,
	pub requestor_id: Id,
	pub approver_id: Id,
}

impl NewTransaction<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::positive("amount", self.amount)?;
		if self.payer_id == self.recvr_id {
			return Err(validate::Error::new("recvr_id", Rule::Distinct("payer_id")));
		}
		Ok(())
	}
}

type AllColumns = (
	transactions::id,
	transactions::amount,
	transactions::ccy_id,
	transactions::datetime,
	transactions::payer_id,
	transactions::recvr_id,
	transactions::requestor_id,
	transactions::approver_id,
	(transactions::created_at, transactions::updated_at),
);

const ALL_COLUMNS: AllColumns = (
	transactions::id,
	transactions::amount,
	transactions::ccy_id,
	transactions::datetime,
	transactions::payer_id,
	transactions::recvr_id,
	transactions::requestor_id,
	transactions::approver_id,
	(transactions::created_at, transactions::updated_at),
);

/// Data store for the transaction history
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
		let conn = &mut self.db.get()?;
		create(conn, &new_transaction, Utc::now())
	}

	pub fn find_by_id(&self, id: Id) -> Result<Transaction> {
		let conn = &mut self.db.get()?;
		transactions::table
			.find(id)
			.select(ALL_COLUMNS)
			.first(conn)
			.map_err(Into::into)
	}

	/// Total credited to the account up to and including `as_of`
	pub fn sum_received(&self, account_id: Id, as_of: Time) -> Result<BigDecimal> {
		let conn = &mut self.db.get()?;
		sum_received(conn, account_id, as_of)
	}

	/// Total debited from the account up to and including `as_of`
	pub fn sum_paid(&self, account_id: Id, as_of: Time) -> Result<BigDecimal> {
		let conn = &mut self.db.get()?;
		sum_paid(conn, account_id, as_of)
	}
}

pub(crate) fn create(
	conn: &mut PgConnection,
	new_transaction: &NewTransaction,
	now: Time,
) -> Result<Transaction> {
	new_transaction.validate()?;
	diesel::insert_into(transactions::table)
		.values((
			new_transaction,
			transactions::created_at.eq(now),
			transactions::updated_at.eq(now),
		))
		.returning(ALL_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

pub(crate) fn sum_received(
	conn: &mut PgConnection,
	account_id: Id,
	as_of: Time,
) -> Result<BigDecimal> {
	let total = transactions::table
		.filter(transactions::recvr_id.eq(account_id))
		.filter(transactions::datetime.le(as_of))
		.select(sum(transactions::amount))
		.get_result::<Option<BigDecimal>>(conn)?;
	Ok(total.unwrap_or_else(BigDecimal::zero))
}

pub(crate) fn sum_paid(conn: &mut PgConnection, account_id: Id, as_of: Time) -> Result<BigDecimal> {
	let total = transactions::table
		.filter(transactions::payer_id.eq(account_id))
		.filter(transactions::datetime.le(as_of))
		.select(sum(transactions::amount))
		.get_result::<Option<BigDecimal>>(conn)?;
	Ok(total.unwrap_or_else(BigDecimal::zero))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn new_transaction(amount: &BigDecimal) -> NewTransaction {
		NewTransaction {
			amount,
			ccy_id: 1,
			datetime: Utc::now(),
			payer_id: 10,
			recvr_id: 20,
			requestor_id: 1,
			approver_id: 2,
		}
	}

	#[test]
	fn accepts_positive_amount_between_distinct_accounts() {
		let amount = BigDecimal::from(2500);
		assert!(new_transaction(&amount).validate().is_ok());
	}

	#[test]
	fn rejects_non_positive_amounts() {
		for amount in [BigDecimal::from(0), BigDecimal::from(-5)] {
			let err = new_transaction(&amount).validate().unwrap_err();
			assert_eq!(err.field(), "amount");
			assert_eq!(err.rule(), &Rule::Positive);
		}
	}

	#[test]
	fn rejects_same_account_on_both_sides() {
		let amount = BigDecimal::from(100);
		let tx = NewTransaction { recvr_id: 10, ..new_transaction(&amount) };
		let err = tx.validate().unwrap_err();
		assert_eq!(err.field(), "recvr_id");
		assert_eq!(err.rule(), &Rule::Distinct("payer_id"));
	}
}
