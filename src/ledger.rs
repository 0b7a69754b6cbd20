//! Operations that span the ledger: transfers, donations, subscriptions,
//! and the derived account balance.

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::prelude::*;
use log::{debug, info};

use crate::db::PgPool;
use crate::error::{Error, ErrorKind};
use crate::stripe::{
	NewStripeDonation, NewStripePlan, NewStripeSubscription, PlanInterval, StripeDonation,
	StripeSubscription,
};
use crate::transaction::{NewTransaction, Transaction};
use crate::types::{Id, Result, Time};
use crate::{account, currency, project, stripe, transaction, validate};

/// Source of the current time for ledger operations.
pub trait Clock {
	fn now(&self) -> Time {
		Utc::now()
	}
}

/// Clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {}

/// Parameters for moving an amount between two existing accounts.
pub struct NewTransfer<'a> {
	/// Amount in minor units
	pub amount: &'a BigDecimal,
	pub payer_id: Id,
	pub recvr_id: Id,
	pub requestor_id: Id,
	pub approver_id: Id,
}

/// Parameters for recording a one-time donation charged by the provider.
pub struct NewDonation<'a> {
	/// The donor's email; doubles as the name of the donor's account
	pub email: &'a str,
	/// Name of the project receiving the donation
	pub project: &'a str,
	pub ccy_code: &'a str,
	/// Amount in major units ("25.00"), converted to minor units here
	pub amount: &'a BigDecimal,
	pub anonymous: bool,
	pub card: &'a str,
	pub stripe_id: &'a str,
	pub token: &'a str,
	/// Internal user tied to the donation, when one is known
	pub user_id: Option<Id>,
	pub requestor_id: Id,
	pub approver_id: Id,
}

/// Parameters for a recurring donation.
pub struct NewSubscription<'a> {
	pub project: &'a str,
	pub ccy_code: &'a str,
	/// Amount in major units charged per interval
	pub amount: &'a BigDecimal,
	pub interval: PlanInterval,
	pub user_id: Option<Id>,
}

/// Funding progress of a project, derived on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
	/// Current balance of the project's account, in minor units
	pub balance: BigDecimal,
	pub goal: BigDecimal,
	/// Percent of the goal reached, `None` when no goal is set
	pub percent: Option<BigDecimal>,
}

/// Service for operating on the ledger as a whole.
pub struct Service<'a> {
	db: PgPool,
	clock: &'a dyn Clock,
}

impl<'a> Service<'a> {
	pub fn new(db: PgPool, clock: &'a dyn Clock) -> Self {
		Service { db, clock }
	}

	/// Balance of an account as of a point in time (default: now).
	///
	/// The balance is the sum of amounts credited to the account minus the
	/// sum of amounts debited from it, over all transactions dated up to and
	/// including `as_of`. An account with no transactions has balance zero.
	/// Both sums run in one repeatable-read transaction so a concurrent
	/// commit cannot land between them.
	pub fn balance(&self, account_id: Id, as_of: Option<Time>) -> Result<BigDecimal> {
		let as_of = as_of.unwrap_or_else(|| self.clock.now());
		let conn = &mut self.db.get()?;
		conn.build_transaction()
			.repeatable_read()
			.run::<_, Error, _>(|conn| {
				account::find(conn, account_id)?;
				let received = transaction::sum_received(conn, account_id, as_of)?;
				let paid = transaction::sum_paid(conn, account_id, as_of)?;
				Ok(received - paid)
			})
	}

	/// Record a movement between two accounts.
	///
	/// Both accounts must exist and share a currency; the transaction is
	/// denominated in it. Same-account transfers and non-positive amounts
	/// are rejected before anything is written.
	pub fn transfer(&self, transfer: NewTransfer) -> Result<Transaction> {
		let now = self.clock.now();
		let conn = &mut self.db.get()?;
		conn.transaction::<Transaction, Error, _>(|conn| {
			let payer = account::find(conn, transfer.payer_id)?;
			let recvr = account::find(conn, transfer.recvr_id)?;
			if payer.ccy_id != recvr.ccy_id {
				return Err(Error::new(ErrorKind::CurrencyMismatch {
					account_id: recvr.id,
					ccy_id: payer.ccy_id,
				}));
			}

			let tx = transaction::create(
				conn,
				&NewTransaction {
					amount: transfer.amount,
					ccy_id: payer.ccy_id,
					datetime: now,
					payer_id: transfer.payer_id,
					recvr_id: transfer.recvr_id,
					requestor_id: transfer.requestor_id,
					approver_id: transfer.approver_id,
				},
				now,
			)?;
			debug!(
				"transferred {} from account {} to account {}",
				tx.amount, tx.payer_id, tx.recvr_id
			);
			Ok(tx)
		})
	}

	/// Record a one-time donation to a project.
	///
	/// The donor's account is looked up by email and created in the donation
	/// currency if it is their first donation. The project's account must be
	/// denominated in the donation currency. The transaction and the
	/// provider record are written atomically.
	pub fn donate(&self, donation: NewDonation) -> Result<(Transaction, StripeDonation)> {
		validate::email("email", donation.email)?;
		validate::positive("amount", donation.amount)?;
		let amount = currency::to_minor_units(donation.amount);
		let now = self.clock.now();

		debug!(
			"processing donation of {} {} to project {}",
			amount, donation.ccy_code, donation.project
		);

		let conn = &mut self.db.get()?;
		conn.transaction::<(Transaction, StripeDonation), Error, _>(|conn| {
			let ccy = currency::find_by_code(conn, donation.ccy_code)?;
			let project = project::find_by_name(conn, donation.project)?;
			let project_acct = account::find(conn, project.account_id)?;
			if project_acct.ccy_id != ccy.id {
				return Err(Error::new(ErrorKind::CurrencyMismatch {
					account_id: project_acct.id,
					ccy_id: ccy.id,
				}));
			}

			let donor_acct = account::find_or_create(conn, donation.email, ccy.id, now)?;

			let tx = transaction::create(
				conn,
				&NewTransaction {
					amount: &amount,
					ccy_id: ccy.id,
					datetime: now,
					payer_id: donor_acct.id,
					recvr_id: project_acct.id,
					requestor_id: donation.requestor_id,
					approver_id: donation.approver_id,
				},
				now,
			)?;

			let record = stripe::create_donation(
				conn,
				&NewStripeDonation {
					anonymous: donation.anonymous,
					card: donation.card,
					stripe_id: donation.stripe_id,
					token: donation.token,
					user_id: donation.user_id,
					tx_id: tx.id,
				},
				now,
			)?;

			info!(
				"donation {} of {} {} credited to project {}",
				record.id, tx.amount, donation.ccy_code, project.name
			);
			Ok((tx, record))
		})
	}

	/// Record a recurring donation to a project.
	///
	/// Reuses the plan for this amount and interval when one exists, creating
	/// it otherwise. The subscription starts with no transaction; charges are
	/// recorded as the provider reports them.
	pub fn subscribe(&self, subscription: NewSubscription) -> Result<StripeSubscription> {
		validate::positive("amount", subscription.amount)?;
		let amount = currency::to_minor_units(subscription.amount);
		let now = self.clock.now();

		let conn = &mut self.db.get()?;
		conn.transaction::<StripeSubscription, Error, _>(|conn| {
			let ccy = currency::find_by_code(conn, subscription.ccy_code)?;
			let project = project::find_by_name(conn, subscription.project)?;
			let acct = account::find(conn, project.account_id)?;
			if acct.ccy_id != ccy.id {
				return Err(Error::new(ErrorKind::CurrencyMismatch {
					account_id: acct.id,
					ccy_id: ccy.id,
				}));
			}

			let name = format!("{} / {}", amount, subscription.interval);
			let plan = stripe::find_or_create_plan(
				conn,
				&NewStripePlan {
					ccy_id: ccy.id,
					acct_id: acct.id,
					name: &name,
					amount: &amount,
					interval: subscription.interval,
					description: &format!("{}/{}", amount, subscription.interval),
				},
				now,
			)?;

			let record = stripe::create_subscription(
				conn,
				&NewStripeSubscription {
					stripe_plan_id: plan.id,
					user_id: subscription.user_id,
					tx_id: None,
				},
				now,
			)?;
			info!("subscription {} added to plan {}", record.id, plan.name);
			Ok(record)
		})
	}

	/// A project's goal and how far its account balance has come toward it.
	pub fn project_progress(&self, name: &str) -> Result<Progress> {
		let project = {
			let conn = &mut self.db.get()?;
			project::find_by_name(conn, name)?
		};
		let balance = self.balance(project.account_id, None)?;
		let percent = percent_of(&balance, &project.goal);
		Ok(Progress { balance, goal: project.goal, percent })
	}
}

/// Percent of `goal` covered by `balance`, at two decimal places.
fn percent_of(balance: &BigDecimal, goal: &BigDecimal) -> Option<BigDecimal> {
	if goal.is_zero() {
		return None;
	}
	Some((balance * BigDecimal::from(100) / goal).with_scale(2))
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn percent_of_goal() {
		let balance = BigDecimal::from(120);
		let goal = BigDecimal::from(500);
		assert_eq!(
			percent_of(&balance, &goal),
			Some(BigDecimal::from_str("24.00").unwrap())
		);
	}

	#[test]
	fn percent_can_exceed_one_hundred() {
		let balance = BigDecimal::from(750);
		let goal = BigDecimal::from(500);
		assert_eq!(
			percent_of(&balance, &goal),
			Some(BigDecimal::from_str("150.00").unwrap())
		);
	}

	#[test]
	fn no_percent_without_a_goal() {
		let balance = BigDecimal::from(120);
		assert_eq!(percent_of(&balance, &BigDecimal::zero()), None);
	}
}
