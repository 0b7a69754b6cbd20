//! Write-once records tying external billing identities to the ledger.
//!
//! These rows only attach provider identifiers (card, token, charge, plan) to
//! a user and a transaction for audit purposes; processing the provider's
//! webhooks and API calls happens elsewhere.

use std::io::Write;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Varchar;
use strum_macros::{Display, EnumString};

use crate::db::PgPool;
use crate::schema::{stripe_donations, stripe_plans, stripe_subscriptions};
use crate::types::{Id, Result, Stamps, Time};
use crate::validate;

/// How often a plan charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow, EnumString, Display)]
#[diesel(sql_type = Varchar)]
#[strum(serialize_all = "snake_case")]
pub enum PlanInterval {
	Month,
	Year,
}

impl ToSql<Varchar, Pg> for PlanInterval {
	fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
		out.write_all(self.to_string().as_bytes())?;
		Ok(IsNull::No)
	}
}

impl FromSql<Varchar, Pg> for PlanInterval {
	fn from_sql(value: PgValue<'_>) -> deserialize::Result<Self> {
		let s = std::str::from_utf8(value.as_bytes())?;
		PlanInterval::from_str(s).map_err(|_| format!("invalid plan interval: {}", s).into())
	}
}

/// Details of a repeated charge, e.g. 10000 minor units / month.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = stripe_plans)]
pub struct StripePlan {
	pub id: Id,
	pub ccy_id: Id,
	/// Account the recurring charges flow into
	pub acct_id: Id,
	pub name: String,
	/// Amount charged per interval, in minor units
	pub amount: BigDecimal,
	pub interval: PlanInterval,
	pub description: String,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stripe_plans)]
pub struct NewStripePlan<'a> {
	pub ccy_id: Id,
	pub acct_id: Id,
	pub name: &'a str,
	pub amount: &'a BigDecimal,
	pub interval: PlanInterval,
	pub description: &'a str,
}

impl NewStripePlan<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("name", self.name)?;
		validate::required("description", self.description)?;
		validate::positive("amount", self.amount)
	}
}

/// A donation charged once, linked to the transaction it produced.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = stripe_donations)]
pub struct StripeDonation {
	pub id: Id,
	/// Hide the donor's name in public feeds
	pub anonymous: bool,
	pub card: String,
	pub stripe_id: String,
	pub token: String,
	/// Internal user tied to the donation, when one is known
	pub user_id: Option<Id>,
	pub tx_id: Id,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stripe_donations)]
pub struct NewStripeDonation<'a> {
	pub anonymous: bool,
	pub card: &'a str,
	pub stripe_id: &'a str,
	pub token: &'a str,
	pub user_id: Option<Id>,
	pub tx_id: Id,
}

impl NewStripeDonation<'_> {
	pub fn validate(&self) -> validate::Result<()> {
		validate::required("card", self.card)?;
		validate::required("stripe_id", self.stripe_id)?;
		validate::required("token", self.token)
	}
}

/// A subscription to a plan; its transactions arrive as the provider charges.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = stripe_subscriptions)]
pub struct StripeSubscription {
	pub id: Id,
	pub stripe_plan_id: Id,
	pub user_id: Option<Id>,
	/// First charge recorded against the subscription, once there is one
	pub tx_id: Option<Id>,
	#[diesel(embed)]
	pub stamps: Stamps,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stripe_subscriptions)]
pub struct NewStripeSubscription {
	pub stripe_plan_id: Id,
	pub user_id: Option<Id>,
	pub tx_id: Option<Id>,
}

type PlanColumns = (
	stripe_plans::id,
	stripe_plans::ccy_id,
	stripe_plans::acct_id,
	stripe_plans::name,
	stripe_plans::amount,
	stripe_plans::interval,
	stripe_plans::description,
	(stripe_plans::created_at, stripe_plans::updated_at),
);

const PLAN_COLUMNS: PlanColumns = (
	stripe_plans::id,
	stripe_plans::ccy_id,
	stripe_plans::acct_id,
	stripe_plans::name,
	stripe_plans::amount,
	stripe_plans::interval,
	stripe_plans::description,
	(stripe_plans::created_at, stripe_plans::updated_at),
);

type DonationColumns = (
	stripe_donations::id,
	stripe_donations::anonymous,
	stripe_donations::card,
	stripe_donations::stripe_id,
	stripe_donations::token,
	stripe_donations::user_id,
	stripe_donations::tx_id,
	(stripe_donations::created_at, stripe_donations::updated_at),
);

const DONATION_COLUMNS: DonationColumns = (
	stripe_donations::id,
	stripe_donations::anonymous,
	stripe_donations::card,
	stripe_donations::stripe_id,
	stripe_donations::token,
	stripe_donations::user_id,
	stripe_donations::tx_id,
	(stripe_donations::created_at, stripe_donations::updated_at),
);

type SubscriptionColumns = (
	stripe_subscriptions::id,
	stripe_subscriptions::stripe_plan_id,
	stripe_subscriptions::user_id,
	stripe_subscriptions::tx_id,
	(stripe_subscriptions::created_at, stripe_subscriptions::updated_at),
);

const SUBSCRIPTION_COLUMNS: SubscriptionColumns = (
	stripe_subscriptions::id,
	stripe_subscriptions::stripe_plan_id,
	stripe_subscriptions::user_id,
	stripe_subscriptions::tx_id,
	(stripe_subscriptions::created_at, stripe_subscriptions::updated_at),
);

/// Data store for the provider-linkage records
pub struct Repo {
	db: PgPool,
}

impl Repo {
	pub fn new(db: PgPool) -> Self {
		Repo { db }
	}

	pub fn create_plan(&self, new_plan: NewStripePlan) -> Result<StripePlan> {
		let conn = &mut self.db.get()?;
		create_plan(conn, &new_plan, Utc::now())
	}

	pub fn find_plan_by_name(&self, name: &str) -> Result<StripePlan> {
		let conn = &mut self.db.get()?;
		stripe_plans::table
			.filter(stripe_plans::name.eq(name))
			.select(PLAN_COLUMNS)
			.first(conn)
			.map_err(Into::into)
	}

	pub fn create_donation(&self, new_donation: NewStripeDonation) -> Result<StripeDonation> {
		let conn = &mut self.db.get()?;
		create_donation(conn, &new_donation, Utc::now())
	}

	pub fn find_donation_by_id(&self, id: Id) -> Result<StripeDonation> {
		let conn = &mut self.db.get()?;
		stripe_donations::table
			.find(id)
			.select(DONATION_COLUMNS)
			.first(conn)
			.map_err(Into::into)
	}

	pub fn create_subscription(
		&self,
		new_subscription: NewStripeSubscription,
	) -> Result<StripeSubscription> {
		let conn = &mut self.db.get()?;
		create_subscription(conn, &new_subscription, Utc::now())
	}

	pub fn find_subscription_by_id(&self, id: Id) -> Result<StripeSubscription> {
		let conn = &mut self.db.get()?;
		stripe_subscriptions::table
			.find(id)
			.select(SUBSCRIPTION_COLUMNS)
			.first(conn)
			.map_err(Into::into)
	}
}

pub(crate) fn create_plan(
	conn: &mut PgConnection,
	new_plan: &NewStripePlan,
	now: Time,
) -> Result<StripePlan> {
	new_plan.validate()?;
	diesel::insert_into(stripe_plans::table)
		.values((
			new_plan,
			stripe_plans::created_at.eq(now),
			stripe_plans::updated_at.eq(now),
		))
		.returning(PLAN_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

/// Look a plan up by name, creating it when this is the first subscriber.
pub(crate) fn find_or_create_plan(
	conn: &mut PgConnection,
	new_plan: &NewStripePlan,
	now: Time,
) -> Result<StripePlan> {
	match stripe_plans::table
		.filter(stripe_plans::name.eq(new_plan.name))
		.select(PLAN_COLUMNS)
		.first(conn)
	{
		Ok(plan) => Ok(plan),
		Err(diesel::result::Error::NotFound) => create_plan(conn, new_plan, now),
		Err(e) => Err(e.into()),
	}
}

pub(crate) fn create_donation(
	conn: &mut PgConnection,
	new_donation: &NewStripeDonation,
	now: Time,
) -> Result<StripeDonation> {
	new_donation.validate()?;
	diesel::insert_into(stripe_donations::table)
		.values((
			new_donation,
			stripe_donations::created_at.eq(now),
			stripe_donations::updated_at.eq(now),
		))
		.returning(DONATION_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

pub(crate) fn create_subscription(
	conn: &mut PgConnection,
	new_subscription: &NewStripeSubscription,
	now: Time,
) -> Result<StripeSubscription> {
	diesel::insert_into(stripe_subscriptions::table)
		.values((
			new_subscription,
			stripe_subscriptions::created_at.eq(now),
			stripe_subscriptions::updated_at.eq(now),
		))
		.returning(SUBSCRIPTION_COLUMNS)
		.get_result(conn)
		.map_err(Into::into)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interval_round_trips_through_varchar_form() {
		assert_eq!(PlanInterval::Month.to_string(), "month");
		assert_eq!(PlanInterval::from_str("year").unwrap(), PlanInterval::Year);
		assert!(PlanInterval::from_str("weekly").is_err());
	}

	#[test]
	fn plan_validation() {
		let amount = BigDecimal::from(10000);
		let plan = NewStripePlan {
			ccy_id: 1,
			acct_id: 1,
			name: "10000 / month",
			amount: &amount,
			interval: PlanInterval::Month,
			description: "10000/month",
		};
		assert!(plan.validate().is_ok());

		let zero = BigDecimal::from(0);
		let err = NewStripePlan { amount: &zero, ..plan }.validate().unwrap_err();
		assert_eq!(err.field(), "amount");
	}

	#[test]
	fn donation_requires_provider_identifiers() {
		let donation = NewStripeDonation {
			anonymous: false,
			card: "card_3J2",
			stripe_id: "ch_1J2",
			token: "tok_visa",
			user_id: None,
			tx_id: 1,
		};
		assert!(donation.validate().is_ok());

		let err = NewStripeDonation { token: "", ..donation }.validate().unwrap_err();
		assert_eq!(err.field(), "token");
	}
}
