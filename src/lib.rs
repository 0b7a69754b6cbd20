pub mod account;
pub mod currency;
pub mod db;
pub mod error;
pub mod ledger;
pub mod project;
pub mod schema;
pub mod stripe;
pub mod transaction;
pub mod types;
pub mod user;
pub mod validate;

pub use account::{Account, NewAccount};
pub use currency::{Currency, NewCurrency};
pub use db::{pg_connection, PgPool};
pub use error::{Error, ErrorKind};
pub use ledger::{
	Clock, NewDonation, NewSubscription, NewTransfer, Progress, Service, SystemClock,
};
pub use project::{NewProject, Project};
pub use stripe::{
	NewStripeDonation, NewStripePlan, NewStripeSubscription, PlanInterval, StripeDonation,
	StripePlan, StripeSubscription,
};
pub use transaction::{NewTransaction, Transaction};
pub use types::{Id, Result, Stamps, Time};
pub use user::{NewUser, User, UserKey};
