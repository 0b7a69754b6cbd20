//! Field-level checks run before anything is written.
//!
//! Every insertable payload exposes a `validate()` built from these helpers;
//! repos and the ledger service call it before touching the database.
//! Uniqueness and referential integrity stay with the database constraints.

use std::fmt;

use bigdecimal::{BigDecimal, Signed};

pub type Result<T> = std::result::Result<T, Error>;

/// A field value that broke one of the rules below.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
	field: &'static str,
	rule: Rule,
}

impl Error {
	pub fn new(field: &'static str, rule: Rule) -> Error {
		Error { field, rule }
	}

	/// Name of the offending field
	pub fn field(&self) -> &'static str {
		self.field
	}

	pub fn rule(&self) -> &Rule {
		&self.rule
	}
}

/// The rule a field value failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
	Required,
	Email,
	Length(usize),
	Positive,
	NonNegative,
	/// Must not equal the named other field
	Distinct(&'static str),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.rule {
			Rule::Required => write!(f, "{} must not be empty", self.field),
			Rule::Email => write!(f, "{} must be a valid email address", self.field),
			Rule::Length(n) => write!(f, "{} must be exactly {} characters", self.field, n),
			Rule::Positive => write!(f, "{} must be greater than zero", self.field),
			Rule::NonNegative => write!(f, "{} must not be negative", self.field),
			Rule::Distinct(other) => write!(f, "{} must differ from {}", self.field, other),
		}
	}
}

pub fn required(field: &'static str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::new(field, Rule::Required));
	}
	Ok(())
}

/// Plausible address shape: one `@`, something on both sides, a dot inside
/// the domain. Anything stricter belongs to the mail system.
pub fn email(field: &'static str, value: &str) -> Result<()> {
	required(field, value)?;

	let err = || Error::new(field, Rule::Email);
	if value.chars().any(char::is_whitespace) {
		return Err(err());
	}

	let (local, domain) = value.split_once('@').ok_or_else(err)?;
	if local.is_empty() || domain.contains('@') {
		return Err(err());
	}
	match domain.split_once('.') {
		Some((host, rest)) if !host.is_empty() && !rest.is_empty() => Ok(()),
		_ => Err(err()),
	}
}

pub fn length(field: &'static str, value: &str, n: usize) -> Result<()> {
	if value.chars().count() != n {
		return Err(Error::new(field, Rule::Length(n)));
	}
	Ok(())
}

pub fn positive(field: &'static str, amount: &BigDecimal) -> Result<()> {
	if !amount.is_positive() {
		return Err(Error::new(field, Rule::Positive));
	}
	Ok(())
}

pub fn non_negative(field: &'static str, amount: &BigDecimal) -> Result<()> {
	if amount.is_negative() {
		return Err(Error::new(field, Rule::NonNegative));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn required_rejects_blank() {
		assert_eq!(required("name", "treasury"), Ok(()));
		assert_eq!(
			required("name", "  "),
			Err(Error::new("name", Rule::Required))
		);
		assert_eq!(required("name", ""), Err(Error::new("name", Rule::Required)));
	}

	#[test]
	fn email_shape() {
		assert_eq!(email("email", "bob@example.com"), Ok(()));
		assert_eq!(email("email", "bob@mail.example.com"), Ok(()));

		for bad in ["", "bob", "@example.com", "bob@", "bob@example", "bob @example.com", "bob@@example.com", "bob@."] {
			assert_eq!(
				email("email", bad).unwrap_err().rule(),
				if bad.trim().is_empty() { &Rule::Required } else { &Rule::Email },
				"{:?} should be rejected",
				bad
			);
		}
	}

	#[test]
	fn length_counts_chars() {
		assert_eq!(length("code", "USD", 3), Ok(()));
		assert_eq!(
			length("code", "US", 3),
			Err(Error::new("code", Rule::Length(3)))
		);
		assert_eq!(
			length("code", "USDT", 3),
			Err(Error::new("code", Rule::Length(3)))
		);
	}

	#[test]
	fn sign_rules() {
		let hundred = BigDecimal::from(100);
		let zero = BigDecimal::from(0);
		let minus = BigDecimal::from_str("-0.01").unwrap();

		assert_eq!(positive("amount", &hundred), Ok(()));
		assert_eq!(
			positive("amount", &zero),
			Err(Error::new("amount", Rule::Positive))
		);
		assert_eq!(
			positive("amount", &minus),
			Err(Error::new("amount", Rule::Positive))
		);

		assert_eq!(non_negative("goal", &zero), Ok(()));
		assert_eq!(
			non_negative("goal", &minus),
			Err(Error::new("goal", Rule::NonNegative))
		);
	}
}
