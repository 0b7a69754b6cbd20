use std::error;
use std::fmt;

use crate::types::Id;
use crate::{db, validate};

/// An error that can occur when working with the ledger.
#[derive(Debug)]
pub struct Error {
	kind: ErrorKind,
}

impl Error {
	pub fn new(kind: ErrorKind) -> Error {
		Error { kind }
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

/// The kind of an error that can occur.
#[derive(Debug)]
pub enum ErrorKind {
	Database(db::Error),
	Validation(validate::Error),
	/// An account is not denominated in the currency an operation requires
	CurrencyMismatch { account_id: Id, ccy_id: Id },
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			ErrorKind::Database(e) => write!(f, "db error: {}", e),
			ErrorKind::Validation(e) => write!(f, "validation error: {}", e),
			ErrorKind::CurrencyMismatch { account_id, ccy_id } => write!(
				f,
				"account {} is not denominated in currency {}",
				account_id, ccy_id
			),
		}
	}
}

impl error::Error for Error {}

impl From<db::Error> for Error {
	fn from(e: db::Error) -> Self {
		Error::new(ErrorKind::Database(e))
	}
}

impl From<validate::Error> for Error {
	fn from(e: validate::Error) -> Self {
		Error::new(ErrorKind::Validation(e))
	}
}

impl From<r2d2::Error> for Error {
	fn from(e: r2d2::Error) -> Self {
		Error::new(ErrorKind::Database(db::Error::from(e)))
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		Error::new(ErrorKind::Database(db::Error::from(e)))
	}
}
