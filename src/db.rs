use std::{env, fmt};

use diesel::r2d2::ConnectionManager;
use diesel::result::DatabaseErrorKind::{ForeignKeyViolation, UniqueViolation};
use diesel::result::Error::{DatabaseError, NotFound};
use diesel::PgConnection;
use dotenv::dotenv;

pub type Result<T> = std::result::Result<T, Error>;
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Get a pooled connection to the underlying PostgreSQL database
///
/// `DATABASE_URL` must be set in the environment
/// Loads `.env` file in the environment's directory
pub fn pg_connection() -> PgPool {
	dotenv().ok();
	let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

	let manager = ConnectionManager::<PgConnection>::new(&database_url);
	r2d2::Pool::builder()
		.build(manager)
		.expect("Failed to create pool.")
}

/// Error that can occur when querying against the database
#[derive(Debug)]
pub enum Error {
	/// A unique constraint rejected the write
	RecordAlreadyExists,
	RecordNotFound,
	/// A foreign key points at a row that does not exist
	MissingReference,
	Connection(String),
	/// Catch-all for everything diesel reports that we don't classify
	Other(diesel::result::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::RecordAlreadyExists => write!(f, "record violates a unique constraint"),
			Error::RecordNotFound => write!(f, "record does not exist"),
			Error::MissingReference => write!(f, "record references a row that does not exist"),
			Error::Connection(e) => write!(f, "opening database connection: {}", e),
			Error::Other(e) => write!(f, "database error: {:?}", e),
		}
	}
}

impl From<diesel::result::Error> for Error {
	fn from(e: diesel::result::Error) -> Self {
		match e {
			DatabaseError(UniqueViolation, _) => Error::RecordAlreadyExists,
			DatabaseError(ForeignKeyViolation, _) => Error::MissingReference,
			NotFound => Error::RecordNotFound,

			_ => Error::Other(e),
		}
	}
}

impl From<r2d2::Error> for Error {
	fn from(e: r2d2::Error) -> Self {
		Error::Connection(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use crate::db::pg_connection;

	#[test]
	#[ignore = "requires a running PostgreSQL and DATABASE_URL"]
	fn connection() {
		let pool = pg_connection();
		pool.get().expect("get a db connection");
	}
}
