use diesel::prelude::*;

pub use bigdecimal::BigDecimal;
pub use donate_api::*;

pub struct Fixture {
	pub pool: PgPool,
	pub user_factory: UserFactory,
	pub currency_factory: CurrencyFactory,
	pub account_factory: AccountFactory,
}

impl Fixture {
	pub fn new() -> Self {
		let pool = pg_connection();
		let user_factory = UserFactory::new(pool.clone());
		let currency_factory = CurrencyFactory::new(pool.clone());
		let account_factory = AccountFactory::new(pool.clone());
		Fixture {
			pool,
			user_factory,
			currency_factory,
			account_factory,
		}
	}

	pub fn pool(&self) -> PgPool {
		self.pool.clone()
	}

	pub fn teardown(&self) {
		let tables = vec![
			"stripe_subscriptions",
			"stripe_donations",
			"stripe_plans",
			"projects",
			"transactions",
			"accounts",
			"currencies",
			"users",
		];
		let conn = &mut self.pool.get().unwrap();
		for table in tables {
			diesel::sql_query(format!("DELETE FROM {}", table))
				.execute(conn)
				.expect("deleting db table");
		}
	}
}

pub struct Suite {
	pub user_repo: user::Repo,
	pub currency_repo: currency::Repo,
	pub account_repo: account::Repo,
	pub transaction_repo: transaction::Repo,
	pub project_repo: project::Repo,
	pub stripe_repo: stripe::Repo,
}

impl Suite {
	pub fn setup() -> Self {
		let fixture = Fixture::new();
		fixture.teardown();

		Suite {
			user_repo: user::Repo::new(fixture.pool.clone()),
			currency_repo: currency::Repo::new(fixture.pool.clone()),
			account_repo: account::Repo::new(fixture.pool.clone()),
			transaction_repo: transaction::Repo::new(fixture.pool.clone()),
			project_repo: project::Repo::new(fixture.pool.clone()),
			stripe_repo: stripe::Repo::new(fixture.pool.clone()),
		}
	}
}

pub struct UserFactory {
	pool: PgPool,
}

impl UserFactory {
	fn new(pool: PgPool) -> Self {
		UserFactory { pool }
	}

	pub fn user(&self, new_user: NewUser) -> User {
		user::Repo::new(self.pool.clone()).create(new_user).unwrap()
	}

	pub fn bob(&self) -> User {
		self.user(NewUser {
			username: "bob",
			slack: "@bob",
			email: "bob@example.com",
			name_first: Some("Bob"),
			name_last: Some("Roberts"),
		})
	}

	pub fn lucy(&self) -> User {
		self.user(NewUser {
			username: "lucy",
			slack: "@lucy",
			email: "lucy@example.com",
			name_first: Some("Lucy"),
			name_last: Some("Luke"),
		})
	}
}

pub struct CurrencyFactory {
	pool: PgPool,
}

impl CurrencyFactory {
	fn new(pool: PgPool) -> Self {
		CurrencyFactory { pool }
	}

	pub fn currency(&self, new_currency: NewCurrency) -> Currency {
		currency::Repo::new(self.pool.clone())
			.create(new_currency)
			.unwrap()
	}

	pub fn usd(&self) -> Currency {
		self.currency(NewCurrency { name: "US Dollar", code: "USD" })
	}

	pub fn btc(&self) -> Currency {
		self.currency(NewCurrency { name: "Bitcoin", code: "BTC" })
	}
}

pub struct AccountFactory {
	pool: PgPool,
}

impl AccountFactory {
	pub fn new(pool: PgPool) -> Self {
		AccountFactory { pool }
	}

	pub fn account(&self, name: &str, ccy_id: Id) -> Account {
		account::Repo::new(self.pool.clone())
			.create(NewAccount { name, ccy_id })
			.unwrap()
	}
}
