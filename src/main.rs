use std::env;

use log::*;
use warp::filters::log::Info;
use warp::Filter;

#[tokio::main]
async fn main() {
	if env::var_os("RUST_LOG").is_none() {
		env::set_var("RUST_LOG", "donate_api=debug");
	}
	pretty_env_logger::init();

	let log = warp::log::custom(|info: Info| {
		info!(
			target: "donate::api",
			"\"{} {} {:?}\" \t{} {} {:?}",
			info.method(),
			info.path(),
			info.version(),
			info.status().canonical_reason().unwrap_or_else(|| "-"),
			info.status().as_u16(),
			info.elapsed(),
		);
	});
	let health = warp::path("health").map(|| "ok");
	warp::serve(health.with(log)).run(([127, 0, 0, 1], 3030)).await;
}
