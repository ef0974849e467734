//! Demonstrates authorizing against a mock AppNexus server and issuing rate-limited requests
//! with the default reqwest transport.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use appnexus_client::{
	client::ReqwestApiClient,
	endpoint::{ADVERTISER_SERVICE, AUTHENTICATION_SERVICE},
	method::Method,
	options::{ClientOptions, RateLimits},
	rate_limit::Category,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let auth_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(AUTHENTICATION_SERVICE);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "response": { "status": "OK", "token": "demo-token" } }));
		})
		.await;
	let advertiser_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(ADVERTISER_SERVICE).header("authorization", "demo-token");
			then.status(200).header("content-type", "application/json").json_body(
				json!({ "response": { "status": "OK", "advertisers": [{ "id": 1, "name": "Acme" }] } }),
			);
		})
		.await;
	let options = ClientOptions::builder()
		.api_base(server.base_url())
		.limits(RateLimits { auth: 2, read: 5, write: 5 })
		.build()?;
	let client = ReqwestApiClient::new(options)?;
	let token = client.authorize("demo-user", "demo-password").await?;

	println!("Authorized; token expires at {}.", token.expires_at());

	for _ in 0..3 {
		let body = client.request(Method::Get, ADVERTISER_SERVICE, json!({})).await?;

		println!(
			"Advertisers: {}. Read permits left: {}.",
			body["response"]["advertisers"],
			client.rate_limiter().remaining(Category::Read)
		);
	}

	auth_mock.assert_async().await;
	advertiser_mock.assert_calls_async(3).await;

	Ok(())
}
