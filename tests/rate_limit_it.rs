// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use serde_json::{Value, json};
// self
use appnexus_client::{
	auth::{Secret, Token},
	client::Client,
	endpoint::{AUTHENTICATION_SERVICE, CAMPAIGN_SERVICE},
	error::TransportError,
	method::Method,
	options::{ClientOptions, RateLimits},
	rate_limit::Category,
	transport::{Transport, TransportFuture},
};

/// Answers every call immediately and counts how many reached it.
#[derive(Default)]
struct CountingTransport {
	sent: AtomicUsize,
}
impl Transport for CountingTransport {
	fn send<'a>(
		&'a self,
		_method: Method,
		endpoint: &'a str,
		_args: &'a Value,
		_token: Option<&'a Secret>,
	) -> TransportFuture<'a, Value> {
		let n = self.sent.fetch_add(1, Ordering::SeqCst);
		let body = if endpoint == AUTHENTICATION_SERVICE {
			json!({ "response": { "token": format!("token-{n}") } })
		} else {
			json!({ "ok": true })
		};

		Box::pin(async move { Ok::<_, TransportError>(body) })
	}
}

/// Takes far longer than any caller is willing to wait for non-auth calls.
#[derive(Default)]
struct StallingTransport {
	started: AtomicUsize,
}
impl Transport for StallingTransport {
	fn send<'a>(
		&'a self,
		_method: Method,
		_endpoint: &'a str,
		_args: &'a Value,
		_token: Option<&'a Secret>,
	) -> TransportFuture<'a, Value> {
		self.started.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			tokio::time::sleep(Duration::from_secs(600)).await;

			Ok::<_, TransportError>(json!({ "ok": true }))
		})
	}
}

fn build_client(limits: RateLimits) -> (Client<CountingTransport>, Arc<CountingTransport>) {
	let transport = Arc::new(CountingTransport::default());
	let options =
		ClientOptions::builder().limits(limits).build().expect("Client options should build.");

	(Client::<CountingTransport>::with_transport(options, transport.clone()), transport)
}

#[tokio::test(start_paused = true)]
async fn second_authorization_waits_for_auth_window() {
	let (client, transport) = build_client(RateLimits { auth: 1, write: 2, read: 3 });

	client.authorize("trader", "pw").await.expect("First authorization should succeed.");

	let pending =
		tokio::time::timeout(Duration::from_secs(290), client.authorize("trader", "pw")).await;

	assert!(pending.is_err(), "A second auth admission must wait for the bucket to refill.");
	assert_eq!(transport.sent.load(Ordering::SeqCst), 1);

	client.authorize("trader", "pw").await.expect("Authorization should resume after refill.");

	assert_eq!(transport.sent.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn writes_beyond_budget_are_delayed_not_rejected() {
	let (client, transport) = build_client(RateLimits { auth: 1, write: 2, read: 3 });

	client.authorize("trader", "pw").await.expect("Authorization should succeed.");

	let started = tokio::time::Instant::now();

	for _ in 0..3 {
		client
			.request(Method::Put, CAMPAIGN_SERVICE, json!({ "campaign": { "state": "active" } }))
			.await
			.expect("Writes should eventually be admitted.");
	}

	assert!(started.elapsed() >= Duration::from_secs(29));
	assert_eq!(transport.sent.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn categories_are_charged_independently() {
	let (client, _) = build_client(RateLimits { auth: 1, write: 2, read: 3 });
	let limiter = client.rate_limiter();

	assert_eq!(
		limiter
			.acquire(Method::Post, AUTHENTICATION_SERVICE)
			.await
			.expect("Auth admission should succeed.")
			.remaining,
		Some(0)
	);
	assert_eq!(
		limiter.acquire(Method::Post, "").await.expect("Write admission should succeed.").remaining,
		Some(1)
	);
	assert_eq!(
		limiter.acquire(Method::Get, "").await.expect("Read admission should succeed.").remaining,
		Some(2)
	);
	assert_eq!(limiter.remaining(Category::Read), 2);
	assert_eq!(limiter.remaining(Category::Write), 1);
}

#[tokio::test(start_paused = true)]
async fn request_dropped_after_admission_keeps_its_permit_spent() {
	let transport = Arc::new(StallingTransport::default());
	let options = ClientOptions::builder()
		.limits(RateLimits { auth: 1, write: 2, read: 3 })
		.token(Token::issued_now("seeded"))
		.build()
		.expect("Client options should build.");
	let client = Client::<StallingTransport>::with_transport(options, transport.clone());
	let abandoned = tokio::time::timeout(
		Duration::from_secs(1),
		client.request(Method::Post, CAMPAIGN_SERVICE, json!({ "campaign": {} })),
	)
	.await;

	assert!(abandoned.is_err(), "The stalled call should be abandoned by the caller.");
	assert_eq!(transport.started.load(Ordering::SeqCst), 1);
	assert_eq!(client.rate_limiter().remaining(Category::Write), 1);
}

#[tokio::test(start_paused = true)]
async fn request_dropped_while_queued_consumes_nothing() {
	let (client, transport) = build_client(RateLimits { auth: 1, write: 1, read: 3 });

	client.authorize("trader", "pw").await.expect("Authorization should succeed.");
	client
		.request(Method::Put, CAMPAIGN_SERVICE, json!({}))
		.await
		.expect("First write should be admitted.");

	let queued = tokio::time::timeout(
		Duration::from_secs(10),
		client.request(Method::Put, CAMPAIGN_SERVICE, json!({})),
	)
	.await;

	assert!(queued.is_err(), "The second write should still be waiting for a permit.");
	assert_eq!(transport.sent.load(Ordering::SeqCst), 2);

	let started = tokio::time::Instant::now();

	client
		.request(Method::Put, CAMPAIGN_SERVICE, json!({}))
		.await
		.expect("The next write should take the refilled permit.");

	assert!(started.elapsed() <= Duration::from_secs(51));
	assert_eq!(transport.sent.load(Ordering::SeqCst), 3);
	assert_eq!(client.rate_limiter().remaining(Category::Write), 0);
}
