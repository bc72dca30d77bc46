#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
// self
#[cfg(feature = "reqwest")]
use carrier_rates::{
	config::CarrierConfig,
	http::ReqwestTransport,
	reqwest::{Client as ReqwestClient, redirect::Policy},
};
use carrier_rates::{
	domain::{Address, Dimensions, Package, RateRequest},
	error::{ErrorKind, IntegrationError, Result},
	http::{CarrierTransport, SUBMIT_RATE_REQUEST, TokenGrant, TransportFuture},
	wire::{self, WireRateRequest, WireRateResponse},
};

pub const TWO_QUOTES: &str = r#"{"RateResponse":{"RatedShipment":[
	{
		"Service":{"Code":"03","Name":"UPS Ground"},
		"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"24.50"},
		"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":"5"}}}
	},
	{
		"Service":{"Code":"02","Name":"UPS 2nd Day Air"},
		"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"42.00"},
		"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":"2"}}}
	}
]}}"#;

/// Fake transport that replays scripted grants and submissions and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
	grants: Mutex<VecDeque<Result<TokenGrant>>>,
	submissions: Mutex<VecDeque<Result<WireRateResponse>>>,
	token_calls: AtomicUsize,
	submit_calls: AtomicUsize,
	seen_tokens: Mutex<Vec<String>>,
	seen_requests: Mutex<Vec<WireRateRequest>>,
}
impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn grant(self, access_token: &str) -> Self {
		self.grants.lock().push_back(Ok(TokenGrant::bearer(access_token, Some(3_600))));

		self
	}

	pub fn grant_error(self, err: IntegrationError) -> Self {
		self.grants.lock().push_back(Err(err));

		self
	}

	pub fn respond(self, body: &str) -> Self {
		let response = wire::decode_response(body.as_bytes()).expect("Scripted body should decode.");

		self.submissions.lock().push_back(Ok(response));

		self
	}

	pub fn fail(self, err: IntegrationError) -> Self {
		self.submissions.lock().push_back(Err(err));

		self
	}

	pub fn shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	pub fn submit_calls(&self) -> usize {
		self.submit_calls.load(Ordering::SeqCst)
	}

	pub fn network_calls(&self) -> usize {
		self.token_calls() + self.submit_calls()
	}

	pub fn seen_tokens(&self) -> Vec<String> {
		self.seen_tokens.lock().clone()
	}

	pub fn seen_requests(&self) -> Vec<WireRateRequest> {
		self.seen_requests.lock().clone()
	}
}
impl CarrierTransport for ScriptedTransport {
	fn acquire_token(&self) -> TransportFuture<'_, TokenGrant> {
		self.token_calls.fetch_add(1, Ordering::SeqCst);

		let next = self
			.grants
			.lock()
			.pop_front()
			.unwrap_or_else(|| Err(IntegrationError::new(ErrorKind::Unknown, "no grant scripted")));

		Box::pin(async move { next })
	}

	fn submit_rate_request<'a>(
		&'a self,
		access_token: &'a str,
		request: &'a WireRateRequest,
	) -> TransportFuture<'a, WireRateResponse> {
		self.submit_calls.fetch_add(1, Ordering::SeqCst);
		self.seen_tokens.lock().push(access_token.to_owned());
		self.seen_requests.lock().push(request.clone());

		let next = self.submissions.lock().pop_front().unwrap_or_else(|| {
			Err(IntegrationError::new(ErrorKind::Unknown, "no submission scripted"))
		});

		Box::pin(async move { next })
	}
}

/// Real transport that trusts the mock server's self-signed certificate.
#[cfg(feature = "reqwest")]
pub fn insecure_transport(config: &CarrierConfig) -> ReqwestTransport {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(Policy::none())
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestTransport::with_client(config, client)
		.expect("Transport should build for the mock server.")
}

pub fn status_failure(status: u16) -> IntegrationError {
	let message = format!("{SUBMIT_RATE_REQUEST}: HTTP {status}");

	IntegrationError::new(ErrorKind::from_status(status), message).with_status(status)
}

pub fn address(city: &str, state: &str, postal_code: &str) -> Address {
	Address {
		lines: vec!["123 Main St".into()],
		city: city.into(),
		state_or_province_code: state.into(),
		postal_code: postal_code.into(),
		country_code: "US".into(),
	}
}

pub fn rate_request() -> RateRequest {
	RateRequest::new(
		address("San Francisco", "CA", "94102"),
		address("New York", "NY", "10001"),
		Package {
			weight_kg: 5.5,
			dimensions: Some(Dimensions { length_cm: 30., width_cm: 20., height_cm: 15. }),
		},
	)
}
