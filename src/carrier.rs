//! Carrier adapter contract and the transport-backed adapter.

pub mod id;

pub use id::*;

// self
use crate::{
	_prelude::*,
	domain::{RateRequest, RateResponse},
	http::CarrierTransport,
	mapper,
	obs::{self, OperationKind, OperationSpan, Outcome},
	token::{TokenManager, TokenMetrics},
	wire::WireRateResponse,
};

/// Status that makes the adapter discard its token and retry once.
pub const AUTH_RETRY_STATUS: u16 = 401;

/// Boxed future returned by [`RateProvider::get_rates`].
pub type RateFuture<'a> = Pin<Box<dyn Future<Output = Result<RateResponse>> + 'a + Send>>;

/// Common contract shared by every carrier adapter the orchestrator can select.
pub trait RateProvider: Send + Sync {
	/// Stable lowercase identifier of the carrier.
	fn carrier_id(&self) -> &CarrierId;

	/// Prices `request` with this carrier.
	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> RateFuture<'a>;
}

/// End-to-end rating for one carrier: validation, token lifecycle, wire mapping, submission.
///
/// A submission rejected with HTTP 401 invalidates the cached token, acquires a fresh one, and
/// is resubmitted exactly once. No other failure is retried.
pub struct CarrierRateAdapter<T>
where
	T: ?Sized + CarrierTransport,
{
	carrier_id: CarrierId,
	transport: Arc<T>,
	tokens: TokenManager<T>,
}
impl<T> CarrierRateAdapter<T>
where
	T: ?Sized + CarrierTransport,
{
	/// Creates an adapter with its own token cache.
	pub fn new(carrier_id: CarrierId, transport: Arc<T>) -> Self {
		let tokens = TokenManager::new(carrier_id.clone(), Arc::clone(&transport));

		Self { carrier_id, transport, tokens }
	}

	/// Creates the UPS adapter.
	pub fn ups(transport: Arc<T>) -> Self {
		Self::new(CarrierId::ups(), transport)
	}

	/// Serializes token refreshes across concurrent callers.
	pub fn with_single_flight(mut self) -> Self {
		self.tokens = self.tokens.with_single_flight();

		self
	}

	/// Token cache owned by this adapter.
	pub fn tokens(&self) -> &TokenManager<T> {
		&self.tokens
	}

	/// Token cache counters.
	pub fn token_metrics(&self) -> Arc<TokenMetrics> {
		self.tokens.metrics()
	}

	/// Prices `request`, returning quotes tagged with this adapter's identifier.
	pub async fn get_rates(&self, request: &RateRequest) -> Result<RateResponse> {
		obs::record_outcome(OperationKind::GetRates, Outcome::Attempt);

		let span = OperationSpan::new(OperationKind::GetRates, &self.carrier_id);
		let result = span.instrument(self.rate(request)).await;

		obs::observe(OperationKind::GetRates, &result);

		result
	}

	async fn rate(&self, request: &RateRequest) -> Result<RateResponse> {
		request.validate()?;

		let token = self.tokens.get_valid_token().await?;
		let response = match self.submit(token.expose(), request).await {
			Err(err) if err.status() == Some(AUTH_RETRY_STATUS) => {
				self.tokens.invalidate_cache();

				let token = self.tokens.get_valid_token().await?;

				self.submit(token.expose(), request).await?
			},
			outcome => outcome?,
		};
		let quotes = mapper::parse_wire_response(&response)?;

		Ok(RateResponse { carrier_id: self.carrier_id.to_string(), quotes })
	}

	async fn submit(&self, access_token: &str, request: &RateRequest) -> Result<WireRateResponse> {
		let wire = mapper::build_wire_request(request);

		obs::record_outcome(OperationKind::SubmitRate, Outcome::Attempt);

		let span = OperationSpan::new(OperationKind::SubmitRate, &self.carrier_id);
		let result = span.instrument(self.transport.submit_rate_request(access_token, &wire)).await;

		obs::observe(OperationKind::SubmitRate, &result);

		result
	}
}
impl<T> RateProvider for CarrierRateAdapter<T>
where
	T: ?Sized + CarrierTransport,
{
	fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> RateFuture<'a> {
		Box::pin(CarrierRateAdapter::get_rates(self, request))
	}
}
impl<T> Debug for CarrierRateAdapter<T>
where
	T: ?Sized + CarrierTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CarrierRateAdapter")
			.field("carrier_id", &self.carrier_id)
			.field("tokens", &self.tokens)
			.finish()
	}
}
