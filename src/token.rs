//! Per-carrier bearer token cache with proactive refresh.
//!
//! [`TokenManager`] owns a single-slot cache. A cached token is reused while its expiry lies
//! more than [`REFRESH_BUFFER`] in the future; otherwise the manager asks its
//! [`CarrierTransport`] for a new grant. Concurrent callers may race to refresh (the last
//! writer wins) unless [`TokenManager::with_single_flight`] is enabled.

mod metrics;
mod secret;

pub use metrics::{TokenMetrics, TokenMetricsSnapshot};
pub use secret::Secret;

// self
use crate::{
	_prelude::*,
	carrier::CarrierId,
	http::{CarrierTransport, TokenGrant},
	obs::{self, CacheEvent, OperationKind, OperationSpan, Outcome},
};

/// Margin before expiry at which a cached token stops being reused.
pub const REFRESH_BUFFER: Duration = Duration::seconds(60);
/// Lifetime assumed when the carrier omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::seconds(3_600);
/// Message attached to credential failures surfaced by [`TokenManager`].
pub const AUTH_FAILED_MESSAGE: &str = "Carrier authentication failed. Check client credentials.";

/// Cached bearer credential with its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
	access_token: Secret,
	expires_at: OffsetDateTime,
}
impl AuthToken {
	/// Builds a token from a grant received at `issued_at`.
	pub fn from_grant(grant: &TokenGrant, issued_at: OffsetDateTime) -> Self {
		let lifetime = grant
			.expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.map(Duration::seconds)
			.unwrap_or(DEFAULT_TOKEN_LIFETIME);
		let expires_at = issued_at
			.checked_add(lifetime)
			.or_else(|| issued_at.checked_add(DEFAULT_TOKEN_LIFETIME))
			.unwrap_or(issued_at);

		Self { access_token: grant.access_token.clone(), expires_at }
	}

	/// Bearer credential.
	pub fn access_token(&self) -> &Secret {
		&self.access_token
	}

	/// Absolute expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns true while the expiry is more than [`REFRESH_BUFFER`] after `now`.
	pub fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at - now > REFRESH_BUFFER
	}
}
impl Debug for AuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthToken")
			.field("access_token", &self.access_token)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Single-slot token cache for one carrier credential pair.
pub struct TokenManager<T>
where
	T: ?Sized + CarrierTransport,
{
	carrier: CarrierId,
	transport: Arc<T>,
	cached: Mutex<Option<AuthToken>>,
	refresh_guard: Option<AsyncMutex<()>>,
	metrics: Arc<TokenMetrics>,
}
impl<T> TokenManager<T>
where
	T: ?Sized + CarrierTransport,
{
	/// Creates an empty cache backed by `transport`.
	pub fn new(carrier: CarrierId, transport: Arc<T>) -> Self {
		Self {
			carrier,
			transport,
			cached: Mutex::new(None),
			refresh_guard: None,
			metrics: Default::default(),
		}
	}

	/// Serializes refreshes so concurrent callers share one acquisition.
	pub fn with_single_flight(mut self) -> Self {
		self.refresh_guard = Some(AsyncMutex::new(()));

		self
	}

	/// Counters for this cache.
	pub fn metrics(&self) -> Arc<TokenMetrics> {
		Arc::clone(&self.metrics)
	}

	/// Returns a usable access token, acquiring a new one when the cache is empty or stale.
	pub async fn get_valid_token(&self) -> Result<Secret> {
		if let Some(token) = self.fresh_cached() {
			return Ok(token);
		}

		match &self.refresh_guard {
			Some(guard) => {
				let _flight = guard.lock().await;

				if let Some(token) = self.fresh_cached() {
					return Ok(token);
				}

				self.refresh().await
			},
			None => self.refresh().await,
		}
	}

	/// Discards the cached token, if any.
	pub fn invalidate_cache(&self) {
		let evicted = self.cached.lock().take().is_some();

		if evicted {
			obs::log_cache_event(CacheEvent::Invalidated, &self.carrier);
		}

		self.metrics.record_invalidation(evicted);
	}

	/// Snapshot of the cached token, mainly for diagnostics.
	pub fn cached_token(&self) -> Option<AuthToken> {
		self.cached.lock().clone()
	}

	fn fresh_cached(&self) -> Option<Secret> {
		let now = OffsetDateTime::now_utc();
		let token = self
			.cached
			.lock()
			.as_ref()
			.filter(|token| token.is_fresh_at(now))
			.map(|token| token.access_token.clone())?;

		self.metrics.record_cache_hit();
		obs::log_cache_event(CacheEvent::Hit, &self.carrier);

		Some(token)
	}

	async fn refresh(&self) -> Result<Secret> {
		obs::log_cache_event(CacheEvent::Miss, &self.carrier);
		obs::record_outcome(OperationKind::AcquireToken, Outcome::Attempt);

		let span = OperationSpan::new(OperationKind::AcquireToken, &self.carrier);
		let result = span.instrument(self.acquire()).await;

		self.metrics.record_acquisition(result.is_ok());
		obs::observe(OperationKind::AcquireToken, &result);

		result
	}

	async fn acquire(&self) -> Result<Secret> {
		let grant = self.transport.acquire_token().await.map_err(classify_acquire_failure)?;

		if grant.access_token.is_empty() {
			return Err(IntegrationError::new(ErrorKind::AuthFailed, AUTH_FAILED_MESSAGE));
		}

		let token = AuthToken::from_grant(&grant, OffsetDateTime::now_utc());
		let access_token = token.access_token.clone();

		*self.cached.lock() = Some(token);

		Ok(access_token)
	}
}
impl<T> Debug for TokenManager<T>
where
	T: ?Sized + CarrierTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("carrier", &self.carrier)
			.field("cached", &self.cached.lock().is_some())
			.field("single_flight", &self.refresh_guard.is_some())
			.finish()
	}
}

fn classify_acquire_failure(err: IntegrationError) -> IntegrationError {
	match err.kind() {
		ErrorKind::AuthFailed | ErrorKind::CarrierClientError =>
			err.rekind(ErrorKind::AuthFailed, AUTH_FAILED_MESSAGE),
		ErrorKind::AuthTokenExpired
		| ErrorKind::RateLimited
		| ErrorKind::NetworkTimeout
		| ErrorKind::NetworkError
		| ErrorKind::BadResponse
		| ErrorKind::ValidationError
		| ErrorKind::CarrierServerError
		| ErrorKind::Unknown => err,
	}
}
