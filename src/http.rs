//! Transport contract for carrier token and rate calls, plus the reqwest-backed client.
//!
//! [`CarrierTransport`] is the only dependency the adapter has on an HTTP stack. Each call
//! performs exactly one attempt and classifies every failure into an [`IntegrationError`]:
//!
//! - a status is present: 401 → `AUTH_FAILED`, 429 → `RATE_LIMITED`, 5xx →
//!   `CARRIER_SERVER_ERROR`, other 4xx → `CARRIER_CLIENT_ERROR`, anything else →
//!   `NETWORK_ERROR`;
//! - no status: a timeout description → `NETWORK_TIMEOUT`, otherwise `NETWORK_ERROR`;
//! - failures that are not transport failures → `UNKNOWN`.
//!
//! Messages start with the failed operation name and structured carrier bodies are kept as
//! truncated diagnostic context.

// std
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	token::Secret,
	wire::{WireRateRequest, WireRateResponse},
};
#[cfg(feature = "reqwest")]
use crate::{
	config::{CarrierConfig, ConfigError},
	oauth::{self, TokenClient},
	wire,
};

/// Operation label used for token acquisition failures.
pub const ACQUIRE_TOKEN: &str = "acquire_token";
/// Operation label used for rate submission failures.
pub const SUBMIT_RATE_REQUEST: &str = "submit_rate_request";

/// Boxed future returned by [`CarrierTransport`] calls.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// The two carrier HTTP operations the adapter needs.
///
/// Implementations must perform a single attempt per call and must never retry; retry
/// policy belongs to the adapter.
pub trait CarrierTransport
where
	Self: 'static + Send + Sync,
{
	/// Exchanges the configured client credentials for an access token.
	fn acquire_token(&self) -> TransportFuture<'_, TokenGrant>;

	/// Submits a mapped rate request authenticated with `access_token`.
	fn submit_rate_request<'a>(
		&'a self,
		access_token: &'a str,
		request: &'a WireRateRequest,
	) -> TransportFuture<'a, WireRateResponse>;
}

/// Token endpoint reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer credential.
	pub access_token: Secret,
	/// Token type reported by the carrier (usually `Bearer`).
	pub token_type: String,
	/// Lifetime in seconds, when reported.
	pub expires_in: Option<u64>,
}
impl TokenGrant {
	/// Creates a bearer grant.
	pub fn bearer(access_token: impl Into<String>, expires_in: Option<u64>) -> Self {
		Self { access_token: Secret::new(access_token), token_type: "Bearer".into(), expires_in }
	}
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the carrier, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// A fresh slot is created for each token request; the handle stores the response status
/// before `oauth2` parses the body, and the error mapper reads it afterwards.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// reqwest-backed [`CarrierTransport`].
///
/// Token acquisition runs the OAuth 2.0 client-credentials grant (HTTP Basic client
/// authentication) under the general timeout; rate submission posts JSON with a bearer
/// header under the longer rate timeout. Redirects are never followed.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	token_client: TokenClient,
	rate_endpoint: Url,
	request_timeout: StdDuration,
	rate_request_timeout: StdDuration,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with its own reqwest client.
	pub fn new(config: &CarrierConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Self::with_client(config, client)
	}

	/// Builds a transport around an existing reqwest client.
	///
	/// The client should not follow redirects; per-call timeouts are applied on top of it.
	pub fn with_client(config: &CarrierConfig, client: ReqwestClient) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self {
			client,
			token_client: oauth::token_client(config)?,
			rate_endpoint: config.rate_endpoint()?,
			request_timeout: config.request_timeout(),
			rate_request_timeout: config.rate_request_timeout(),
		})
	}

	fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient {
			client: self.client.clone(),
			slot,
			timeout: self.request_timeout,
		}))
	}

	async fn post_rate(
		&self,
		access_token: &str,
		request: &WireRateRequest,
	) -> Result<WireRateResponse> {
		let response = self
			.client
			.post(self.rate_endpoint.clone())
			.bearer_auth(access_token)
			.json(request)
			.timeout(self.rate_request_timeout)
			.send()
			.await
			.map_err(|e| classify_reqwest_error(SUBMIT_RATE_REQUEST, e))?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());
		let body =
			response.bytes().await.map_err(|e| classify_reqwest_error(SUBMIT_RATE_REQUEST, e))?;

		if !status.is_success() {
			return Err(status_error(
				SUBMIT_RATE_REQUEST,
				status.as_u16(),
				status.canonical_reason(),
				&body,
				retry_after,
			));
		}

		wire::decode_response(&body)
	}
}
#[cfg(feature = "reqwest")]
impl CarrierTransport for ReqwestTransport {
	fn acquire_token(&self) -> TransportFuture<'_, TokenGrant> {
		Box::pin(async move {
			let slot = ResponseMetadataSlot::default();
			let handle = self.instrumented(slot.clone());

			oauth::exchange_client_credentials(&self.token_client, &handle, &slot).await
		})
	}

	fn submit_rate_request<'a>(
		&'a self,
		access_token: &'a str,
		request: &'a WireRateRequest,
	) -> TransportFuture<'a, WireRateResponse> {
		Box::pin(self.post_rate(access_token, request))
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTransport")
			.field("rate_endpoint", &self.rate_endpoint.as_str())
			.field("request_timeout", &self.request_timeout)
			.field("rate_request_timeout", &self.rate_request_timeout)
			.finish()
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
	timeout: StdDuration,
}

/// [`AsyncHttpClient`] handle used for token exchanges; records response metadata.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			*request.timeout_mut() = Some(client.timeout);

			let response = client.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Classifies an HTTP error status together with its (possibly structured) body.
pub(crate) fn status_error(
	operation: &str,
	status: u16,
	reason: Option<&str>,
	body: &[u8],
	retry_after: Option<Duration>,
) -> IntegrationError {
	let structured = serde_json::from_slice::<serde_json::Value>(body)
		.ok()
		.filter(|value| value.is_object() || value.is_array());
	let detail = structured
		.as_ref()
		.and_then(|value| value.get("message"))
		.and_then(serde_json::Value::as_str)
		.map(ToOwned::to_owned)
		.unwrap_or_else(|| match reason {
			Some(reason) => format!("HTTP {status} {reason}"),
			None => format!("HTTP {status}"),
		});
	let message = match retry_after {
		Some(delay) => format!("{operation}: {detail} (retry after {}s)", delay.whole_seconds()),
		None => format!("{operation}: {detail}"),
	};
	let err = IntegrationError::new(ErrorKind::from_status(status), message).with_status(status);

	match structured {
		Some(value) => err.with_context(value.to_string()),
		None => err,
	}
}

/// Classifies a failure that never produced an HTTP response.
pub(crate) fn transport_error(
	operation: &str,
	source: impl 'static + Send + Sync + StdError,
) -> IntegrationError {
	let description = error_chain(&source);

	IntegrationError::new(
		ErrorKind::from_transport_message(&description),
		format!("{operation}: {description}"),
	)
	.with_source(source)
}

/// Joins an error and its sources into one description.
pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
	let mut description = err.to_string();
	let mut current = err.source();

	while let Some(cause) = current {
		description.push_str(": ");
		description.push_str(&cause.to_string());

		current = cause.source();
	}

	description
}

#[cfg(feature = "reqwest")]
fn classify_reqwest_error(operation: &str, err: ReqwestError) -> IntegrationError {
	if let Some(status) = err.status() {
		let message = format!("{operation}: {}", error_chain(&err));

		return IntegrationError::new(ErrorKind::from_status(status.as_u16()), message)
			.with_status(status.as_u16())
			.with_source(err);
	}
	if err.is_timeout() {
		let message = format!("{operation}: request timed out");

		return IntegrationError::new(ErrorKind::NetworkTimeout, message).with_source(err);
	}
	if err.is_builder() {
		let message = format!("{operation}: {}", error_chain(&err));

		return IntegrationError::new(ErrorKind::Unknown, message).with_source(err);
	}

	transport_error(operation, err)
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<i64>() {
		return Some(Duration::seconds(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_error_prefers_carrier_message_and_keeps_json_context() {
		let body = br#"{"message":"Invalid postal code","code":"111285"}"#;
		let err = status_error(SUBMIT_RATE_REQUEST, 400, Some("Bad Request"), body, None);

		assert_eq!(err.kind(), ErrorKind::CarrierClientError);
		assert_eq!(err.status(), Some(400));
		assert_eq!(err.message(), "submit_rate_request: Invalid postal code");
		assert!(err.context().is_some_and(|context| context.contains("111285")));
	}

	#[test]
	fn status_error_without_structured_body_has_no_context() {
		let err = status_error(ACQUIRE_TOKEN, 503, Some("Service Unavailable"), b"<html/>", None);

		assert_eq!(err.kind(), ErrorKind::CarrierServerError);
		assert_eq!(err.message(), "acquire_token: HTTP 503 Service Unavailable");
		assert_eq!(err.context(), None);
	}

	#[test]
	fn status_error_reports_retry_hint() {
		let err = status_error(
			SUBMIT_RATE_REQUEST,
			429,
			Some("Too Many Requests"),
			b"",
			Some(Duration::seconds(30)),
		);

		assert_eq!(err.kind(), ErrorKind::RateLimited);
		assert_eq!(err.message(), "submit_rate_request: HTTP 429 Too Many Requests (retry after 30s)");
	}

	#[test]
	fn transport_error_detects_timeouts_in_source_chain() {
		let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
		let err = transport_error(ACQUIRE_TOKEN, io);

		assert_eq!(err.kind(), ErrorKind::NetworkTimeout);
		assert_eq!(err.status(), None);

		let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

		assert_eq!(transport_error(ACQUIRE_TOKEN, refused).kind(), ErrorKind::NetworkError);
	}
}
