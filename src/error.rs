//! Integration error taxonomy shared by the transport, token, mapping, and orchestration layers.
//!
//! Every failure path resolves to exactly one [`ErrorKind`]. [`IntegrationError`] carries the
//! kind together with diagnostics (transport status, truncated carrier context, wrapped cause)
//! so the surrounding service can log the details while only exposing [`ErrorBody`] to clients.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`IntegrationError`] by default.
pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Maximum number of characters kept in [`IntegrationError::context`].
pub const CONTEXT_LIMIT: usize = 500;

/// Status used when an error carries no usable 4xx/5xx status.
pub const UPSTREAM_FAILURE_STATUS: u16 = 502;

/// Closed set of integration failure kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	/// Carrier rejected the client credentials or the bearer token.
	AuthFailed,
	/// Cached token expired before it could be used.
	AuthTokenExpired,
	/// Carrier reported a rate-limit (HTTP 429).
	RateLimited,
	/// Request exceeded its transport timeout.
	NetworkTimeout,
	/// Connection, DNS, TLS, or other network failure.
	NetworkError,
	/// Carrier replied with a payload that cannot be used.
	BadResponse,
	/// Caller input failed structural validation or selected an unknown carrier.
	ValidationError,
	/// Carrier returned a 5xx status, or no carrier is configured.
	CarrierServerError,
	/// Carrier returned a 4xx status other than 401/429.
	CarrierClientError,
	/// Anything that is not a transport failure.
	Unknown,
}
impl ErrorKind {
	/// Returns the stable wire code for the kind.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::AuthFailed => "AUTH_FAILED",
			ErrorKind::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
			ErrorKind::RateLimited => "RATE_LIMITED",
			ErrorKind::NetworkTimeout => "NETWORK_TIMEOUT",
			ErrorKind::NetworkError => "NETWORK_ERROR",
			ErrorKind::BadResponse => "BAD_RESPONSE",
			ErrorKind::ValidationError => "VALIDATION_ERROR",
			ErrorKind::CarrierServerError => "CARRIER_SERVER_ERROR",
			ErrorKind::CarrierClientError => "CARRIER_CLIENT_ERROR",
			ErrorKind::Unknown => "UNKNOWN",
		}
	}

	/// Classifies a transport failure that carried an HTTP status.
	pub const fn from_status(status: u16) -> Self {
		match status {
			401 => ErrorKind::AuthFailed,
			429 => ErrorKind::RateLimited,
			500.. => ErrorKind::CarrierServerError,
			400..500 => ErrorKind::CarrierClientError,
			_ => ErrorKind::NetworkError,
		}
	}

	/// Classifies a transport failure without a status from its description.
	pub fn from_transport_message(message: &str) -> Self {
		if is_timeout_message(message) { ErrorKind::NetworkTimeout } else { ErrorKind::NetworkError }
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Uniform error carrier produced at the point of failure detection.
#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct IntegrationError {
	kind: ErrorKind,
	message: String,
	status: Option<u16>,
	context: Option<String>,
	#[source]
	source: Option<BoxError>,
}
impl IntegrationError {
	/// Creates an error of the given kind.
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into(), status: None, context: None, source: None }
	}

	/// Shorthand for [`ErrorKind::ValidationError`].
	pub fn validation(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::ValidationError, message)
	}

	/// Shorthand for [`ErrorKind::BadResponse`].
	pub fn bad_response(message: impl Into<String>) -> Self {
		Self::new(ErrorKind::BadResponse, message)
	}

	/// Attaches the originating transport status.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches diagnostic context, truncated to [`CONTEXT_LIMIT`] characters.
	pub fn with_context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(truncate_context(context.into()));

		self
	}

	/// Wraps the underlying cause.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(source));

		self
	}

	/// Produces a new error of `kind` that keeps status and context and wraps `self` as the cause.
	pub fn rekind(self, kind: ErrorKind, message: impl Into<String>) -> Self {
		let status = self.status;
		let context = self.context.clone();

		Self { kind, message: message.into(), status, context, source: Some(Box::new(self)) }
	}

	/// Error kind.
	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	/// Human-readable message.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Transport status, when the failure came from an HTTP response.
	pub fn status(&self) -> Option<u16> {
		self.status
	}

	/// Truncated carrier payload kept for diagnostics only.
	pub fn context(&self) -> Option<&str> {
		self.context.as_deref()
	}

	/// Status an HTTP layer should answer with: the attached 4xx/5xx status, else 502.
	pub fn response_status(&self) -> u16 {
		match self.status {
			Some(status @ 400..600) => status,
			_ => UPSTREAM_FAILURE_STATUS,
		}
	}

	/// Client-facing body; omits the cause and the carrier context.
	pub fn body(&self) -> ErrorBody {
		ErrorBody { error: ErrorDetail { code: self.kind, message: self.message.clone() } }
	}
}

/// Serializable `{ "error": { "code", "message" } }` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Error detail.
	pub error: ErrorDetail,
}

/// Code + message pair exposed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
	/// Taxonomy code.
	pub code: ErrorKind,
	/// Human-readable message.
	pub message: String,
}

pub(crate) fn truncate_context(context: String) -> String {
	match context.char_indices().nth(CONTEXT_LIMIT) {
		Some((idx, _)) => context[..idx].to_owned(),
		None => context,
	}
}

pub(crate) fn is_timeout_message(message: &str) -> bool {
	let lowered = message.to_ascii_lowercase();

	lowered.contains("timeout") || lowered.contains("timed out")
}
