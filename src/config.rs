//! Carrier endpoint, credential, and timeout configuration.
//!
//! Values usually come from the hosting service's configuration loader (deserialized with
//! serde) or from [`CarrierConfigBuilder`]. Both paths run the same validation before a
//! transport accepts the configuration.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::BoxError, token::Secret};

/// Default OAuth token endpoint path.
pub const DEFAULT_TOKEN_PATH: &str = "/security/v1/oauth/token";
/// Default rate-shopping endpoint path.
pub const DEFAULT_RATE_PATH: &str = "/api/rating/v1/Shop";
/// Default timeout for general requests (token acquisition), in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
/// Default timeout for rate submissions, in milliseconds.
pub const DEFAULT_RATE_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Configuration and construction failures raised before any request is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL cannot carry endpoint paths.
	#[error("Base URL must be an http(s) URL that can carry paths: {url}.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint path is not absolute.
	#[error("The {field} must start with '/': {path}.")]
	InvalidPath {
		/// Which path failed validation.
		field: &'static str,
		/// Offending path.
		path: String,
	},
	/// Joined endpoint URL failed to parse.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A timeout was configured as zero.
	#[error("The {field} must be greater than zero.")]
	ZeroTimeout {
		/// Which timeout failed validation.
		field: &'static str,
	},
	/// Rate submissions must be allowed at least as long as general requests.
	#[error("The rate request timeout ({rate_ms}ms) is shorter than the request timeout ({request_ms}ms).")]
	TimeoutOrder {
		/// General request timeout.
		request_ms: u64,
		/// Rate submission timeout.
		rate_ms: u64,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<ConfigError> for IntegrationError {
	fn from(e: ConfigError) -> Self {
		let kind = match e {
			ConfigError::HttpClientBuild { .. } => ErrorKind::Unknown,
			ConfigError::InvalidBaseUrl { .. }
			| ConfigError::InvalidPath { .. }
			| ConfigError::InvalidEndpoint { .. }
			| ConfigError::ZeroTimeout { .. }
			| ConfigError::TimeoutOrder { .. } => ErrorKind::ValidationError,
		};
		let message = e.to_string();

		IntegrationError::new(kind, message).with_source(e)
	}
}

/// Connection settings for one carrier credential pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierConfig {
	/// Carrier API base URL; a trailing slash is ignored.
	pub base_url: Url,
	/// Token endpoint path appended to the base URL.
	#[serde(default = "default_token_path")]
	pub token_path: String,
	/// Rate endpoint path appended to the base URL.
	#[serde(default = "default_rate_path")]
	pub rate_path: String,
	/// OAuth client identifier.
	#[serde(default)]
	pub client_id: String,
	/// OAuth client secret.
	#[serde(default)]
	pub client_secret: Secret,
	/// Timeout applied to token acquisition, in milliseconds.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
	/// Timeout applied to rate submissions, in milliseconds.
	#[serde(default = "default_rate_request_timeout_ms")]
	pub rate_request_timeout_ms: u64,
}
impl CarrierConfig {
	/// Creates a builder seeded with defaults for everything except the base URL.
	pub fn builder(base_url: Url) -> CarrierConfigBuilder {
		CarrierConfigBuilder::new(base_url)
	}

	/// Checks scheme, paths, and timeout invariants.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") || self.base_url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { url: self.base_url.to_string() });
		}

		validate_path("token path", &self.token_path)?;
		validate_path("rate path", &self.rate_path)?;

		if self.request_timeout_ms == 0 {
			return Err(ConfigError::ZeroTimeout { field: "request timeout" });
		}
		if self.rate_request_timeout_ms == 0 {
			return Err(ConfigError::ZeroTimeout { field: "rate request timeout" });
		}
		if self.rate_request_timeout_ms < self.request_timeout_ms {
			return Err(ConfigError::TimeoutOrder {
				request_ms: self.request_timeout_ms,
				rate_ms: self.rate_request_timeout_ms,
			});
		}

		Ok(())
	}

	/// Absolute token endpoint URL.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.token_path)
	}

	/// Absolute rate endpoint URL.
	pub fn rate_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.rate_path)
	}

	/// Timeout for token acquisition.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.request_timeout_ms)
	}

	/// Timeout for rate submissions.
	pub fn rate_request_timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.rate_request_timeout_ms)
	}

	fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}{path}")).map_err(|source| ConfigError::InvalidEndpoint { source })
	}
}

/// Builder for [`CarrierConfig`] values.
#[derive(Debug)]
pub struct CarrierConfigBuilder {
	config: CarrierConfig,
}
impl CarrierConfigBuilder {
	/// Creates a new builder for the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			config: CarrierConfig {
				base_url,
				token_path: default_token_path(),
				rate_path: default_rate_path(),
				client_id: String::new(),
				client_secret: Secret::default(),
				request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
				rate_request_timeout_ms: DEFAULT_RATE_REQUEST_TIMEOUT_MS,
			},
		}
	}

	/// Sets the client credential pair.
	pub fn credentials(mut self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
		self.config.client_id = client_id.into();
		self.config.client_secret = Secret::new(secret);

		self
	}

	/// Overrides the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.config.token_path = path.into();

		self
	}

	/// Overrides the rate endpoint path.
	pub fn rate_path(mut self, path: impl Into<String>) -> Self {
		self.config.rate_path = path.into();

		self
	}

	/// Overrides the general request timeout.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.config.request_timeout_ms = duration_ms(timeout);

		self
	}

	/// Overrides the rate submission timeout.
	pub fn rate_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.config.rate_request_timeout_ms = duration_ms(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<CarrierConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { field, path: path.to_owned() })
	}
}

fn duration_ms(timeout: StdDuration) -> u64 {
	u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn default_token_path() -> String {
	DEFAULT_TOKEN_PATH.into()
}

fn default_rate_path() -> String {
	DEFAULT_RATE_PATH.into()
}

fn default_request_timeout_ms() -> u64 {
	DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_rate_request_timeout_ms() -> u64 {
	DEFAULT_RATE_REQUEST_TIMEOUT_MS
}
