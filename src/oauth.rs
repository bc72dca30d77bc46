//! Client-credentials token exchange built on the `oauth2` crate.

pub use oauth2;

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AccessToken, AsyncHttpClient, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RefreshToken, RequestTokenError, Scope, StandardRevocableToken,
	TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
use serde::{
	Deserializer,
	de::{IntoDeserializer, value::StringDeserializer},
};
// self
use crate::{
	_prelude::*,
	config::{CarrierConfig, ConfigError},
	http::{self, ACQUIRE_TOKEN, ResponseMetadata, ResponseMetadataSlot, TokenGrant},
	token::Secret,
	wire::{self, Scalar},
};

/// `oauth2` client with only the token endpoint configured.
pub type TokenClient = Client<
	BasicErrorResponse,
	CarrierTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Successful token endpoint reply.
///
/// Carriers disagree on how `expires_in` is encoded (`3600` or `"3600"`); both are accepted
/// and anything else reads as an unreported lifetime. Extra fields are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarrierTokenResponse {
	access_token: AccessToken,
	#[serde(deserialize_with = "case_insensitive_token_type")]
	token_type: BasicTokenType,
	#[serde(
		default,
		deserialize_with = "wire::lenient",
		skip_serializing_if = "Option::is_none"
	)]
	expires_in: Option<Scalar>,
}
impl TokenResponse for CarrierTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<StdDuration> {
		self.expires_in.as_ref().and_then(Scalar::as_u64).map(StdDuration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		None
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		None
	}
}

/// Builds the token client for `config` (HTTP Basic client authentication).
pub fn token_client(config: &CarrierConfig) -> Result<TokenClient, ConfigError> {
	let token_url = TokenUrl::from_url(config.token_endpoint()?);

	Ok(Client::new(ClientId::new(config.client_id.clone()))
		.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
		.set_token_uri(token_url))
}

/// Runs one client-credentials exchange through `http`, classifying failures.
///
/// `slot` must be the slot `http` records into so the response status reaches the mapper.
pub async fn exchange_client_credentials<'c, C, E>(
	client: &'c TokenClient,
	http: &'c C,
	slot: &ResponseMetadataSlot,
) -> Result<TokenGrant>
where
	C: AsyncHttpClient<'c, Error = HttpClientError<E>>,
	E: 'static + Send + Sync + StdError,
{
	let response = client
		.exchange_client_credentials()
		.request_async(http)
		.await
		.map_err(|err| map_request_error(slot.take(), err))?;

	Ok(map_token_response(&response))
}

fn case_insensitive_token_type<'de, D>(deserializer: D) -> Result<BasicTokenType, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;
	let lowered: StringDeserializer<D::Error> = raw.to_ascii_lowercase().into_deserializer();

	BasicTokenType::deserialize(lowered)
}

fn map_token_response(response: &CarrierTokenResponse) -> TokenGrant {
	TokenGrant {
		access_token: Secret::new(response.access_token().secret().to_owned()),
		token_type: response.token_type().as_ref().to_owned(),
		expires_in: response.expires_in().map(|lifetime| lifetime.as_secs()),
	}
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> IntegrationError
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.as_ref().and_then(|value| value.status);
	let retry_after = meta.as_ref().and_then(|value| value.retry_after);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(status, retry_after, &response),
		RequestTokenError::Request(error) => map_http_client_error(status, error),
		RequestTokenError::Parse(error, body) => match status {
			Some(code) if code >= 400 =>
				http::status_error(ACQUIRE_TOKEN, code, None, &body, retry_after).with_source(error),
			_ => IntegrationError::bad_response(format!(
				"{ACQUIRE_TOKEN}: token response could not be parsed at `{}`",
				error.path()
			))
			.with_context(String::from_utf8_lossy(&body))
			.with_source(error),
		},
		RequestTokenError::Other(message) => match status {
			Some(code) if code >= 400 =>
				http::status_error(ACQUIRE_TOKEN, code, None, message.as_bytes(), retry_after),
			_ => IntegrationError::new(ErrorKind::Unknown, format!("{ACQUIRE_TOKEN}: {message}")),
		},
	}
}

fn map_server_response_error(
	status: Option<u16>,
	retry_after: Option<Duration>,
	response: &BasicErrorResponse,
) -> IntegrationError {
	let detail = response
		.error_description()
		.cloned()
		.unwrap_or_else(|| response.error().as_ref().to_owned());
	let message = match retry_after {
		Some(delay) =>
			format!("{ACQUIRE_TOKEN}: {detail} (retry after {}s)", delay.whole_seconds()),
		None => format!("{ACQUIRE_TOKEN}: {detail}"),
	};
	let mut err = match status {
		Some(code) => IntegrationError::new(ErrorKind::from_status(code), message).with_status(code),
		None => IntegrationError::new(ErrorKind::from_transport_message(&message), message),
	};

	if let Ok(context) = serde_json::to_string(response) {
		err = err.with_context(context);
	}

	err
}

fn map_http_client_error<E>(status: Option<u16>, err: HttpClientError<E>) -> IntegrationError
where
	E: 'static + Send + Sync + StdError,
{
	let classified = match err {
		HttpClientError::Reqwest(inner) => http::transport_error(ACQUIRE_TOKEN, *inner),
		HttpClientError::Io(inner) => http::transport_error(ACQUIRE_TOKEN, inner),
		HttpClientError::Other(message) => IntegrationError::new(
			ErrorKind::from_transport_message(&message),
			format!("{ACQUIRE_TOKEN}: {message}"),
		),
		HttpClientError::Http(inner) => IntegrationError::new(
			ErrorKind::Unknown,
			format!("{ACQUIRE_TOKEN}: token request could not be built"),
		)
		.with_source(inner),
		other => IntegrationError::new(
			ErrorKind::Unknown,
			format!("{ACQUIRE_TOKEN}: unexpected HTTP client error: {other}"),
		),
	};

	match status {
		Some(code) => {
			let message = classified.message().to_owned();

			classified.rekind(ErrorKind::from_status(code), message).with_status(code)
		},
		None => classified,
	}
}
