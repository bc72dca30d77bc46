//! Carrier rate integration layer: OAuth token lifecycle, carrier wire mapping, a closed
//! failure taxonomy, and deterministic single-provider orchestration for shipping quotes.
//!
//! Callers hand a [`domain::RateRequest`] to [`rates::RateOrchestrator`], which selects one
//! registered [`carrier::RateProvider`] and delegates. The bundled
//! [`carrier::CarrierRateAdapter`] drives a [`http::CarrierTransport`] through the
//! [`token::TokenManager`] and the [`mapper`] functions, retrying exactly once when the
//! carrier rejects a cached credential.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod carrier;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod mapper;
pub mod oauth;
pub mod obs;
pub mod rates;
pub mod token;
pub mod wire;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{ErrorKind, IntegrationError, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
