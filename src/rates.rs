//! Single-provider rate orchestration across registered carriers.

// self
use crate::{
	_prelude::*,
	carrier::{CarrierId, RateProvider},
	domain::{RateRequest, RateResponse},
};

/// Message returned when no provider is registered.
pub const NO_PROVIDERS_MESSAGE: &str = "No carrier rate providers configured.";

/// Ordered set of carrier providers; selects exactly one per request.
///
/// A request naming a carrier goes to the provider whose identifier matches it ignoring case;
/// otherwise the first registered provider is used. Results are never aggregated.
#[derive(Clone, Default)]
pub struct RateOrchestrator {
	providers: Vec<Arc<dyn RateProvider>>,
}
impl RateOrchestrator {
	/// Creates an orchestrator over `providers`, keeping their order.
	pub fn new(providers: impl IntoIterator<Item = Arc<dyn RateProvider>>) -> Self {
		Self { providers: providers.into_iter().collect() }
	}

	/// Appends a provider after the ones already registered.
	pub fn with_provider(mut self, provider: impl 'static + RateProvider) -> Self {
		self.register(Arc::new(provider));

		self
	}

	/// Appends a shared provider.
	pub fn register(&mut self, provider: Arc<dyn RateProvider>) {
		self.providers.push(provider);
	}

	/// Registered identifiers in registration order.
	pub fn carrier_ids(&self) -> Vec<&CarrierId> {
		self.providers.iter().map(|provider| provider.carrier_id()).collect()
	}

	/// Selects a provider for `request` and delegates to it unchanged.
	pub async fn get_rates(&self, request: &RateRequest) -> Result<RateResponse> {
		self.select(request.carrier_id.as_deref())?.get_rates(request).await
	}

	/// Resolves the provider for an optional requested identifier.
	///
	/// An empty identifier counts as absent.
	pub fn select(&self, requested: Option<&str>) -> Result<&Arc<dyn RateProvider>> {
		let Some(first) = self.providers.first() else {
			return Err(IntegrationError::new(ErrorKind::CarrierServerError, NO_PROVIDERS_MESSAGE));
		};

		match requested.filter(|id| !id.is_empty()) {
			None => Ok(first),
			Some(id) => self
				.providers
				.iter()
				.find(|provider| provider.carrier_id().matches(id))
				.ok_or_else(|| self.unknown_carrier(id)),
		}
	}

	fn unknown_carrier(&self, requested: &str) -> IntegrationError {
		let available =
			self.carrier_ids().iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");

		IntegrationError::validation(format!("Unknown carrier: {requested}. Available: {available}"))
	}
}
impl Debug for RateOrchestrator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateOrchestrator").field("carriers", &self.carrier_ids()).finish()
	}
}
