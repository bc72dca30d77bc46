// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapping one carrier operation.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the operation and carrier identifier.
	pub fn new(kind: OperationKind, carrier: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("carrier_rates.operation", operation = kind.as_str(), carrier);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, carrier);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a propagated failure with its code, status, and truncated context.
pub fn log_failure(kind: OperationKind, err: &IntegrationError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			operation = kind.as_str(),
			code = err.kind().as_str(),
			status = err.status(),
			context = err.context(),
			"{}",
			err.message()
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, err);
	}
}

/// Token cache activity reported at `debug`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
	/// A fresh cached token was returned.
	Hit,
	/// No usable token was cached; a new one will be acquired.
	Miss,
	/// The cached token was discarded.
	Invalidated,
}

/// Emits a `debug` event for token cache activity.
pub fn log_cache_event(event: CacheEvent, carrier: &str) {
	#[cfg(feature = "tracing")]
	{
		match event {
			CacheEvent::Hit => tracing::debug!(carrier, "token cache hit"),
			CacheEvent::Miss => tracing::debug!(carrier, "token cache miss"),
			CacheEvent::Invalidated => tracing::debug!(carrier, "token cache invalidated"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (event, carrier);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_noop_without_subscriber() {
		let err = IntegrationError::new(ErrorKind::NetworkError, "submit_rate_request: refused");

		log_failure(OperationKind::SubmitRate, &err);
		log_cache_event(CacheEvent::Miss, "ups");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(OperationKind::GetRates, "ups");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
