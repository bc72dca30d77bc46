// self
use crate::{
	error::ErrorKind,
	obs::{OperationKind, Outcome},
};

/// Counts one step of a carrier operation on the global recorder.
///
/// Without the `metrics` feature this compiles to nothing.
pub fn record_outcome(kind: OperationKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"carrier_rates_operation_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Counts a failed carrier operation by its taxonomy code, e.g. `RATE_LIMITED`.
pub fn record_failure_kind(kind: OperationKind, error: ErrorKind) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"carrier_rates_failure_total",
		"operation" => kind.as_str(),
		"kind" => error.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, error);
}
