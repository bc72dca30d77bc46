//! Optional observability helpers for carrier operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `carrier_rates.operation` with the
//!   `operation` and `carrier` fields, plus `warn` events for failures and `debug` events for
//!   token cache activity.
//! - Enable `metrics` to increment the `carrier_rates_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`, and the
//!   `carrier_rates_failure_total` counter labeled by `operation` + `kind` (the error code).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Carrier operations observed by the integration layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Token acquisition through the token manager.
	AcquireToken,
	/// One rate submission to the carrier.
	SubmitRate,
	/// A full adapter `get_rates` call, including the single auth retry.
	GetRates,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::AcquireToken => "acquire_token",
			OperationKind::SubmitRate => "submit_rate_request",
			OperationKind::GetRates => "get_rates",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the outcome of `result` for `kind` and logs failures.
pub(crate) fn observe<T>(kind: OperationKind, result: &Result<T>) {
	match result {
		Ok(_) => record_outcome(kind, Outcome::Success),
		Err(err) => {
			record_outcome(kind, Outcome::Failure);
			record_failure_kind(kind, err.kind());
			log_failure(kind, err);
		},
	}
}
