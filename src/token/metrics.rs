//! Counters describing how a [`TokenManager`](super::TokenManager) cache behaves.
//!
//! A healthy cache shows many hits per acquisition. Evictions only count invalidations that
//! actually dropped a token, so repeated `invalidate_cache` calls after a carrier `401` show up
//! as invalidations without evictions.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one token cache. Updated lock-free from any task.
#[derive(Debug, Default)]
pub struct TokenMetrics {
	acquisitions: AtomicU64,
	failed_acquisitions: AtomicU64,
	cache_hits: AtomicU64,
	invalidations: AtomicU64,
	evictions: AtomicU64,
}
impl TokenMetrics {
	/// Token requests sent to the carrier, failed ones included.
	pub fn acquisitions(&self) -> u64 {
		self.acquisitions.load(Ordering::Relaxed)
	}

	/// Token requests that did not yield a usable token.
	pub fn failed_acquisitions(&self) -> u64 {
		self.failed_acquisitions.load(Ordering::Relaxed)
	}

	/// Calls answered from the cache without touching the carrier.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// `invalidate_cache` calls, including ones that found the cache empty.
	pub fn invalidations(&self) -> u64 {
		self.invalidations.load(Ordering::Relaxed)
	}

	/// Invalidations that discarded a cached token.
	pub fn evictions(&self) -> u64 {
		self.evictions.load(Ordering::Relaxed)
	}

	/// Point-in-time copy of every counter.
	pub fn snapshot(&self) -> TokenMetricsSnapshot {
		TokenMetricsSnapshot {
			acquisitions: self.acquisitions(),
			failed_acquisitions: self.failed_acquisitions(),
			cache_hits: self.cache_hits(),
			invalidations: self.invalidations(),
			evictions: self.evictions(),
		}
	}

	pub(crate) fn record_acquisition(&self, succeeded: bool) {
		self.acquisitions.fetch_add(1, Ordering::Relaxed);

		if !succeeded {
			self.failed_acquisitions.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_invalidation(&self, evicted: bool) {
		self.invalidations.fetch_add(1, Ordering::Relaxed);

		if evicted {
			self.evictions.fetch_add(1, Ordering::Relaxed);
		}
	}
}

/// Plain copy of [`TokenMetrics`], e.g. for health endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenMetricsSnapshot {
	/// See [`TokenMetrics::acquisitions`].
	pub acquisitions: u64,
	/// See [`TokenMetrics::failed_acquisitions`].
	pub failed_acquisitions: u64,
	/// See [`TokenMetrics::cache_hits`].
	pub cache_hits: u64,
	/// See [`TokenMetrics::invalidations`].
	pub invalidations: u64,
	/// See [`TokenMetrics::evictions`].
	pub evictions: u64,
}
impl TokenMetricsSnapshot {
	/// Share of token lookups served from the cache, `None` before the first lookup.
	pub fn hit_ratio(&self) -> Option<f64> {
		let lookups = self.cache_hits + self.acquisitions;

		(lookups > 0).then(|| self.cache_hits as f64 / lookups as f64)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn snapshot_separates_failures_and_evictions() {
		let metrics = TokenMetrics::default();

		metrics.record_acquisition(true);
		metrics.record_acquisition(false);
		metrics.record_cache_hit();
		metrics.record_cache_hit();
		metrics.record_invalidation(true);
		metrics.record_invalidation(false);

		let snapshot = metrics.snapshot();

		assert_eq!(snapshot.acquisitions, 2);
		assert_eq!(snapshot.failed_acquisitions, 1);
		assert_eq!(snapshot.invalidations, 2);
		assert_eq!(snapshot.evictions, 1);
		assert_eq!(snapshot.hit_ratio(), Some(0.5));
	}

	#[test]
	fn hit_ratio_is_undefined_before_any_lookup() {
		assert_eq!(TokenMetrics::default().snapshot().hit_ratio(), None);
	}
}
