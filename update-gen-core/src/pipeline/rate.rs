use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Fixed-interval pacing at a target number of messages per second.
///
/// The pause is a plain sleep taken after each emission. Time spent
/// downstream is not subtracted, so the effective rate drifts below the
/// target under load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
	interval: Duration,
}

impl RateLimiter {
	/// Creates a limiter for `rate` messages per second.
	///
	/// The interval is rounded up to the next nanosecond, so pacing never
	/// runs faster than the target.
	///
	/// # Errors
	/// Returns `Error::Config` if `rate` is zero.
	pub fn new(rate: u32) -> Result<Self> {
		if rate == 0 {
			return Err(Error::config("rate must be greater than 0"));
		}
		Ok(Self {
			interval: Duration::from_nanos(1_000_000_000u64.div_ceil(u64::from(rate))),
		})
	}

	/// Returns the pause between two emissions.
	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Paces `iter`: the first item comes immediately, every later one
	/// after one interval.
	pub fn pace<I: Iterator>(&self, iter: I) -> Paced<I> {
		Paced { inner: iter, interval: self.interval, emitted: false }
	}
}

/// Iterator adapter returned by [`RateLimiter::pace`].
#[derive(Debug)]
pub struct Paced<I> {
	inner: I,
	interval: Duration,
	emitted: bool,
}

impl<I: Iterator> Iterator for Paced<I> {
	type Item = I::Item;

	fn next(&mut self) -> Option<Self::Item> {
		if self.emitted {
			thread::sleep(self.interval);
		}
		self.emitted = true;
		self.inner.next()
	}
}
