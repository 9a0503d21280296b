use std::fmt::Display;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::error::{Error, Result};

/// Default number of connection attempts before giving up.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Pause after the first failed attempt.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Upper bound of any single pause.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Bounded retry with exponential backoff.
///
/// Used once at startup to reach the broker. With `max_attempts == 1` it
/// degrades to a single best-effort attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
}

impl RetryPolicy {
	/// Policy with `max_attempts` attempts and the default backoff bounds.
	pub fn new(max_attempts: u32) -> Self {
		Self {
			max_attempts,
			initial_backoff: DEFAULT_INITIAL_BACKOFF,
			max_backoff: DEFAULT_MAX_BACKOFF,
		}
	}

	/// Pause taken after failed attempt number `attempt` (starting at 1).
	///
	/// Doubles each time, capped at `max_backoff`.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
		self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
	}

	/// Runs `operation` until it succeeds or the attempts are exhausted.
	///
	/// `operation` receives the attempt number, starting at 1. No pause
	/// follows the last attempt.
	///
	/// # Errors
	/// Returns `Error::Connect` carrying the last failure.
	pub fn run<T, E, F>(&self, what: &str, mut operation: F) -> Result<T>
	where
		E: Display,
		F: FnMut(u32) -> std::result::Result<T, E>,
	{
		let attempts = self.max_attempts.max(1);
		let mut attempt = 1;
		loop {
			match operation(attempt) {
				Ok(value) => {
					info!("{what} succeeded on attempt {attempt}/{attempts}");
					return Ok(value);
				}
				Err(e) if attempt >= attempts => {
					return Err(Error::Connect { attempts, message: format!("{what}: {e}") });
				}
				Err(e) => {
					let pause = self.backoff(attempt);
					warn!("{what} failed on attempt {attempt}/{attempts}: {e}, retrying in {pause:?}");
					thread::sleep(pause);
					attempt += 1;
				}
			}
		}
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_ATTEMPTS)
	}
}
