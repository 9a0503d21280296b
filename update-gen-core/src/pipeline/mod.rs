//! Delivery side of the generator: pacing, counting, sinks and broker retry.

/// Per-model running counts with periodic spam-fraction checkpoints.
pub mod metrics;

/// Fixed-interval pacing.
pub mod rate;

/// Bounded retry with exponential backoff, used to reach the broker.
pub mod retry;

/// The `Sink` seam and the dry-run JSON-lines sink.
pub mod sink;

use crate::error::Result;
use crate::message::GeneratedMessage;
use metrics::MetricsCounter;
use rate::RateLimiter;
use sink::Sink;

/// Drives messages through the limiter, the counter and the sink, one at a time.
///
/// # Behavior
/// - Runs until `limit` messages were delivered, or forever when `limit` is `None`.
/// - Counts a message before handing it to the sink.
/// - A sink error ends the loop; nothing is retried.
///
/// # Returns
/// The number of messages delivered.
pub fn run<I, S>(
	messages: I,
	limiter: &RateLimiter,
	metrics: &mut MetricsCounter,
	sink: &mut S,
	limit: Option<u64>,
) -> Result<u64>
where
	I: Iterator<Item = GeneratedMessage>,
	S: Sink + ?Sized,
{
	let mut delivered = 0;
	let mut paced = limiter.pace(messages);

	while limit.is_none_or(|limit| delivered < limit) {
		let Some(message) = paced.next() else {
			break;
		};
		metrics.record(message.model_index);
		sink.publish(&message)?;
		delivered += 1;
	}

	Ok(delivered)
}
