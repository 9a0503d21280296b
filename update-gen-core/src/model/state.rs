use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Outgoing transitions of one chain state.
///
/// A `State` corresponds to a fixed window of `state_size` words (the key in
/// the owning [`Chain`](super::chain::Chain)) and stores every word observed
/// right after that window, weighted by its number of observations.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - `total` is the sum of all occurrence counts
/// - A word appears at most once
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct State {
	/// Outgoing transitions in word order.
	/// Example: [("there", 3), ("world", 42)]
	transitions: Vec<(String, u64)>,
	total: u64,
}

impl State {
	/// Builds a state from per-word occurrence counts.
	///
	/// - `counts` must not repeat a word.
	/// - Zero counts are skipped.
	///
	/// # Errors
	/// Returns `LoadError::Malformed` if the counts add up past `u64::MAX`.
	pub(crate) fn from_counts<I>(counts: I) -> Result<Self, LoadError>
	where
		I: IntoIterator<Item = (String, u64)>,
	{
		let mut state = Self::default();
		for (next_word, occurrence) in counts {
			if occurrence == 0 {
				continue;
			}
			state.total = state.total.checked_add(occurrence).ok_or_else(|| {
				LoadError::Malformed(format!("occurrence counts overflow at {next_word:?}"))
			})?;
			state.transitions.push((next_word, occurrence));
		}
		Ok(state)
	}

	/// Returns true if the state has no outgoing transition.
	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Predicts the next word using weighted random sampling.
	///
	/// The probability of selecting a word is proportional to its
	/// occurrence count.
	///
	/// This method performs:
	/// - an O(n) scan over the transitions
	/// - a cumulative subtraction to select a bucket
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);

		for (next_word, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next_word);
			}
			r -= occurrence;
		}

		// Unreachable while `total` matches the transitions
		self.transitions.last().map(|(word, _)| word.as_str())
	}
}
