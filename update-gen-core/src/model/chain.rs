use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::State;
use crate::error::LoadError;

/// Padding word filling the state window before the first real word.
pub const BEGIN: &str = "___BEGIN__";

/// Transition target marking the end of a sentence.
pub const END: &str = "___END__";

/// Transitions as they appear in a serialized chain.
///
/// Plain chains store `{word: count}`, compiled chains store
/// `[[words], [cumulative counts]]`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum RawTransitions {
	Counts(BTreeMap<String, u64>),
	Compiled(Vec<String>, Vec<u64>),
}

/// A serialized chain: a list of `[state window, transitions]` pairs.
pub(crate) type RawChain = Vec<(Vec<String>, RawTransitions)>;

/// Word-level Markov chain of a fixed order.
///
/// # Invariants
/// - `state_size` is always >= 1
/// - Every key in `states` holds exactly `state_size` words
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chain {
	/// Number of words in a state window
	state_size: usize,

	/// Mapping from a window of words to the words observed after it
	states: HashMap<Vec<String>, State>,
}

impl Chain {
	/// Builds a chain from its serialized form.
	///
	/// Counts for a window listed more than once are merged.
	///
	/// # Errors
	/// Returns `LoadError::Malformed` if:
	/// - `state_size` is zero or the chain is empty
	/// - a window has the wrong number of words
	/// - compiled counts decrease
	/// - counts overflow `u64`
	pub(crate) fn from_raw(state_size: usize, raw: RawChain) -> Result<Self, LoadError> {
		if state_size == 0 {
			return Err(LoadError::Malformed("state_size must be >= 1".to_owned()));
		}
		if raw.is_empty() {
			return Err(LoadError::Malformed("chain has no states".to_owned()));
		}

		let mut windows: HashMap<Vec<String>, BTreeMap<String, u64>> = HashMap::with_capacity(raw.len());
		for (key, transitions) in raw {
			if key.len() != state_size {
				let message = format!("state {key:?} has {} words, expected {state_size}", key.len());
				return Err(LoadError::Malformed(message));
			}

			let counts = windows.entry(key).or_default();
			match transitions {
				RawTransitions::Counts(observed) if counts.is_empty() => *counts = observed,
				RawTransitions::Counts(observed) => {
					for (next_word, occurrence) in observed {
						merge_count(counts, next_word, occurrence)?;
					}
				}
				RawTransitions::Compiled(words, cumulative) => {
					if words.len() != cumulative.len() {
						return Err(LoadError::Malformed("compiled transitions length mismatch".to_owned()));
					}
					let mut previous = 0;
					for (next_word, current) in words.into_iter().zip(cumulative) {
						let occurrence = current.checked_sub(previous).ok_or_else(|| {
							LoadError::Malformed("compiled counts must be non-decreasing".to_owned())
						})?;
						merge_count(counts, next_word, occurrence)?;
						previous = current;
					}
				}
			}
		}

		let states = windows
			.into_iter()
			.map(|(key, counts)| Ok((key, State::from_counts(counts)?)))
			.collect::<Result<HashMap<_, _>, LoadError>>()?;

		Ok(Self { state_size, states })
	}

	/// Returns the number of words in a state window.
	pub fn state_size(&self) -> usize {
		self.state_size
	}

	/// Returns the window every walk starts from.
	fn begin_state(&self) -> Vec<String> {
		vec![BEGIN.to_owned(); self.state_size]
	}

	/// Returns true if a walk can produce at least one transition.
	pub fn is_valid(&self) -> bool {
		// A key of the right size bounds the begin window allocation
		self.states.keys().next().is_some_and(|key| key.len() == self.state_size)
			&& self
				.states
				.get(&self.begin_state())
				.is_some_and(|state| !state.is_empty())
	}

	/// Walks the chain from the begin state until the end marker.
	///
	/// # Notes
	/// - An unknown window also ends the walk.
	/// - At most `max_words` words are produced, so cyclic chains always return.
	pub fn walk<R: Rng>(&self, rng: &mut R, max_words: usize) -> Vec<String> {
		let mut window = self.begin_state();
		let mut words = Vec::new();

		while words.len() < max_words {
			let next_word = match self.states.get(&window).and_then(|state| state.predict(rng)) {
				Some(word) if word != END => word.to_owned(),
				_ => break,
			};
			window.remove(0);
			window.push(next_word.clone());
			words.push(next_word);
		}

		words
	}
}

fn merge_count(
	counts: &mut BTreeMap<String, u64>,
	next_word: String,
	occurrence: u64,
) -> Result<(), LoadError> {
	let count = counts.entry(next_word).or_default();
	*count = count.checked_add(occurrence).ok_or_else(|| {
		LoadError::Malformed("occurrence count overflows".to_owned())
	})?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, Instant};

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn raw(json: &str) -> RawChain {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn test_walk_single_path() {
		let chain = Chain::from_raw(2, raw(r#"[
			[["___BEGIN__", "___BEGIN__"], {"hello": 1}],
			[["___BEGIN__", "hello"], {"world": 1}],
			[["hello", "world"], {"___END__": 1}]
		]"#)).unwrap();
		let mut rng = StdRng::seed_from_u64(3);

		assert!(chain.is_valid());
		assert_eq!(chain.walk(&mut rng, 100), vec!["hello", "world"]);
	}

	#[test]
	fn test_walk_compiled_transitions() {
		let chain = Chain::from_raw(1, raw(r#"[
			[["___BEGIN__"], [["only", "never"], [4, 4]]],
			[["only"], [["___END__"], [1]]]
		]"#)).unwrap();
		let mut rng = StdRng::seed_from_u64(5);

		for _ in 0..50 {
			assert_eq!(chain.walk(&mut rng, 100), vec!["only"]);
		}
	}

	#[test]
	fn test_walk_cycle_is_bounded() {
		let chain = Chain::from_raw(1, raw(r#"[
			[["___BEGIN__"], {"spin": 1}],
			[["spin"], {"spin": 1}]
		]"#)).unwrap();
		let mut rng = StdRng::seed_from_u64(9);

		assert_eq!(chain.walk(&mut rng, 7).len(), 7);
	}

	#[test]
	fn test_rejects_wrong_window_size() {
		let result = Chain::from_raw(2, raw(r#"[[["___BEGIN__"], {"a": 1}]]"#));
		assert!(matches!(result, Err(LoadError::Malformed(_))));
	}

	#[test]
	fn test_rejects_decreasing_compiled_counts() {
		let result = Chain::from_raw(1, raw(r#"[[["___BEGIN__"], [["a", "b"], [3, 2]]]]"#));
		assert!(matches!(result, Err(LoadError::Malformed(_))));
	}

	#[test]
	fn test_invalid_without_begin_state() {
		let chain = Chain::from_raw(1, raw(r#"[[["a"], {"b": 1}]]"#)).unwrap();
		assert!(!chain.is_valid());
	}

	#[test]
	fn test_rejects_empty_chain_of_any_size() {
		for state_size in [1, 2, usize::MAX / 4] {
			let result = Chain::from_raw(state_size, Vec::new());
			assert!(matches!(result, Err(LoadError::Malformed(_))), "{state_size}");
		}
	}

	#[test]
	fn test_rejects_oversized_state_size() {
		let result = Chain::from_raw(usize::MAX / 4, raw(r#"[[["___BEGIN__"], {"a": 1}]]"#));
		assert!(matches!(result, Err(LoadError::Malformed(_))));
	}

	#[test]
	fn test_rejects_overflowing_counts() {
		let in_one_state = raw(r#"[[["___BEGIN__"], {"a": 18446744073709551615, "b": 1}]]"#);
		assert!(matches!(Chain::from_raw(1, in_one_state), Err(LoadError::Malformed(_))));

		let across_repeats = raw(r#"[
			[["___BEGIN__"], {"a": 18446744073709551615}],
			[["___BEGIN__"], {"a": 1}]
		]"#);
		assert!(matches!(Chain::from_raw(1, across_repeats), Err(LoadError::Malformed(_))));
	}

	#[test]
	fn test_merges_repeated_windows() {
		let chain = Chain::from_raw(1, raw(r#"[
			[["___BEGIN__"], {"a": 0}],
			[["___BEGIN__"], [["a"], [2]]],
			[["a"], {"___END__": 1}]
		]"#)).unwrap();
		let mut rng = StdRng::seed_from_u64(4);

		assert!(chain.is_valid());
		assert_eq!(chain.walk(&mut rng, 10), vec!["a"]);
	}

	#[test]
	fn test_wide_state_loads_quickly() {
		let words = 40_000;
		let wide: BTreeMap<String, u64> = (0..words).map(|i| (format!("w{i}"), 1)).collect();
		let mut chain = vec![(vec![BEGIN.to_owned()], RawTransitions::Counts(wide))];
		chain.extend((0..words).map(|i| {
			(vec![format!("w{i}")], RawTransitions::Compiled(vec![END.to_owned()], vec![1]))
		}));

		let start = Instant::now();
		let chain = Chain::from_raw(1, chain).unwrap();
		assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());

		let mut rng = StdRng::seed_from_u64(8);
		let sentence = chain.walk(&mut rng, 10);
		assert_eq!(sentence.len(), 1);
		assert!(sentence[0].starts_with('w'));
	}
}
