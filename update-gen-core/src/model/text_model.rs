use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain::{Chain, RawChain};
use crate::error::LoadError;

/// Longest share of a candidate allowed to match the training text verbatim.
const MAX_OVERLAP_RATIO: f64 = 0.7;

/// Longest run of words allowed to match the training text verbatim.
const MAX_OVERLAP_TOTAL: usize = 15;

/// `chain` is stored either as a JSON-encoded string or inline.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawChainField {
	Encoded(String),
	Inline(RawChain),
}

/// On-disk layout of a serialized text model.
#[derive(Deserialize)]
struct RawTextModel {
	state_size: usize,
	chain: RawChainField,
	#[serde(default)]
	parsed_sentences: Option<Vec<Vec<String>>>,
}

/// A sentence generator backed by a word-level Markov chain.
///
/// # Responsibilities
/// - Parse the serialized model layout (`state_size`, `chain`, `parsed_sentences`)
/// - Walk the chain to build candidate sentences
/// - Reject candidates copied from the training text, when it was retained
/// - Bound sentence length with a finite number of attempts
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TextModel {
	chain: Chain,

	/// Training sentences joined with spaces, if the model retained them.
	rejoined_text: Option<String>,
}

impl TextModel {
	/// Parses a serialized model.
	///
	/// # Errors
	/// - `LoadError::Json` if the document or the encoded chain is not valid JSON
	/// - `LoadError::Malformed` if the chain is inconsistent or cannot start a sentence
	pub fn from_json(json: &str) -> Result<Self, LoadError> {
		let raw: RawTextModel = serde_json::from_str(json)?;
		let raw_chain = match raw.chain {
			RawChainField::Encoded(encoded) => serde_json::from_str(&encoded)?,
			RawChainField::Inline(chain) => chain,
		};

		let model = Self {
			chain: Chain::from_raw(raw.state_size, raw_chain)?,
			rejoined_text: raw.parsed_sentences.map(|sentences| {
				sentences
					.iter()
					.map(|words| words.join(" "))
					.collect::<Vec<_>>()
					.join(" ")
			}),
		};

		if !model.is_valid() {
			return Err(LoadError::Malformed("chain has no begin state".to_owned()));
		}
		Ok(model)
	}

	/// Returns true if the model can start a sentence.
	pub fn is_valid(&self) -> bool {
		self.chain.is_valid()
	}

	/// Returns the number of words the model conditions on.
	pub fn state_size(&self) -> usize {
		self.chain.state_size()
	}

	/// Generates a sentence, retrying up to `tries` times to obtain an original one.
	///
	/// Walks are capped at `max_words` words. Returns `None` if every attempt
	/// was rejected by the originality check.
	pub fn make_sentence<R: Rng>(&self, rng: &mut R, tries: usize, max_words: usize) -> Option<String> {
		(0..tries)
			.map(|_| self.chain.walk(rng, max_words))
			.find(|words| self.test_output(words))
			.map(|words| words.join(" "))
	}

	/// Generates a sentence of at most `max_length` characters.
	///
	/// # Behavior
	/// - Calls `make_sentence` up to `tries` times and returns the first short enough result.
	/// - If every attempt is too long, returns the last one truncated to `max_length`.
	/// - If no original sentence was produced at all, returns an empty string.
	///
	/// # Notes
	/// - Length is counted in characters, not bytes.
	/// - At most `tries * tries` walks are performed, so the call always returns.
	pub fn make_short_sentence<R: Rng>(&self, rng: &mut R, max_length: usize, tries: usize) -> String {
		let mut fallback = None;
		for _ in 0..tries {
			let Some(sentence) = self.make_sentence(rng, tries, max_length.saturating_add(1)) else {
				continue;
			};
			if sentence.chars().count() <= max_length {
				return sentence;
			}
			fallback = Some(sentence);
		}

		fallback
			.map(|sentence| sentence.chars().take(max_length).collect::<String>().trim_end().to_owned())
			.unwrap_or_default()
	}

	/// Checks a candidate against the retained training text.
	///
	/// Every run of `min(15, round(0.7 * len)) + 1` consecutive words must be
	/// absent from the training text. Always passes when nothing was retained.
	fn test_output(&self, words: &[String]) -> bool {
		let Some(rejoined_text) = &self.rejoined_text else {
			return true;
		};

		let overlap_ratio = (MAX_OVERLAP_RATIO * words.len() as f64).round_ties_even() as usize;
		let overlap_max = MAX_OVERLAP_TOTAL.min(overlap_ratio);
		let gram_count = words.len().saturating_sub(overlap_max).max(1);

		(0..gram_count).all(|i| {
			let end = words.len().min(i + overlap_max + 1);
			!rejoined_text.contains(&words[i..end].join(" "))
		})
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use serde_json::json;

	use super::*;
	use crate::model::fixtures;

	#[test]
	fn test_from_json_encoded_chain() {
		let model = TextModel::from_json(&fixtures::model_json(&["hello world"], false)).unwrap();
		let mut rng = StdRng::seed_from_u64(1);

		assert_eq!(model.state_size(), 2);
		assert_eq!(model.make_short_sentence(&mut rng, 200, 10), "hello world");
	}

	#[test]
	fn test_from_json_inline_chain() {
		let json = json!({
			"state_size": 1,
			"chain": [[["___BEGIN__"], {"hi": 2}], [["hi"], {"___END__": 2}]],
		});
		let model = TextModel::from_json(&json.to_string()).unwrap();
		let mut rng = StdRng::seed_from_u64(1);

		assert_eq!(model.make_short_sentence(&mut rng, 200, 10), "hi");
	}

	#[test]
	fn test_from_json_rejects_garbage() {
		assert!(matches!(TextModel::from_json("{\"state_size\": 2}"), Err(LoadError::Json(_))));
		assert!(matches!(
			TextModel::from_json(&json!({"state_size": 2, "chain": "not json"}).to_string()),
			Err(LoadError::Json(_))
		));
	}

	#[test]
	fn test_from_json_rejects_chain_without_start() {
		let json = json!({"state_size": 1, "chain": [[["a"], {"b": 1}]]});
		assert!(matches!(TextModel::from_json(&json.to_string()), Err(LoadError::Malformed(_))));
	}

	#[test]
	fn test_from_json_rejects_out_of_range_content() {
		let overflowing = json!({
			"state_size": 1,
			"chain": [[["___BEGIN__"], {"a": u64::MAX, "b": 1}], [["a"], {"___END__": 1}]],
		});
		let oversized = json!({"state_size": usize::MAX / 4, "chain": []});

		for json in [overflowing, oversized] {
			assert!(matches!(TextModel::from_json(&json.to_string()), Err(LoadError::Malformed(_))), "{json}");
		}
	}

	#[test]
	fn test_short_sentence_never_exceeds_max_length() {
		let sentences = [
			"the quick brown fox jumps over the lazy dog",
			"the lazy dog sleeps all day long in the sun",
			"a quick brown cat sleeps over the fox",
		];
		let model = TextModel::from_json(&fixtures::model_json(&sentences, false)).unwrap();
		let mut rng = StdRng::seed_from_u64(11);

		for max_length in [0, 1, 5, 12, 20, 200] {
			for _ in 0..200 {
				let sentence = model.make_short_sentence(&mut rng, max_length, 10);
				assert!(sentence.chars().count() <= max_length, "{sentence:?} > {max_length}");
			}
		}
	}

	#[test]
	fn test_short_sentence_falls_back_to_truncation() {
		let model = TextModel::from_json(&fixtures::model_json(&["hello world"], false)).unwrap();
		let mut rng = StdRng::seed_from_u64(2);

		assert_eq!(model.make_short_sentence(&mut rng, 7, 3), "hello w");
		assert_eq!(model.make_short_sentence(&mut rng, 6, 3), "hello");
	}

	#[test]
	fn test_retained_text_rejects_copies() {
		let model = TextModel::from_json(&fixtures::model_json(&["hello world"], true)).unwrap();
		let mut rng = StdRng::seed_from_u64(4);

		assert_eq!(model.make_sentence(&mut rng, 10, 100), None);
		assert_eq!(model.make_short_sentence(&mut rng, 200, 10), "");
	}

	#[test]
	fn test_retained_text_accepts_new_combinations() {
		let words: Vec<String> = "one two three four five six seven eight"
			.split(' ')
			.map(str::to_owned)
			.collect();
		let model = TextModel::from_json(&fixtures::model_json(&["one two three four"], true)).unwrap();

		assert!(!model.test_output(&words[..4]));
		assert!(model.test_output(&words[2..]));
	}
}
