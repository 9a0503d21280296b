//! Model files for tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::json;

use super::chain::{BEGIN, END};

/// Serializes an order-2 model of `sentences` in the gzip payload layout.
pub(crate) fn model_json(sentences: &[&str], retain_original: bool) -> String {
	let mut chain: BTreeMap<Vec<String>, BTreeMap<String, u64>> = BTreeMap::new();
	let mut parsed = Vec::new();

	for sentence in sentences {
		let words: Vec<String> = sentence.split(' ').map(str::to_owned).collect();
		let mut window = vec![BEGIN.to_owned(), BEGIN.to_owned()];
		for next_word in words.iter().cloned().chain([END.to_owned()]) {
			*chain.entry(window.clone()).or_default().entry(next_word.clone()).or_insert(0) += 1;
			window.remove(0);
			window.push(next_word);
		}
		parsed.push(words);
	}

	let chain: Vec<_> = chain.into_iter().collect();
	json!({
		"state_size": 2,
		"chain": serde_json::to_string(&chain).unwrap(),
		"parsed_sentences": if retain_original { json!(parsed) } else { json!(null) },
	})
	.to_string()
}

/// Writes `content` gzip-compressed to `dir/name`.
pub(crate) fn write_gzip(dir: &Path, name: &str, content: &str) -> PathBuf {
	let path = dir.join(name);
	let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
	encoder.write_all(content.as_bytes()).unwrap();
	encoder.finish().unwrap();
	path
}

/// Writes a model that always produces `sentence`.
pub(crate) fn write_model(dir: &Path, name: &str, sentence: &str) -> PathBuf {
	write_gzip(dir, name, &model_json(&[sentence], false))
}
