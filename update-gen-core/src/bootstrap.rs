use std::io::Write;
use std::path::Path;

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::Config;
use crate::error::Result;
use crate::model::generator::UpdateGenerator;
use crate::model::selector::WeightedSelector;
use crate::model::store::{self, ModelHandle};
use crate::pipeline::{self, metrics::MetricsCounter, rate::RateLimiter, sink::{JsonLineSink, Sink}};

/// Loads both models and builds the generator mixing them.
///
/// The legitimate model gets index 0 and the spam model index 1.
///
/// # Errors
/// - `Error::Load` if either model cannot be loaded. Nothing else is attempted.
/// - `Error::Config` if the spam proportion yields invalid weights.
pub fn build_generator(config: &Config) -> Result<UpdateGenerator<ModelHandle>> {
	info!(
		"loading models from {}, {}",
		config.legitimate_model.display(),
		config.spam_model.display()
	);
	let load = |path: &Path| {
		if config.model_cache { store::load_cached(path) } else { store::load(path) }
	};

	let legitimate = load(config.legitimate_model.as_path())?;
	info!("loaded legitimate model {}", legitimate.name());
	let spam = load(config.spam_model.as_path())?;
	info!("loaded spam model {}", spam.name());

	let selector = WeightedSelector::build(vec![legitimate, spam], Some(&config.weights()[..]))?;
	if let [legitimate, spam] = selector.probabilities()[..] {
		info!("selection probabilities: legitimate {legitimate:.3}, spam {spam:.3}");
	}
	let rng = match config.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	Ok(UpdateGenerator::new(selector, rng, config.max_length))
}

/// Validates `config`, loads the models, sets up the sink and runs the loop.
///
/// # Behavior
/// - In dry-run mode, messages are written as JSON lines to `out` and
///   `connect` is never called.
/// - Otherwise `connect` builds the broker sink before the first message.
/// - Returns after `config.max_messages` messages; never returns otherwise,
///   unless an error occurs.
///
/// # Errors
/// Any configuration, load, connection or publish error, unchanged.
pub fn start<'a, W, F>(config: &Config, out: W, connect: F) -> Result<u64>
where
	W: Write + 'a,
	F: FnOnce(&Config) -> Result<Box<dyn Sink + 'a>>,
{
	config.validate()?;
	log_config(config);

	let generator = build_generator(config)?;
	let limiter = RateLimiter::new(config.rate)?;

	let mut sink: Box<dyn Sink + 'a> = if config.dry_run {
		Box::new(JsonLineSink::new(out))
	} else {
		info!("creating producer for {}", config.brokers);
		connect(config)?
	};

	let mut metrics = MetricsCounter::new(generator.selector().models().len());
	info!("sending updates");
	pipeline::run(generator, &limiter, &mut metrics, &mut sink, config.max_messages)
}

fn log_config(config: &Config) {
	info!("brokers={}", config.brokers);
	info!("topic={}", config.topic);
	info!("rate={}", config.rate);
	info!("spam_proportion={}", config.spam_proportion);
	info!("source={}", config.source.as_deref().unwrap_or("None"));
	info!("dry_run={}", config.dry_run);
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::error::{Error, LoadError};
	use crate::model::fixtures;

	fn dry_run_config(dir: &Path) -> Config {
		Config {
			legitimate_model: fixtures::write_model(dir, "legitimate_model.json.gz", "lovely weather today"),
			spam_model: fixtures::write_model(dir, "spam_model.json.gz", "click here for free stuff"),
			dry_run: true,
			rate: 1_000,
			max_messages: Some(5),
			seed: Some(17),
			..Config::default()
		}
	}

	#[test]
	fn test_dry_run_prints_json_lines() {
		let dir = tempfile::tempdir().unwrap();
		let config = dry_run_config(dir.path());
		let mut out = Vec::new();

		let sent = start(&config, &mut out, |_| panic!("dry run must not connect")).unwrap();

		assert_eq!(sent, 5);
		let output = String::from_utf8(out).unwrap();
		let lines: Vec<&str> = output.lines().collect();
		assert_eq!(lines.len(), 5);
		for line in lines {
			let value: serde_json::Value = serde_json::from_str(line).unwrap();
			let object = value.as_object().unwrap();
			assert_eq!(object.len(), 1);
			let text = object["text"].as_str().unwrap();
			assert!(["lovely weather today", "click here for free stuff"].contains(&text));
		}
	}

	#[test]
	fn test_missing_model_aborts_before_anything() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config {
			legitimate_model: dir.path().join("nowhere.json.gz"),
			..dry_run_config(dir.path())
		};
		let mut out = Vec::new();

		let result = start(&config, &mut out, |_| panic!("dry run must not connect"));

		assert!(matches!(result, Err(Error::Load { source: LoadError::Io(_), .. })));
		assert!(out.is_empty());
	}

	#[test]
	fn test_missing_model_never_connects() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config {
			spam_model: dir.path().join("nowhere.json.gz"),
			dry_run: false,
			..dry_run_config(dir.path())
		};
		let connected = Cell::new(false);

		let result = start(&config, Vec::new(), |_| {
			connected.set(true);
			Err(Error::Connect { attempts: 1, message: "unreachable".to_owned() })
		});

		assert!(matches!(result, Err(Error::Load { .. })));
		assert!(!connected.get());
	}

	#[test]
	fn test_publish_mode_uses_connected_sink() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config { dry_run: false, ..dry_run_config(dir.path()) };
		let mut published = Vec::new();

		let sent = start(&config, std::io::sink(), |config| {
			assert_eq!(config.topic, "social-firehose");
			Ok(Box::new(JsonLineSink::new(&mut published)))
		})
		.unwrap();

		assert_eq!(sent, 5);
		assert_eq!(String::from_utf8(published).unwrap().lines().count(), 5);
	}

	#[test]
	fn test_invalid_config_fails_fast() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config { rate: 0, ..dry_run_config(dir.path()) };

		assert!(matches!(start(&config, Vec::new(), |_| panic!()), Err(Error::Config(_))));
	}

	#[test]
	fn test_spam_proportion_drives_the_mix() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config { spam_proportion: 1.0, ..dry_run_config(dir.path()) };

		let texts: Vec<String> = build_generator(&config).unwrap().take(50).map(|m| m.text).collect();
		assert!(texts.iter().all(|text| text == "click here for free stuff"));
	}
}
