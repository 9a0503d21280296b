use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::store::DEFAULT_MAX_LENGTH;
use crate::pipeline::retry::DEFAULT_ATTEMPTS;

pub const DEFAULT_BROKERS: &str = "localhost:9092";
pub const DEFAULT_TOPIC: &str = "social-firehose";
pub const DEFAULT_RATE: u32 = 10;
pub const DEFAULT_SPAM_PROPORTION: f64 = 0.95;
pub const DEFAULT_LEGITIMATE_MODEL: &str = "legitimate_model.json.gz";
pub const DEFAULT_SPAM_MODEL: &str = "spam_model.json.gz";

/// Runtime configuration, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// Comma-separated `host:port` bootstrap servers.
	pub brokers: String,
	pub topic: String,
	/// Messages per second, > 0.
	pub rate: u32,
	/// Fraction of messages drawn from the spam model, in `[0, 1]`.
	pub spam_proportion: f64,
	/// Informational source URI, only logged.
	pub source: Option<String>,
	pub legitimate_model: PathBuf,
	pub spam_model: PathBuf,
	/// Print messages instead of publishing them.
	pub dry_run: bool,
	/// Upper bound, in characters, of a generated text.
	pub max_length: usize,
	/// Stop after this many messages. Runs forever when `None`.
	pub max_messages: Option<u64>,
	/// Seed for reproducible output. Uses OS entropy when `None`.
	pub seed: Option<u64>,
	/// Broker connection attempts before giving up.
	pub connect_attempts: u32,
	/// Keep a `postcard` copy of each parsed model next to its source.
	pub model_cache: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			brokers: DEFAULT_BROKERS.to_owned(),
			topic: DEFAULT_TOPIC.to_owned(),
			rate: DEFAULT_RATE,
			spam_proportion: DEFAULT_SPAM_PROPORTION,
			source: None,
			legitimate_model: PathBuf::from(DEFAULT_LEGITIMATE_MODEL),
			spam_model: PathBuf::from(DEFAULT_SPAM_MODEL),
			dry_run: false,
			max_length: DEFAULT_MAX_LENGTH,
			max_messages: None,
			seed: None,
			connect_attempts: DEFAULT_ATTEMPTS,
			model_cache: false,
		}
	}
}

impl Config {
	/// Checks every value the core depends on.
	///
	/// Broker settings are only checked when messages are actually published.
	///
	/// # Errors
	/// Returns `Error::Config` describing the first invalid value.
	pub fn validate(&self) -> Result<()> {
		if self.rate == 0 {
			return Err(Error::config("rate must be greater than 0"));
		}
		if !(0.0..=1.0).contains(&self.spam_proportion) {
			return Err(Error::config(format!(
				"spam proportion must be between 0.0 and 1.0, got {}",
				self.spam_proportion
			)));
		}
		if self.max_length == 0 {
			return Err(Error::config("max length must be greater than 0"));
		}

		if !self.dry_run {
			if self.topic.trim().is_empty() {
				return Err(Error::config("topic cannot be empty"));
			}
			if self.connect_attempts == 0 {
				return Err(Error::config("connect attempts must be greater than 0"));
			}
			parse_brokers(&self.brokers)?;
		}
		Ok(())
	}

	/// Selection weights for `[legitimate, spam]`.
	pub fn weights(&self) -> [f64; 2] {
		[1.0 - self.spam_proportion, self.spam_proportion]
	}
}

/// Splits a bootstrap server list into `(host, port)` pairs.
///
/// # Errors
/// Returns `Error::Config` if the list is empty or an entry is not `host:port`.
pub fn parse_brokers(brokers: &str) -> Result<Vec<(String, u16)>> {
	let parsed = brokers
		.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(|entry| {
			let (host, port) = entry
				.rsplit_once(':')
				.ok_or_else(|| Error::config(format!("broker {entry:?} is missing a port")))?;
			let host = host.trim_start_matches('[').trim_end_matches(']');
			if host.is_empty() || host.chars().any(char::is_whitespace) {
				return Err(Error::config(format!("broker {entry:?} has an invalid host")));
			}
			match port.parse::<u16>() {
				Ok(port) if port > 0 => Ok((host.to_owned(), port)),
				_ => Err(Error::config(format!("broker {entry:?} has an invalid port"))),
			}
		})
		.collect::<Result<Vec<_>>>()?;

	if parsed.is_empty() {
		return Err(Error::config("at least one broker is required"));
	}
	Ok(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let config = Config::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.weights(), [1.0 - 0.95, 0.95]);
	}

	#[test]
	fn test_invalid_values() {
		let invalid = [
			Config { rate: 0, ..Config::default() },
			Config { spam_proportion: 1.5, ..Config::default() },
			Config { spam_proportion: f64::NAN, ..Config::default() },
			Config { max_length: 0, ..Config::default() },
			Config { topic: " ".to_owned(), ..Config::default() },
			Config { brokers: "localhost".to_owned(), ..Config::default() },
			Config { connect_attempts: 0, ..Config::default() },
		];
		for config in invalid {
			assert!(matches!(config.validate(), Err(Error::Config(_))), "{config:?}");
		}
	}

	#[test]
	fn test_dry_run_ignores_broker_settings() {
		let config = Config { dry_run: true, brokers: String::new(), topic: String::new(), ..Config::default() };
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_parse_brokers() {
		assert_eq!(
			parse_brokers("kafka-0:9092, kafka-1:9093,[::1]:9094").unwrap(),
			vec![
				("kafka-0".to_owned(), 9092),
				("kafka-1".to_owned(), 9093),
				("::1".to_owned(), 9094),
			]
		);

		for invalid in ["", " , ", "host:", ":9092", "host:99999", "host:0", "my host:9092"] {
			assert!(parse_brokers(invalid).is_err(), "{invalid:?}");
		}
	}
}
