use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use update_gen_core::config::{
	Config, DEFAULT_BROKERS, DEFAULT_LEGITIMATE_MODEL, DEFAULT_RATE, DEFAULT_SPAM_MODEL,
	DEFAULT_SPAM_PROPORTION, DEFAULT_TOPIC,
};
use update_gen_core::model::store::DEFAULT_MAX_LENGTH;
use update_gen_core::pipeline::retry::DEFAULT_ATTEMPTS;
use update_gen_core::{Error, Result};

/// Whether this build can publish to Kafka at all.
const KAFKA_ENABLED: bool = cfg!(feature = "kafka");

/// Command line of the update generator.
///
/// Every option can be overridden by its environment variable; a non-empty
/// environment value always wins over the command line.
#[derive(Parser, Debug)]
#[command(name = "update-gen", version, about = "Emit synthetic social media updates on Kafka")]
pub struct Args {
	/// Print updates, don't send them to Kafka, env variable DRY_RUN
	#[arg(long)]
	pub dry_run: bool,

	/// The bootstrap servers, env variable KAFKA_BROKERS
	#[arg(long, default_value = DEFAULT_BROKERS)]
	pub brokers: String,

	/// Topic to publish to, env variable KAFKA_TOPIC
	#[arg(long, default_value = DEFAULT_TOPIC)]
	pub topic: String,

	/// Updates per second, env variable RATE
	#[arg(long, default_value_t = DEFAULT_RATE)]
	pub rate: u32,

	/// Fraction of updates that are spam, env variable SPAM_PROPORTION
	#[arg(long, default_value_t = DEFAULT_SPAM_PROPORTION)]
	pub spam_proportion: f64,

	/// The source URI for data to emit, env variable SOURCE_URI
	#[arg(long)]
	pub source: Option<String>,

	/// The gzipped legitimate model file, env variable LEGITIMATE_MODEL
	#[arg(long, default_value = DEFAULT_LEGITIMATE_MODEL)]
	pub legitimate_model: PathBuf,

	/// The gzipped spam model file, env variable SPAM_MODEL
	#[arg(long, default_value = DEFAULT_SPAM_MODEL)]
	pub spam_model: PathBuf,

	/// Maximum characters per update, env variable MAX_LENGTH
	#[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
	pub max_length: usize,

	/// Stop after this many updates, env variable MESSAGE_COUNT
	#[arg(long)]
	pub count: Option<u64>,

	/// Random seed for reproducible output, env variable SEED
	#[arg(long)]
	pub seed: Option<u64>,

	/// Broker connection attempts before giving up, env variable CONNECT_ATTEMPTS
	#[arg(long, default_value_t = DEFAULT_ATTEMPTS)]
	pub connect_attempts: u32,

	/// Cache parsed models next to their source file, env variable MODEL_CACHE
	#[arg(long)]
	pub model_cache: bool,
}

impl Args {
	/// Applies environment overrides and produces the final configuration.
	///
	/// `lookup` returns the raw value of an environment variable.
	///
	/// # Errors
	/// Returns `Error::Config` if an environment value cannot be parsed.
	pub fn resolve<F>(self, lookup: F) -> Result<Config>
	where
		F: Fn(&str) -> Option<String>,
	{
		let env = Environment { lookup };

		Ok(Config {
			brokers: env.string("KAFKA_BROKERS", self.brokers),
			topic: env.string("KAFKA_TOPIC", self.topic),
			rate: env.parsed("RATE", self.rate)?,
			spam_proportion: env.parsed("SPAM_PROPORTION", self.spam_proportion)?,
			source: env.get("SOURCE_URI").or(self.source),
			legitimate_model: env.parsed("LEGITIMATE_MODEL", self.legitimate_model)?,
			spam_model: env.parsed("SPAM_MODEL", self.spam_model)?,
			dry_run: env.flag("DRY_RUN", self.dry_run)? || !KAFKA_ENABLED,
			max_length: env.parsed("MAX_LENGTH", self.max_length)?,
			max_messages: env.optional("MESSAGE_COUNT")?.or(self.count),
			seed: env.optional("SEED")?.or(self.seed),
			connect_attempts: env.parsed("CONNECT_ATTEMPTS", self.connect_attempts)?,
			model_cache: env.flag("MODEL_CACHE", self.model_cache)?,
		})
	}
}

/// Environment lookups where an empty value counts as unset.
struct Environment<F> {
	lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Environment<F> {
	fn get(&self, key: &str) -> Option<String> {
		(self.lookup)(key).filter(|value| !value.is_empty())
	}

	fn string(&self, key: &str, fallback: String) -> String {
		self.get(key).unwrap_or(fallback)
	}

	fn optional<T>(&self, key: &str) -> Result<Option<T>>
	where
		T: FromStr,
		T::Err: Display,
	{
		self.get(key)
			.map(|raw| {
				raw.trim()
					.parse::<T>()
					.map_err(|e| Error::Config(format!("{key}={raw:?}: {e}")))
			})
			.transpose()
	}

	fn parsed<T>(&self, key: &str, fallback: T) -> Result<T>
	where
		T: FromStr,
		T::Err: Display,
	{
		Ok(self.optional(key)?.unwrap_or(fallback))
	}

	fn flag(&self, key: &str, fallback: bool) -> Result<bool> {
		let Some(raw) = self.get(key) else {
			return Ok(fallback);
		};
		match raw.trim().to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" | "on" => Ok(true),
			"0" | "false" | "no" | "off" => Ok(false),
			_ => Err(Error::Config(format!("{key}={raw:?}: expected a boolean"))),
		}
	}
}
