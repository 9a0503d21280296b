use std::time::Duration;

use log::{info, warn};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{BaseRecord, DefaultProducerContext, Producer, ThreadedProducer};

use update_gen_core::config::Config;
use update_gen_core::message::GeneratedMessage;
use update_gen_core::pipeline::retry::RetryPolicy;
use update_gen_core::pipeline::sink::Sink;
use update_gen_core::{Error, Result};

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fire-and-forget publisher on a single topic.
///
/// Delivery reports are not awaited; queued messages are flushed on drop.
pub struct KafkaSink {
	producer: ThreadedProducer<DefaultProducerContext>,
	topic: String,
}

impl KafkaSink {
	/// Creates the producer and waits until the brokers answer a metadata request.
	///
	/// # Errors
	/// - `Error::Config` if the client rejects the settings.
	/// - `Error::Connect` once `config.connect_attempts` metadata requests have failed.
	pub fn connect(config: &Config) -> Result<Self> {
		let producer: ThreadedProducer<DefaultProducerContext> = ClientConfig::new()
			.set("bootstrap.servers", &config.brokers)
			.set("message.timeout.ms", "5000")
			.create()
			.map_err(|e| Error::Config(format!("invalid producer settings: {e}")))?;

		let metadata = RetryPolicy::new(config.connect_attempts).run("broker metadata request", |_| {
			producer.client().fetch_metadata(None, METADATA_TIMEOUT)
		})?;
		info!("connected to {} broker(s)", metadata.brokers().len());

		Ok(Self { producer, topic: config.topic.clone() })
	}
}

impl Sink for KafkaSink {
	fn publish(&mut self, message: &GeneratedMessage) -> Result<()> {
		let payload = message.to_json()?;
		let record: BaseRecord<(), str, ()> = BaseRecord::to(&self.topic).payload(payload.as_str());

		self.producer
			.send(record)
			.map_err(|(e, _)| Error::Publish(e.to_string()))
	}
}

impl Drop for KafkaSink {
	fn drop(&mut self) {
		if let Err(e) = self.producer.flush(FLUSH_TIMEOUT) {
			warn!("could not flush pending updates: {e}");
		}
	}
}
