use std::error::Error;
use std::{env, io};

use clap::Parser;
use env_logger::Env;
use log::info;

use update_gen_core::bootstrap;
use update_gen_core::config::Config;
use update_gen_core::pipeline::sink::Sink;

mod cli;
#[cfg(feature = "kafka")]
mod kafka;

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
	info!("starting update-gen");

	let config = cli::Args::parse().resolve(|key| env::var(key).ok())?;
	let sent = bootstrap::start(&config, io::stdout().lock(), connect)?;

	info!("exiting after {sent} updates");
	Ok(())
}

#[cfg(feature = "kafka")]
fn connect(config: &Config) -> update_gen_core::Result<Box<dyn Sink>> {
	Ok(Box::new(kafka::KafkaSink::connect(config)?))
}

#[cfg(not(feature = "kafka"))]
fn connect(_config: &Config) -> update_gen_core::Result<Box<dyn Sink>> {
	Err(update_gen_core::Error::Config("built without the kafka feature".to_owned()))
}
