//! Synthetic social-media update generation.
//!
//! This crate holds everything between a resolved [`Config`] and a message sink:
//! - Word-level Markov text models loaded from gzip-compressed JSON
//! - Weighted selection between a legitimate and a spam model
//! - A lazy, infinite generation loop
//! - Rate limiting, running counts and sink delivery
//!
//! Argument parsing, logging setup and the Kafka client live in the
//! `update-gen-producer` binary, which hands a validated `Config` to
//! [`bootstrap::start`].

/// Text models, model loading, weighted selection and the generation loop.
pub mod model;

/// Pacing, instrumentation, sinks and connection retry around the generation loop.
pub mod pipeline;

/// Startup sequence: validate, load models, connect, run.
pub mod bootstrap;

/// Immutable runtime configuration.
pub mod config;

/// Error taxonomy shared by the core and the producer binary.
pub mod error;

/// The single message type flowing from the generator to a sink.
pub mod message;

/// I/O utilities (gzip reading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use config::Config;
pub use error::{Error, LoadError, Result};
pub use message::GeneratedMessage;
