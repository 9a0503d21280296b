use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a model file could not be turned into a usable text model.
#[derive(Error, Debug)]
pub enum LoadError {
	#[error("read failed: {0}")]
	Io(#[from] io::Error),

	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),

	/// The JSON parsed but does not describe a usable chain.
	#[error("malformed model: {0}")]
	Malformed(String),

	#[error("unreadable model cache: {0}")]
	Cache(#[from] postcard::Error),
}

/// Main error type for update generation.
#[derive(Error, Debug)]
pub enum Error {
	/// A model file is missing, unreadable or malformed
	#[error("failed to load model {}: {source}", .path.display())]
	Load {
		path: PathBuf,
		#[source]
		source: LoadError,
	},

	/// Invalid rate, weights, proportion, broker address or override value
	#[error("invalid configuration: {0}")]
	Config(String),

	/// The broker could not be reached within the retry budget
	#[error("connection failed after {attempts} attempt(s): {message}")]
	Connect { attempts: u32, message: String },

	/// The broker client refused a message
	#[error("publish failed: {0}")]
	Publish(String),

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

/// Result type alias for update generation.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub(crate) fn config(message: impl Into<String>) -> Self {
		Error::Config(message.into())
	}
}
