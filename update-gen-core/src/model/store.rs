use std::path::Path;

use log::{error, info, warn};
use rand::Rng;

use super::text_model::TextModel;
use crate::error::{Error, LoadError, Result};
use crate::io::{build_output_path, get_filename, is_newer, read_gzip_text};

/// Default upper bound, in characters, of a generated sample.
pub const DEFAULT_MAX_LENGTH: usize = 200;

/// Attempts allowed to produce a sample short enough.
pub const DEFAULT_TRIES: usize = 10;

/// Anything able to produce short text samples.
///
/// The generation loop only needs these two operations, which keeps the
/// text algorithm itself out of the selection and delivery logic.
pub trait TextSource {
	/// Produces a sample of at most `max_length` characters. Never blocks.
	fn generate<R: Rng>(&self, rng: &mut R, max_length: usize) -> String;

	/// Returns true if the source can produce samples at all.
	fn is_valid(&self) -> bool;
}

/// A loaded text model.
///
/// Immutable once loaded and owned by whoever loaded it.
#[derive(Clone, Debug)]
pub struct ModelHandle {
	name: String,
	model: TextModel,
}

impl ModelHandle {
	/// Wraps an already parsed model.
	pub fn new(name: impl Into<String>, model: TextModel) -> Self {
		Self { name: name.into(), model }
	}

	/// Returns the model name (file name without extensions).
	pub fn name(&self) -> &str {
		&self.name
	}
}

impl TextSource for ModelHandle {
	fn generate<R: Rng>(&self, rng: &mut R, max_length: usize) -> String {
		self.model.make_short_sentence(rng, max_length, DEFAULT_TRIES)
	}

	fn is_valid(&self) -> bool {
		self.model.is_valid()
	}
}

/// Loads a model from a gzip-compressed JSON file.
///
/// # Errors
/// Returns `Error::Load` on I/O failure or malformed content. The failure is
/// logged here; deciding whether it is fatal is left to the caller.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ModelHandle> {
	let path = path.as_ref();
	match read_model(path) {
		Ok(model) => {
			info!("parsed model {} with state size {}", path.display(), model.state_size());
			Ok(ModelHandle::new(model_name(path), model))
		}
		Err(source) => Err(load_failed(path, source)),
	}
}

/// Loads a model, going through a `postcard` cache stored next to it.
///
/// # Behavior
/// - Uses `<stem>.bin` when it is at least as recent as the source file.
/// - Otherwise parses the source and rewrites the cache.
/// - An unreadable cache falls back to the source; a failed cache write is only logged.
pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<ModelHandle> {
	let path = path.as_ref();
	let cache_path = build_output_path(path, "bin").map_err(|e| load_failed(path, e.into()))?;

	if is_newer(&cache_path, path) {
		match read_cache(&cache_path) {
			Ok(model) => {
				info!("loaded model {} from cache {}", path.display(), cache_path.display());
				return Ok(ModelHandle::new(model_name(path), model));
			}
			Err(e) => warn!("ignoring model cache {}: {e}", cache_path.display()),
		}
	}

	let handle = load(path)?;
	let written = postcard::to_stdvec(&handle.model)
		.map_err(LoadError::from)
		.and_then(|bytes| std::fs::write(&cache_path, bytes).map_err(LoadError::from));
	if let Err(e) = written {
		warn!("could not write model cache {}: {e}", cache_path.display());
	}
	Ok(handle)
}

fn read_model(path: &Path) -> std::result::Result<TextModel, LoadError> {
	TextModel::from_json(&read_gzip_text(path)?)
}

fn read_cache(path: &Path) -> std::result::Result<TextModel, LoadError> {
	let model: TextModel = postcard::from_bytes(&std::fs::read(path)?)?;
	if !model.is_valid() {
		return Err(LoadError::Malformed("cached chain has no begin state".to_owned()));
	}
	Ok(model)
}

fn model_name(path: &Path) -> String {
	get_filename(path).unwrap_or_else(|_| path.display().to_string())
}

fn load_failed(path: &Path, source: LoadError) -> Error {
	error!("failed to load model {}: {source}", path.display());
	Error::Load { path: path.to_path_buf(), source }
}
