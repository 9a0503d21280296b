use serde::Serialize;

use crate::error::Result;

/// One generated update, tagged with the model that produced it.
///
/// Created per generation step and consumed right away by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
	pub text: String,
	pub model_index: usize,
}

/// Wire body of a message: a JSON object with a single `text` field.
#[derive(Serialize)]
struct Payload<'a> {
	text: &'a str,
}

impl GeneratedMessage {
	pub fn new(text: impl Into<String>, model_index: usize) -> Self {
		Self { text: text.into(), model_index }
	}

	/// Encodes the wire body, `{"text": "..."}`.
	///
	/// The model index is not part of the payload.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(&Payload { text: &self.text })?)
	}
}
