use std::io::Write;

use crate::error::Result;
use crate::message::GeneratedMessage;

/// Final destination of generated messages.
///
/// Implementations are picked once at startup. An error returned from
/// `publish` ends the generation loop.
pub trait Sink {
	/// Delivers one message. Does not wait for any acknowledgment.
	fn publish(&mut self, message: &GeneratedMessage) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
	fn publish(&mut self, message: &GeneratedMessage) -> Result<()> {
		(**self).publish(message)
	}
}

/// Dry-run sink: one JSON object per line.
///
/// Each line is flushed right away so a reader on a pipe sees it at once.
#[derive(Debug)]
pub struct JsonLineSink<W: Write> {
	writer: W,
}

impl<W: Write> JsonLineSink<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}

	/// Returns the underlying writer.
	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: Write> Sink for JsonLineSink<W> {
	fn publish(&mut self, message: &GeneratedMessage) -> Result<()> {
		writeln!(self.writer, "{}", message.to_json()?)?;
		self.writer.flush()?;
		Ok(())
	}
}
