use log::info;

/// A checkpoint is reported every this many messages.
pub const REPORT_EVERY: u64 = 100;

/// Snapshot of the running counts at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
	pub total: u64,
	pub legitimate: u64,
	pub spam: u64,
	/// `spam / (legitimate + spam)`, `None` while both are zero.
	pub spam_fraction: Option<f64>,
}

/// Per-model emission counts.
///
/// Index 0 is the legitimate model, index 1 the spam model. Purely
/// observational: recording never fails and never changes control flow.
#[derive(Debug, Clone, Default)]
pub struct MetricsCounter {
	counts: Vec<u64>,
	total: u64,
}

impl MetricsCounter {
	/// Creates zeroed counts for `models` models.
	pub fn new(models: usize) -> Self {
		Self { counts: vec![0; models], total: 0 }
	}

	/// Records one emission from `model_index`.
	///
	/// Returns (and logs) a checkpoint every `REPORT_EVERY` messages.
	/// An unknown index only counts toward the total.
	pub fn record(&mut self, model_index: usize) -> Option<Checkpoint> {
		if let Some(count) = self.counts.get_mut(model_index) {
			*count += 1;
		}
		self.total += 1;

		if self.total % REPORT_EVERY != 0 {
			return None;
		}

		let checkpoint = self.checkpoint();
		match checkpoint.spam_fraction {
			Some(fraction) => info!(
				"{} legitimate, {} spam, spam fraction {:.4}",
				checkpoint.legitimate, checkpoint.spam, fraction
			),
			None => info!("{} messages, no legitimate or spam message yet", checkpoint.total),
		}
		Some(checkpoint)
	}

	/// Returns the current counts as a checkpoint.
	pub fn checkpoint(&self) -> Checkpoint {
		let legitimate = self.count(0);
		let spam = self.count(1);
		let emitted = legitimate + spam;

		Checkpoint {
			total: self.total,
			legitimate,
			spam,
			spam_fraction: (emitted > 0).then(|| spam as f64 / emitted as f64),
		}
	}

	/// Returns the number of messages recorded for `model_index`.
	pub fn count(&self, model_index: usize) -> u64 {
		self.counts.get(model_index).copied().unwrap_or_default()
	}

	/// Returns the number of messages recorded overall.
	pub fn total(&self) -> u64 {
		self.total
	}
}
