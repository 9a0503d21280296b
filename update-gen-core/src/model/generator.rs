use rand::Rng;
use rand::rngs::StdRng;

use crate::message::GeneratedMessage;
use crate::model::selector::WeightedSelector;
use crate::model::store::TextSource;

/// Endless source of generated updates.
///
/// # Responsibilities
/// - Draw a model through the `WeightedSelector` on every pull
/// - Ask that model for a sample bounded by `max_length`
/// - Yield the sample tagged with the model index
///
/// The iterator never ends and holds no buffer: each `next` produces exactly
/// one message. It cannot be rewound; build a new one to start over.
#[derive(Debug)]
pub struct UpdateGenerator<M, R = StdRng> {
	selector: WeightedSelector<M>,
	rng: R,
	max_length: usize,
}

impl<M: TextSource, R: Rng> UpdateGenerator<M, R> {
	/// Creates a generator drawing from `selector` with the given random source.
	pub fn new(selector: WeightedSelector<M>, rng: R, max_length: usize) -> Self {
		Self { selector, rng, max_length }
	}

	/// Returns the selector driving model choice.
	pub fn selector(&self) -> &WeightedSelector<M> {
		&self.selector
	}
}

impl<M: TextSource, R: Rng> Iterator for UpdateGenerator<M, R> {
	type Item = GeneratedMessage;

	fn next(&mut self) -> Option<Self::Item> {
		let (index, model) = self.selector.choose(&mut self.rng);
		let text = model.generate(&mut self.rng, self.max_length);
		Some(GeneratedMessage::new(text, index))
	}
}
