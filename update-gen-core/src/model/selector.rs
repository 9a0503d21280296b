use rand::Rng;

use crate::error::{Error, Result};

/// Picks one of several models at random, in proportion to fixed weights.
///
/// # Invariants
/// - `table` holds `(cumulative probability, model index)` pairs in model order
/// - Cumulative probabilities are non-decreasing and the last one is 1.0
/// - Zero-weight models have no entry, so they can never be chosen
#[derive(Debug)]
pub struct WeightedSelector<M> {
	models: Vec<M>,
	table: Vec<(f64, usize)>,
}

impl<M> WeightedSelector<M> {
	/// Builds the cumulative table for `models`.
	///
	/// Omitted weights are all treated as 1.
	///
	/// # Errors
	/// Returns `Error::Config` if there are no models, if the weight count does not
	/// match, if a weight is negative or not finite, or if the weights sum to zero.
	pub fn build(models: Vec<M>, weights: Option<&[f64]>) -> Result<Self> {
		if models.is_empty() {
			return Err(Error::config("at least one model is required"));
		}

		let weights = match weights {
			Some(weights) if weights.len() != models.len() => {
				return Err(Error::config(format!(
					"{} weights given for {} models",
					weights.len(),
					models.len()
				)));
			}
			Some(weights) => weights.to_vec(),
			None => vec![1.0; models.len()],
		};

		if let Some(weight) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
			return Err(Error::config(format!("weights must be non-negative, got {weight}")));
		}

		let total: f64 = weights.iter().sum();
		if total <= 0.0 {
			return Err(Error::config("weights must not sum to zero"));
		}

		let mut table = Vec::with_capacity(weights.len());
		let mut running = 0.0;
		for (index, weight) in weights.iter().enumerate() {
			running += weight;
			if *weight > 0.0 {
				table.push((running / total, index));
			}
		}
		if let Some(last) = table.last_mut() {
			last.0 = 1.0;
		}

		Ok(Self { models, table })
	}

	/// Draws one model.
	///
	/// Scans the table for the first cumulative value `>= r`, with `r` uniform in
	/// `[0, 1)`. The table has one entry per model, so a linear scan is enough.
	pub fn choose<R: Rng>(&self, rng: &mut R) -> (usize, &M) {
		let r: f64 = rng.random();
		let index = self
			.table
			.iter()
			.find(|(cumulative, _)| *cumulative >= r)
			.or(self.table.last())
			.map(|(_, index)| *index)
			.unwrap_or_default();

		(index, &self.models[index])
	}

	/// Returns the selection probability of each model, in model order.
	pub fn probabilities(&self) -> Vec<f64> {
		let mut probabilities = vec![0.0; self.models.len()];
		let mut previous = 0.0;
		for (cumulative, index) in &self.table {
			probabilities[*index] = cumulative - previous;
			previous = *cumulative;
		}
		probabilities
	}

	/// Returns the models in selection order.
	pub fn models(&self) -> &[M] {
		&self.models
	}
}
