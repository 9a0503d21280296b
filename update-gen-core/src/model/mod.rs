//! Text models and the generation loop.
//!
//! This module provides:
//! - Word-level Markov chains (`Chain`) and their states (`State`)
//! - Sentence generation with length and originality bounds (`TextModel`)
//! - Model loading from gzip-compressed JSON (`store`)
//! - Weighted model selection (`WeightedSelector`)
//! - The endless update sequence (`UpdateGenerator`)

/// Endless, lazy sequence of generated updates.
///
/// Combines weighted model selection with bounded sample generation.
pub mod generator;

/// Weighted random choice between models through a cumulative table.
pub mod selector;

/// Model loading (with optional `postcard` cache) and the `TextSource` seam.
pub mod store;

/// Sentence generator over a Markov chain, parsed from the serialized model layout.
pub mod text_model;

/// Word-level Markov chain of a fixed order.
///
/// Handles parsing of plain and compiled transitions and bounded walks.
pub mod chain;

/// Outgoing transitions of a single chain state.
///
/// Supports weighted random sampling.
mod state;

#[cfg(test)]
pub(crate) mod fixtures;
