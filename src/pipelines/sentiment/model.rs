use std::sync::Arc;

use super::vocab::TokenSequence;
use crate::error::Result;

/// A frozen sentiment model: token sequences in, positive-class probabilities out.
///
/// Implementations must return exactly one score in `[0, 1]` per input sequence, in input
/// order, and a sequence's score must not depend on what else shares its batch.
pub trait SentimentModel {
    /// Run one forward pass over `batch`.
    fn infer(&self, batch: &[TokenSequence]) -> Result<Vec<f32>>;
}

impl<M: SentimentModel + ?Sized> SentimentModel for Arc<M> {
    fn infer(&self, batch: &[TokenSequence]) -> Result<Vec<f32>> {
        (**self).infer(batch)
    }
}

impl<M: SentimentModel + ?Sized> SentimentModel for Box<M> {
    fn infer(&self, batch: &[TokenSequence]) -> Result<Vec<f32>> {
        (**self).infer(batch)
    }
}
