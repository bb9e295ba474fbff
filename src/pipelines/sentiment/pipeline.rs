use serde::Serialize;
use std::sync::Arc;

use super::aggregate::{aggregate, BatchResult};
use super::classify::{classify, Sentiment};
use super::model::SentimentModel;
use super::normalize::normalize;
use super::vocab::{TokenSequence, Vocabulary};
use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;

// ============ Output types ============

/// A sentiment together with the score it was thresholded from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Thresholded label.
    pub sentiment: Sentiment,
    /// Model probability that the review is positive.
    pub score: f32,
}

impl Prediction {
    /// Classify `score` and keep it alongside the label.
    pub fn from_score(score: f32) -> Self {
        Self {
            sentiment: classify(score),
            score,
        }
    }
}

/// Single-review output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// One review in a batch output.
#[derive(Debug, Clone)]
pub struct ReviewResult {
    /// Review text as supplied, before normalization.
    pub text: String,
    /// Prediction for this review.
    pub prediction: Prediction,
}

/// Batch output from `run()`.
#[derive(Debug)]
pub struct BatchOutput {
    /// Per-review predictions, in input order.
    pub results: Vec<ReviewResult>,
    /// Counts, percentage and stocking recommendation.
    pub summary: BatchResult,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Input trait for type-based dispatch ============

#[doc(hidden)]
pub trait ReviewInput<'a> {
    /// Output type for `.run()`.
    type Output;

    #[doc(hidden)]
    fn into_texts(self) -> Vec<&'a str>;
    #[doc(hidden)]
    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output>;
}

impl<'a> ReviewInput<'a> for &'a str {
    type Output = Output;

    fn into_texts(self) -> Vec<&'a str> {
        vec![self]
    }

    fn convert_output(
        _texts: Vec<&'a str>,
        mut predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        let prediction = predictions
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("No prediction returned".into()))?;
        Ok(Output { prediction, stats })
    }
}

fn batch_output(
    texts: Vec<&str>,
    predictions: Vec<Prediction>,
    stats: PipelineStats,
) -> Result<BatchOutput> {
    let sentiments: Vec<Sentiment> = predictions.iter().map(|p| p.sentiment).collect();
    let summary = aggregate(&sentiments)?;

    let results = texts
        .into_iter()
        .zip(predictions)
        .map(|(text, prediction)| ReviewResult {
            text: text.to_string(),
            prediction,
        })
        .collect();

    Ok(BatchOutput {
        results,
        summary,
        stats,
    })
}

impl<'a> ReviewInput<'a> for &'a [&'a str] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        batch_output(texts, predictions, stats)
    }
}

impl<'a, const N: usize> ReviewInput<'a> for &'a [&'a str; N] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.as_slice().to_vec()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        batch_output(texts, predictions, stats)
    }
}

impl<'a> ReviewInput<'a> for &'a [String] {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.iter().map(String::as_str).collect()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        batch_output(texts, predictions, stats)
    }
}

impl<'a> ReviewInput<'a> for &'a Vec<String> {
    type Output = BatchOutput;

    fn into_texts(self) -> Vec<&'a str> {
        self.iter().map(String::as_str).collect()
    }

    fn convert_output(
        texts: Vec<&'a str>,
        predictions: Vec<Prediction>,
        stats: PipelineStats,
    ) -> Result<Self::Output> {
        batch_output(texts, predictions, stats)
    }
}

// ============ Pipeline ============

/// Classifies product reviews and summarizes batches into a stocking recommendation.
///
/// Holds the frozen model and vocabulary behind `Arc`s; neither is mutated after
/// construction, so one pipeline can serve concurrent callers. Construct directly with
/// [`SentimentPipeline::new`] or load artifacts with
/// [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use review_sentiment::error::Result;
/// use review_sentiment::sentiment::{
///     Recommendation, Sentiment, SentimentModel, SentimentPipeline, TokenSequence, Vocabulary,
/// };
///
/// /// Positive whenever the word "great" (id 1) appears.
/// struct KeywordModel;
///
/// impl SentimentModel for KeywordModel {
///     fn infer(&self, batch: &[TokenSequence]) -> Result<Vec<f32>> {
///         Ok(batch
///             .iter()
///             .map(|s| if s.ids().contains(&1) { 0.9 } else { 0.1 })
///             .collect())
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let vocab = Vocabulary::from_word_index(HashMap::from([("great".to_string(), 1)]));
/// let pipeline = SentimentPipeline::new(Arc::new(KeywordModel), Arc::new(vocab));
///
/// assert_eq!(pipeline.classify_one("Great card!")?, Sentiment::Positive);
///
/// let summary = pipeline.classify_many(&["great", "great", "meh"])?;
/// assert_eq!(summary.positive_count(), 2);
/// assert_eq!(summary.recommendation(), Recommendation::Stock);
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipeline<M: SentimentModel> {
    model: Arc<M>,
    vocabulary: Arc<Vocabulary>,
}

impl<M: SentimentModel> Clone for SentimentPipeline<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            vocabulary: Arc::clone(&self.vocabulary),
        }
    }
}

impl<M: SentimentModel> SentimentPipeline<M> {
    /// Assemble a pipeline from an already-loaded model and vocabulary.
    pub fn new(model: Arc<M>, vocabulary: Arc<Vocabulary>) -> Self {
        Self { model, vocabulary }
    }

    /// The shared model handle.
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// The frozen vocabulary, including sequence length and pad id.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Normalize and encode one review exactly as inference sees it.
    pub fn encode(&self, text: &str) -> TokenSequence {
        self.vocabulary.encode(&normalize(text))
    }

    /// Classify a single review.
    pub fn classify_one(&self, text: &str) -> Result<Sentiment> {
        let prediction = self
            .predict(&[text])?
            .pop()
            .ok_or_else(|| PipelineError::Unexpected("No prediction returned".into()))?;
        Ok(prediction.sentiment)
    }

    /// Classify every review with one batched forward pass and summarize the batch.
    ///
    /// Produces the same counts as calling [`Self::classify_one`] on each review.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyBatch`] when `texts` is empty; the model is not invoked.
    pub fn classify_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<BatchResult> {
        if texts.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }

        let sentiments: Vec<Sentiment> = self
            .predict_scores(texts)?
            .into_iter()
            .map(|p| p.sentiment)
            .collect();
        aggregate(&sentiments)
    }

    /// Per-review predictions from one batched forward pass, without summarizing.
    pub fn predict_scores<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        let texts: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
        self.predict(&texts)
    }

    /// Analyze reviews with timing.
    ///
    /// Single review → [`Output`], batch → [`BatchOutput`] (which fails with
    /// [`PipelineError::EmptyBatch`] when empty).
    pub fn run<'a, I: ReviewInput<'a>>(&self, input: I) -> Result<I::Output> {
        let stats_builder = PipelineStats::start();
        let texts = input.into_texts();
        let item_count = texts.len();

        let predictions = self.predict(&texts)?;

        I::convert_output(texts, predictions, stats_builder.finish(item_count))
    }

    fn predict(&self, texts: &[&str]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let sequences: Vec<TokenSequence> = texts.iter().map(|text| self.encode(text)).collect();

        let pad_id = self.vocabulary.pad_id();
        let unrecognized = sequences
            .iter()
            .filter(|s| !s.is_empty() && s.is_all_padding(pad_id))
            .count();
        if unrecognized > 0 {
            tracing::warn!(
                unrecognized,
                total = sequences.len(),
                "reviews with no in-vocabulary words are scored on padding alone"
            );
        }
        tracing::debug!(batch_size = sequences.len(), "classifying reviews");

        let scores = self.model.infer(&sequences)?;
        if scores.len() != sequences.len() {
            return Err(PipelineError::Inference(format!(
                "Model returned {} scores for {} reviews",
                scores.len(),
                sequences.len()
            )));
        }

        Ok(scores.into_iter().map(Prediction::from_score).collect())
    }
}
