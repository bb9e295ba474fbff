//! Review sentiment pipeline.
//!
//! Classify customer reviews as `positive` or `negative` with a frozen embedding + LSTM
//! classifier, then summarize a batch into a stocking recommendation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use review_sentiment::sentiment::{ArtifactSource, SentimentPipelineBuilder};
//!
//! # fn main() -> review_sentiment::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::lstm(ArtifactSource::local("artifacts/reviews")).build()?;
//!
//! // Single review - direct access
//! let output = pipeline.run("This card runs cool and quiet, love it!")?;
//! println!("sentiment: {} (score: {:.2})", output.prediction.sentiment, output.prediction.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Summary
//!
//! Summarize many reviews at once (one forward pass):
//!
//! ```rust,no_run
//! # use review_sentiment::sentiment::{ArtifactSource, SentimentPipelineBuilder};
//! # fn main() -> review_sentiment::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::lstm(ArtifactSource::local("artifacts/reviews")).build()?;
//! let reviews = &[
//!     "Best upgrade I've made in years.",
//!     "Fans are loud and it crashed twice.",
//!     "Runs every game at max settings.",
//! ];
//!
//! let summary = pipeline.classify_many(reviews)?;
//! println!(
//!     "{}/{} positive ({:.2}%): {}",
//!     summary.positive_count(),
//!     summary.total_comments(),
//!     summary.positive_percentage(),
//!     summary.recommendation().message()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Stages
//!
//! | Stage | Function |
//! |-------|----------|
//! | Clean text | [`normalize`] |
//! | Map to ids | [`encode`] |
//! | Score | [`SentimentModel::infer`] |
//! | Label | [`classify`] |
//! | Summarize | [`aggregate`] |

// ============ Internal API ============

pub(crate) mod aggregate;
pub(crate) mod builder;
pub(crate) mod classify;
pub(crate) mod model;
pub(crate) mod normalize;
pub(crate) mod pipeline;
pub(crate) mod vocab;

// ============ Public API ============

pub use crate::loaders::{
    parse_keras_tokenizer, ArtifactSource, LstmModelLoader, VocabularyLoader, CONFIG_FILE,
    TOKENIZER_FILE, WEIGHTS_FILE,
};
pub use crate::models::{LstmConfig, LstmSentimentModel};
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use aggregate::{aggregate, BatchResult, Recommendation, STOCK_THRESHOLD_PERCENT};
pub use builder::SentimentPipelineBuilder;
pub use classify::{classify, Sentiment, POSITIVE_THRESHOLD};
pub use model::SentimentModel;
pub use normalize::{normalize, CanonicalText};
pub use pipeline::{BatchOutput, Output, Prediction, ReviewResult, SentimentPipeline};
pub use vocab::{
    encode, TokenSequence, Vocabulary, DEFAULT_FILTERS, DEFAULT_SEQUENCE_LENGTH, PAD_ID,
};

#[doc(hidden)]
pub use pipeline::ReviewInput;
