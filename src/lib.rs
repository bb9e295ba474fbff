//! Sentiment screening for customer reviews in Rust.
//!
//! Powered by [Candle](https://github.com/huggingface/candle): a frozen embedding + LSTM
//! classifier labels each review `positive` or `negative`, and batches are summarized into a
//! recommendation on whether to stock the product.
//!
//! See [`sentiment`] for the pipeline and [`reviews`] for reading review exports.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;
pub mod reviews;

pub use pipelines::sentiment;
