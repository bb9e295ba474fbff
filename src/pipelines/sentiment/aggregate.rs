use serde::Serialize;
use std::fmt;

use super::classify::Sentiment;
use crate::error::{PipelineError, Result};

/// A batch is stocked only when its rounded positive percentage is strictly above this.
pub const STOCK_THRESHOLD_PERCENT: usize = 60;

/// Binary stocking decision for a batch of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recommendation {
    /// Rounded positive percentage above [`STOCK_THRESHOLD_PERCENT`].
    #[serde(rename = "stock")]
    Stock,
    /// Rounded positive percentage at or below [`STOCK_THRESHOLD_PERCENT`].
    #[serde(rename = "do not stock")]
    DoNotStock,
}

impl Recommendation {
    /// Short form: `stock` or `do not stock`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Stock => "stock",
            Recommendation::DoNotStock => "do not stock",
        }
    }

    /// Sentence shown on the upload results page.
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Stock => "Stock the graphics cards",
            Recommendation::DoNotStock => "Do not stock the graphics cards",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics for a non-empty batch of reviews.
///
/// Fields are read-only; the only constructors are [`aggregate`] and [`BatchResult::from_counts`],
/// which guarantee `positive_count + negative_count == total_comments` and `total_comments > 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    total_comments: usize,
    positive_count: usize,
    negative_count: usize,
    positive_percentage: f64,
    recommendation: Recommendation,
}

impl BatchResult {
    /// Build a summary from raw counts.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyBatch`] when `total == 0`, [`PipelineError::Unexpected`] when
    /// `positive > total`.
    pub fn from_counts(total: usize, positive: usize) -> Result<Self> {
        if total == 0 {
            return Err(PipelineError::EmptyBatch);
        }
        if positive > total {
            return Err(PipelineError::Unexpected(format!(
                "positive count {positive} exceeds batch size {total}"
            )));
        }

        let positive_percentage = round2(positive as f64 / total as f64 * 100.0);

        // Decided on the displayed value: a batch shown as 60.00% is never stocked.
        let recommendation = if positive_percentage > STOCK_THRESHOLD_PERCENT as f64 {
            Recommendation::Stock
        } else {
            Recommendation::DoNotStock
        };

        Ok(Self {
            total_comments: total,
            positive_count: positive,
            negative_count: total - positive,
            positive_percentage,
            recommendation,
        })
    }

    /// Number of reviews in the batch.
    pub fn total_comments(&self) -> usize {
        self.total_comments
    }

    /// Reviews classified positive.
    pub fn positive_count(&self) -> usize {
        self.positive_count
    }

    /// Reviews classified negative.
    pub fn negative_count(&self) -> usize {
        self.negative_count
    }

    /// Positive share in percent, rounded to two decimals.
    pub fn positive_percentage(&self) -> f64 {
        self.positive_percentage
    }

    /// Stocking decision.
    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }
}

/// Summarize a batch of sentiments.
///
/// # Errors
///
/// [`PipelineError::EmptyBatch`] for an empty slice; a percentage of zero reviews is undefined.
pub fn aggregate(sentiments: &[Sentiment]) -> Result<BatchResult> {
    let positive = sentiments.iter().filter(|s| s.is_positive()).count();
    BatchResult::from_counts(sentiments.len(), positive)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
