use serde::Serialize;
use std::fmt;

/// Scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f32 = 0.5;

/// Binary review sentiment derived from a model score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Score above [`POSITIVE_THRESHOLD`].
    Positive,
    /// Score at or below [`POSITIVE_THRESHOLD`].
    Negative,
}

impl Sentiment {
    /// Lowercase label, as rendered to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }

    /// Shorthand for `== Sentiment::Positive`.
    pub fn is_positive(&self) -> bool {
        matches!(self, Sentiment::Positive)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold a score into a sentiment.
///
/// The comparison is strict, so a score of exactly 0.5 is negative. NaN is negative too.
pub fn classify(score: f32) -> Sentiment {
    if score > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    }
}
