// ============ Model implementations ============

pub(crate) mod lstm;

// Public model structs (for type annotations)
pub use lstm::{LstmConfig, LstmSentimentModel};
