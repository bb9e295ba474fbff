use std::sync::Arc;

use super::pipeline::SentimentPipeline;
use crate::error::{PipelineError, Result};
use crate::loaders::{ArtifactSource, LstmModelLoader, VocabularyLoader};
use crate::models::LstmSentimentModel;
use crate::pipelines::cache::global_cache;
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for creating [`SentimentPipeline`] instances from stored artifacts.
///
/// Use [`Self::lstm`] as the entry point. Pipelines built from the same source on the same
/// device share one loaded model.
///
/// # Examples
///
/// ```rust,no_run
/// # use review_sentiment::sentiment::{ArtifactSource, SentimentPipelineBuilder};
/// # fn main() -> review_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::lstm(ArtifactSource::local("artifacts/reviews"))
///     .sequence_length(200)
///     .cpu()
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SentimentPipelineBuilder {
    source: ArtifactSource,
    device_request: DeviceRequest,
    sequence_length: Option<usize>,
    pad_id: Option<u32>,
}

impl SentimentPipelineBuilder {
    /// Creates a builder for the embedding + LSTM classifier stored at `source`.
    pub fn lstm(source: ArtifactSource) -> Self {
        Self {
            source,
            device_request: DeviceRequest::Cpu,
            sequence_length: None,
            pad_id: None,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Use an explicit [`DeviceRequest`].
    pub fn device(mut self, request: DeviceRequest) -> Self {
        self.device_request = request;
        self
    }

    /// Override the fixed sequence length the model was trained with (default 200).
    pub fn sequence_length(mut self, length: usize) -> Self {
        self.sequence_length = Some(length);
        self
    }

    /// Override the padding id (default 0).
    pub fn pad_id(mut self, pad_id: u32) -> Self {
        self.pad_id = Some(pad_id);
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if artifacts are missing or malformed, device initialization fails,
    /// or the vocabulary produces ids the model's embedding cannot look up.
    pub fn build(self) -> Result<SentimentPipeline<LstmSentimentModel>> {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.source, &device);

        let model = global_cache().get_or_create(&key, || {
            LstmModelLoader::new(self.source.clone()).load(&device)
        })?;

        let mut vocabulary = VocabularyLoader::new(self.source.clone()).load()?;
        if let Some(length) = self.sequence_length {
            vocabulary = vocabulary.with_sequence_length(length);
        }
        if let Some(pad_id) = self.pad_id {
            vocabulary = vocabulary.with_pad_id(pad_id);
        }

        let rows = model.config().vocab_size;
        let highest = vocabulary.max_id().max(vocabulary.pad_id());
        if highest as usize >= rows {
            return Err(PipelineError::Vocabulary(format!(
                "Vocabulary id {highest} does not fit the model's {rows}-row embedding"
            )));
        }

        tracing::debug!(
            source = ?self.source,
            words = vocabulary.len(),
            sequence_length = vocabulary.sequence_length(),
            "sentiment pipeline ready"
        );

        Ok(SentimentPipeline::new(model, Arc::new(vocabulary)))
    }
}
