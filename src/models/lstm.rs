use candle_core::{DType, Device, Tensor};
use candle_nn::{embedding, linear, lstm, Embedding, LSTMConfig, Linear, Module, VarBuilder, LSTM, RNN};
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::pipelines::sentiment::model::SentimentModel;
use crate::pipelines::sentiment::vocab::TokenSequence;

fn default_num_layers() -> usize {
    1
}

/// Shape of the frozen network, read from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LstmConfig {
    /// Rows in the embedding table; every token id must be below this.
    pub vocab_size: usize,
    /// Width of each embedded token.
    pub embedding_dim: usize,
    /// LSTM hidden state width.
    pub hidden_dim: usize,
    /// Stacked LSTM layers.
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
}

/// Embedding → stacked LSTM → dense → sigmoid binary classifier.
///
/// Tensor names under the root `VarBuilder`:
/// `embedding.weight`, `lstm.{weight,bias}_{ih,hh}_l{k}`, `dense.weight`, `dense.bias`.
#[derive(Debug, Clone)]
pub struct LstmSentimentModel {
    embedding: Embedding,
    layers: Vec<LSTM>,
    dense: Linear,
    config: LstmConfig,
    device: Device,
    span: tracing::Span,
}

impl LstmSentimentModel {
    /// Build the network from weights in `vb`.
    pub fn load(config: &LstmConfig, vb: VarBuilder) -> Result<Self> {
        if config.num_layers == 0 {
            return Err(PipelineError::Inference(
                "LSTM config must declare at least one layer".into(),
            ));
        }

        let device = vb.device().clone();
        let embedding = embedding(config.vocab_size, config.embedding_dim, vb.pp("embedding"))?;

        let lstm_vb = vb.pp("lstm");
        let mut layers = Vec::with_capacity(config.num_layers);
        for layer_idx in 0..config.num_layers {
            let in_dim = if layer_idx == 0 {
                config.embedding_dim
            } else {
                config.hidden_dim
            };
            let layer_config = LSTMConfig {
                layer_idx,
                ..LSTMConfig::default()
            };
            layers.push(lstm(in_dim, config.hidden_dim, layer_config, lstm_vb.clone())?);
        }

        let dense = linear(config.hidden_dim, 1, vb.pp("dense"))?;
        let span = tracing::span!(tracing::Level::TRACE, "lstm-forward");

        Ok(Self {
            embedding,
            layers,
            dense,
            config: config.clone(),
            device,
            span,
        })
    }

    /// Network shape.
    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    /// Device the weights live on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// `(batch, seq_len)` u32 ids → `(batch, 1)` probabilities.
    fn forward(&self, ids: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();
        let (batch, seq_len) = ids.dims2()?;

        let last_hidden = if seq_len == 0 {
            Tensor::zeros((batch, self.config.hidden_dim), DType::F32, &self.device)?
        } else {
            let mut xs = self.embedding.forward(ids)?;
            let mut last = None;
            for layer in &self.layers {
                let states = layer.seq(&xs)?;
                last = states.last().map(|state| state.h().clone());
                xs = layer.states_to_tensor(&states)?;
            }
            match last {
                Some(h) => h,
                None => Tensor::zeros((batch, self.config.hidden_dim), DType::F32, &self.device)?,
            }
        };

        let logits = self.dense.forward(&last_hidden)?;
        candle_nn::ops::sigmoid(&logits)
    }

    fn check_batch(&self, batch: &[TokenSequence]) -> Result<usize> {
        let seq_len = batch.first().map(TokenSequence::len).unwrap_or(0);

        for (i, sequence) in batch.iter().enumerate() {
            if sequence.len() != seq_len {
                return Err(PipelineError::Inference(format!(
                    "Ragged batch: sequence {i} has length {} but sequence 0 has {seq_len}",
                    sequence.len()
                )));
            }
            if let Some(&id) = sequence
                .ids()
                .iter()
                .find(|&&id| id as usize >= self.config.vocab_size)
            {
                return Err(PipelineError::Inference(format!(
                    "Token id {id} in sequence {i} exceeds embedding size {}",
                    self.config.vocab_size
                )));
            }
        }

        Ok(seq_len)
    }
}

impl SentimentModel for LstmSentimentModel {
    fn infer(&self, batch: &[TokenSequence]) -> Result<Vec<f32>> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let seq_len = self.check_batch(batch)?;
        tracing::debug!(batch_size = batch.len(), seq_len, "lstm inference");

        let flat: Vec<u32> = batch
            .iter()
            .flat_map(|sequence| sequence.ids().iter().copied())
            .collect();
        let ids = Tensor::from_vec(flat, (batch.len(), seq_len), &self.device)?;

        let probs = self.forward(&ids)?;
        Ok(probs.flatten_all()?.to_vec1::<f32>()?)
    }
}
