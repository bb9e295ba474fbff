use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::models::{LstmConfig, LstmSentimentModel};
use crate::pipelines::cache::ModelOptions;
use crate::pipelines::sentiment::vocab::{Vocabulary, DEFAULT_FILTERS};

/// File holding the network shape.
pub const CONFIG_FILE: &str = "config.json";
/// File holding the network weights.
pub const WEIGHTS_FILE: &str = "model.safetensors";
/// File holding the serialized Keras tokenizer.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where the frozen model and vocabulary artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A directory containing `config.json`, `model.safetensors` and `tokenizer.json`.
    Local(PathBuf),
    /// A HuggingFace Hub model repository with the same files.
    HfHub {
        /// Repository id, e.g. `org/review-lstm`.
        repo: String,
        /// Branch, tag or commit; `None` means `main`.
        revision: Option<String>,
    },
}

impl ArtifactSource {
    /// Artifacts in a local directory.
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        ArtifactSource::Local(dir.into())
    }

    /// Artifacts in a HuggingFace Hub repository at its default revision.
    pub fn hf_hub(repo: impl Into<String>) -> Self {
        ArtifactSource::HfHub {
            repo: repo.into(),
            revision: None,
        }
    }

    /// Pin a Hub source to a revision. No effect on local sources.
    pub fn at_revision(self, revision: impl Into<String>) -> Self {
        match self {
            ArtifactSource::HfHub { repo, .. } => ArtifactSource::HfHub {
                repo,
                revision: Some(revision.into()),
            },
            local => local,
        }
    }

    /// Resolve `filename` to a readable local path, downloading if needed.
    pub fn fetch(&self, filename: &str) -> Result<PathBuf> {
        match self {
            ArtifactSource::Local(dir) => {
                let path = dir.join(filename);
                if !path.is_file() {
                    return Err(PipelineError::Unexpected(format!(
                        "Missing artifact '{}' in '{}'",
                        filename,
                        dir.display()
                    )));
                }
                Ok(path)
            }
            ArtifactSource::HfHub { repo, revision } => {
                let api = Api::new()?;
                let hub_repo = match revision {
                    Some(rev) => Repo::with_revision(repo.clone(), RepoType::Model, rev.clone()),
                    None => Repo::new(repo.clone(), RepoType::Model),
                };
                let path = api.repo(hub_repo).get(filename).map_err(|e| {
                    PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        filename, repo, e
                    ))
                })?;
                tracing::debug!(repo = %repo, filename, "fetched artifact from hub");
                Ok(path)
            }
        }
    }
}

impl ModelOptions for ArtifactSource {
    fn cache_key(&self) -> String {
        match self {
            ArtifactSource::Local(dir) => format!("local:{}", dir.display()),
            ArtifactSource::HfHub { repo, revision } => {
                format!("hf:{}@{}", repo, revision.as_deref().unwrap_or("main"))
            }
        }
    }
}

// ============ Model ============

/// Loads [`LstmSentimentModel`] from `config.json` + `model.safetensors`.
#[derive(Debug, Clone)]
pub struct LstmModelLoader {
    source: ArtifactSource,
}

impl LstmModelLoader {
    /// Loader reading from `source`.
    pub fn new(source: ArtifactSource) -> Self {
        Self { source }
    }

    /// Read the config and map the weights onto `device`.
    pub fn load(&self, device: &Device) -> Result<LstmSentimentModel> {
        let config_path = self.source.fetch(CONFIG_FILE)?;
        let weights_path = self.source.fetch(WEIGHTS_FILE)?;

        let config: LstmConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        tracing::debug!(?config, weights = %weights_path.display(), "loading lstm weights");

        load_lstm(&config, &weights_path, device)
    }
}

fn load_lstm(config: &LstmConfig, weights: &Path, device: &Device) -> Result<LstmSentimentModel> {
    // SAFETY: the weights file is treated as immutable for the life of the process.
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };
    LstmSentimentModel::load(config, vb)
}

// ============ Vocabulary ============

/// Loads a [`Vocabulary`] from a Keras `Tokenizer.to_json()` file.
#[derive(Debug, Clone)]
pub struct VocabularyLoader {
    source: ArtifactSource,
}

impl VocabularyLoader {
    /// Loader reading from `source`.
    pub fn new(source: ArtifactSource) -> Self {
        Self { source }
    }

    /// Read and validate `tokenizer.json`. Length 200 and pad id 0 apply until overridden.
    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.source.fetch(TOKENIZER_FILE)?;
        let content = std::fs::read_to_string(&path)?;
        let vocabulary = parse_keras_tokenizer(&content).map_err(|e| match e {
            PipelineError::Vocabulary(msg) => {
                PipelineError::Vocabulary(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;

        tracing::debug!(words = vocabulary.len(), path = %path.display(), "loaded vocabulary");
        Ok(vocabulary)
    }
}

fn default_filters() -> Option<String> {
    Some(DEFAULT_FILTERS.to_string())
}

fn default_lower() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}

#[derive(Deserialize)]
struct KerasTokenizerJson {
    #[serde(default)]
    class_name: Option<String>,
    config: KerasTokenizerConfig,
}

#[derive(Deserialize)]
struct KerasTokenizerConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: Option<String>,
    #[serde(default = "default_lower")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    word_index: serde_json::Value,
}

/// Parse the JSON written by Keras' `Tokenizer.to_json()`.
///
/// `word_index` may be the JSON-encoded string Keras writes or a plain object. Character-level
/// tokenizers and tokenizers with an `oov_token` are rejected: this pipeline drops unknown words,
/// and an out-of-vocabulary id would change that contract.
pub fn parse_keras_tokenizer(json: &str) -> Result<Vocabulary> {
    let raw: KerasTokenizerJson = serde_json::from_str(json)
        .map_err(|e| PipelineError::Vocabulary(format!("Invalid tokenizer JSON: {e}")))?;

    if let Some(name) = raw.class_name.as_deref() {
        if name != "Tokenizer" {
            return Err(PipelineError::Vocabulary(format!(
                "Expected a Keras Tokenizer, found class '{name}'"
            )));
        }
    }

    let config = raw.config;
    if config.char_level {
        return Err(PipelineError::Vocabulary(
            "Character-level tokenizers are not supported".into(),
        ));
    }
    if let Some(oov) = config.oov_token {
        return Err(PipelineError::Vocabulary(format!(
            "Tokenizer declares oov_token '{oov}'; unknown words must be dropped, not mapped"
        )));
    }

    let word_index: HashMap<String, u32> = match config.word_index {
        serde_json::Value::String(encoded) => serde_json::from_str(&encoded).map_err(|e| {
            PipelineError::Vocabulary(format!("Invalid encoded word_index: {e}"))
        })?,
        value @ serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| PipelineError::Vocabulary(format!("Invalid word_index: {e}")))?,
        other => {
            return Err(PipelineError::Vocabulary(format!(
                "word_index must be an object or JSON string, found {other}"
            )))
        }
    };

    Vocabulary::from_word_index(word_index)
        .with_num_words(config.num_words)
        .with_lower(config.lower)
        .with_filters(config.filters.unwrap_or_default())
        .with_split(config.split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment::normalize::normalize;

    fn keras_json(extra: &str) -> String {
        format!(
            r##"{{"class_name": "Tokenizer", "config": {{
                "num_words": null,
                "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{{|}}~\t\n",
                "lower": true,
                "split": " ",
                "char_level": false,
                "document_count": 3,
                "word_index": "{{\"the\": 1, \"card\": 2, \"great\": 3}}"{extra}
            }}}}"##
        )
    }

    #[test]
    fn parses_keras_string_encoded_word_index() {
        let vocab = parse_keras_tokenizer(&keras_json("")).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.to_ids(&normalize("The great card")), vec![1, 3, 2]);
        assert_eq!(vocab.sequence_length(), 200);
        assert_eq!(vocab.pad_id(), 0);
    }

    #[test]
    fn accepts_object_word_index_and_missing_fields() {
        let json = r#"{"config": {"word_index": {"fast": 4}, "lower": false}}"#;
        let vocab = parse_keras_tokenizer(json).unwrap();
        assert_eq!(vocab.to_ids(&normalize("fast Fast")), vec![4]);
    }

    #[test]
    fn null_filters_disable_filtering() {
        let json = r#"{"config": {"word_index": {"a.b": 1}, "filters": null}}"#;
        let vocab = parse_keras_tokenizer(json).unwrap();
        assert_eq!(vocab.to_ids(&normalize("a.b")), vec![1]);
    }

    #[test]
    fn rejects_oov_token() {
        let err = parse_keras_tokenizer(&keras_json(r#", "oov_token": "<OOV>""#)).unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary(_)));
    }

    #[test]
    fn rejects_char_level_and_other_classes() {
        let json = r#"{"config": {"word_index": {}, "char_level": true}}"#;
        assert!(matches!(
            parse_keras_tokenizer(json),
            Err(PipelineError::Vocabulary(_))
        ));

        let json = r#"{"class_name": "TextVectorization", "config": {"word_index": {}}}"#;
        assert!(matches!(
            parse_keras_tokenizer(json),
            Err(PipelineError::Vocabulary(_))
        ));
    }

    #[test]
    fn rejects_malformed_word_index() {
        let json = r#"{"config": {"word_index": 12}}"#;
        assert!(matches!(
            parse_keras_tokenizer(json),
            Err(PipelineError::Vocabulary(_))
        ));
    }

    #[test]
    fn cache_keys_distinguish_sources() {
        let local = ArtifactSource::local("/models/reviews");
        let hub = ArtifactSource::hf_hub("org/review-lstm");
        let pinned = hub.clone().at_revision("v2");

        assert_eq!(local.cache_key(), "local:/models/reviews");
        assert_eq!(hub.cache_key(), "hf:org/review-lstm@main");
        assert_eq!(pinned.cache_key(), "hf:org/review-lstm@v2");
    }

    #[test]
    fn missing_local_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactSource::local(dir.path()).fetch(CONFIG_FILE).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
