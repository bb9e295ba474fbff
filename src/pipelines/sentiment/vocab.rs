use std::collections::HashMap;

use super::normalize::CanonicalText;
use crate::error::{PipelineError, Result};

/// Sequence length the reference model was trained with.
pub const DEFAULT_SEQUENCE_LENGTH: usize = 200;

/// Reserved id used to left-pad short sequences.
pub const PAD_ID: u32 = 0;

/// Characters the Keras `Tokenizer` replaces with the split string by default.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Fixed-length sequence of token ids fed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenSequence(Vec<u32>);

impl TokenSequence {
    /// Token ids, oldest first.
    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    /// Number of ids, always the configured sequence length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True only for zero-length configurations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every position holds `pad_id`, i.e. no word was recognized.
    pub fn is_all_padding(&self, pad_id: u32) -> bool {
        self.0.iter().all(|&id| id == pad_id)
    }

    /// Unwrap into the owned id vector.
    pub fn into_ids(self) -> Vec<u32> {
        self.0
    }
}

/// Frozen word-to-id mapping together with the splitting rules it was built under.
///
/// Lowercasing, filter characters, the split string and the `num_words` cap are all part of
/// the training contract: changing any of them without rebuilding the vocabulary silently
/// degrades predictions.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    lower: bool,
    filters: String,
    split: String,
    sequence_length: usize,
    pad_id: u32,
}

impl Vocabulary {
    /// Mapping with Keras `Tokenizer` defaults, length 200 and pad id 0.
    pub fn from_word_index(word_index: HashMap<String, u32>) -> Self {
        Self {
            word_index,
            num_words: None,
            lower: true,
            filters: DEFAULT_FILTERS.to_string(),
            split: " ".to_string(),
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            pad_id: PAD_ID,
        }
    }

    /// Keep only ids below `num_words`; `None` or `Some(0)` keeps everything.
    pub fn with_num_words(mut self, num_words: Option<usize>) -> Self {
        self.num_words = num_words.filter(|&n| n > 0);
        self
    }

    /// Whether words are lowercased before lookup.
    pub fn with_lower(mut self, lower: bool) -> Self {
        self.lower = lower;
        self
    }

    /// Characters replaced by the split string before splitting.
    pub fn with_filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = filters.into();
        self
    }

    /// Separator between words.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Vocabulary`] for an empty separator.
    pub fn with_split(mut self, split: impl Into<String>) -> Result<Self> {
        let split = split.into();
        if split.is_empty() {
            return Err(PipelineError::Vocabulary(
                "Tokenizer split string must not be empty".into(),
            ));
        }
        self.split = split;
        Ok(self)
    }

    /// Fixed length of every encoded sequence.
    pub fn with_sequence_length(mut self, sequence_length: usize) -> Self {
        self.sequence_length = sequence_length;
        self
    }

    /// Id used for left padding.
    pub fn with_pad_id(mut self, pad_id: u32) -> Self {
        self.pad_id = pad_id;
        self
    }

    /// Length every [`TokenSequence`] from [`Self::encode`] has.
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Reserved padding id.
    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Number of distinct words in the mapping.
    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    /// True when the mapping holds no words.
    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    /// Largest id [`Self::encode`] can emit for a word, 0 for an empty mapping.
    pub fn max_id(&self) -> u32 {
        self.word_index
            .values()
            .copied()
            .filter(|&id| self.num_words.map_or(true, |limit| (id as usize) < limit))
            .max()
            .unwrap_or(0)
    }

    /// Id for `word` after the `num_words` cap, without any splitting or case folding.
    pub fn id(&self, word: &str) -> Option<u32> {
        let id = *self.word_index.get(word)?;
        match self.num_words {
            Some(limit) if id as usize >= limit => None,
            _ => Some(id),
        }
    }

    /// Split text into words exactly as the vocabulary's tokenizer did at training time.
    pub fn words(&self, text: &str) -> Vec<String> {
        let prepared: String = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut replaced = String::with_capacity(prepared.len());
        for c in prepared.chars() {
            if self.filters.contains(c) {
                replaced.push_str(&self.split);
            } else {
                replaced.push(c);
            }
        }

        replaced
            .split(self.split.as_str())
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Ids for every known word, unpadded. Unknown words are dropped.
    pub fn to_ids(&self, text: &CanonicalText) -> Vec<u32> {
        self.words(text.as_str())
            .iter()
            .filter_map(|word| self.id(word))
            .collect()
    }

    /// Encode to the vocabulary's own sequence length.
    pub fn encode(&self, text: &CanonicalText) -> TokenSequence {
        encode(text, self, self.sequence_length)
    }
}

/// Map canonical text to exactly `length` token ids.
///
/// Out-of-vocabulary words vanish instead of mapping to an unknown id. Short sequences are
/// left-padded with the vocabulary's pad id; long ones keep their trailing `length` ids.
///
/// ```rust
/// use std::collections::HashMap;
/// use review_sentiment::sentiment::{encode, normalize, Vocabulary};
///
/// let vocab = Vocabulary::from_word_index(HashMap::from([
///     ("great".to_string(), 7),
///     ("card".to_string(), 3),
/// ]));
/// let seq = encode(&normalize("Great mystery card"), &vocab, 4);
/// assert_eq!(seq.ids(), &[0, 0, 7, 3]);
/// ```
pub fn encode(text: &CanonicalText, vocabulary: &Vocabulary, length: usize) -> TokenSequence {
    let ids = vocabulary.to_ids(text);
    TokenSequence(pad_pre(&ids, length, vocabulary.pad_id()))
}

fn pad_pre(ids: &[u32], length: usize, pad_id: u32) -> Vec<u32> {
    if ids.len() >= length {
        return ids[ids.len() - length..].to_vec();
    }

    let mut padded = vec![pad_id; length - ids.len()];
    padded.extend_from_slice(ids);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment::normalize::normalize;

    fn vocab() -> Vocabulary {
        let words = ["the", "card", "runs", "cool", "great", "loud", "fan"];
        Vocabulary::from_word_index(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), i as u32 + 1))
                .collect(),
        )
    }

    #[test]
    fn splits_like_the_keras_tokenizer() {
        let v = vocab();
        assert_eq!(
            v.words("The card, runs-cool.  Great"),
            vec!["the", "card", "runs", "cool", "great"]
        );
    }

    #[test]
    fn case_sensitive_vocabularies_keep_case() {
        let v = vocab().with_lower(false);
        assert_eq!(v.to_ids(&normalize("The card")), vec![2]);
    }

    #[test]
    fn left_pads_short_sequences() {
        let seq = encode(&normalize("great card"), &vocab(), 5);
        assert_eq!(seq.ids(), &[0, 0, 0, 5, 2]);
    }

    #[test]
    fn truncation_keeps_the_trailing_ids() {
        let seq = encode(&normalize("the card runs cool great"), &vocab(), 3);
        assert_eq!(seq.ids(), &[3, 4, 5]);
    }

    #[test]
    fn exact_length_is_untouched() {
        let seq = encode(&normalize("loud fan"), &vocab(), 2);
        assert_eq!(seq.ids(), &[6, 7]);
    }

    #[test]
    fn unknown_words_are_dropped_not_replaced() {
        let seq = encode(&normalize("great mystery card"), &vocab(), 4);
        assert_eq!(seq.ids(), &[0, 0, 5, 2]);
    }

    #[test]
    fn all_unknown_text_encodes_to_padding() {
        let v = vocab();
        let seq = v.encode(&normalize("zxq blorf"));
        assert_eq!(seq.len(), DEFAULT_SEQUENCE_LENGTH);
        assert!(seq.is_all_padding(PAD_ID));
    }

    #[test]
    fn length_is_fixed_for_every_limit() {
        let v = vocab();
        let texts = ["", "great", "the card runs cool great loud fan the card", "unknown"];
        for text in texts {
            let canonical = normalize(text);
            for length in [0, 1, 2, 5, 9, 200] {
                assert_eq!(encode(&canonical, &v, length).len(), length);
            }
        }
    }

    #[test]
    fn num_words_caps_ids() {
        let v = vocab().with_num_words(Some(3));
        assert_eq!(v.to_ids(&normalize("the card runs")), vec![1, 2]);

        let uncapped = vocab().with_num_words(Some(0));
        assert_eq!(uncapped.to_ids(&normalize("the card runs")), vec![1, 2, 3]);
    }

    #[test]
    fn max_id_respects_the_cap() {
        assert_eq!(vocab().max_id(), 7);
        assert_eq!(vocab().with_num_words(Some(3)).max_id(), 2);
        assert_eq!(Vocabulary::from_word_index(HashMap::new()).max_id(), 0);
    }

    #[test]
    fn custom_pad_id_is_used() {
        let seq = encode(&normalize("fan"), &vocab().with_pad_id(9), 3);
        assert_eq!(seq.ids(), &[9, 9, 7]);
    }

    #[test]
    fn empty_split_is_rejected() {
        assert!(matches!(
            vocab().with_split(""),
            Err(PipelineError::Vocabulary(_))
        ));
    }
}
