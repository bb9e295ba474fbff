use std::fmt;

/// Punctuation that survives normalization.
const ALLOWED_PUNCTUATION: [char; 3] = ['.', ',', '-'];

/// First code point outside the Basic Multilingual Plane.
const SUPPLEMENTARY_START: u32 = 0x10000;

/// Review text restricted to the character set the vocabulary was built from.
///
/// Only [`normalize`] constructs this, so holding one means the text contains nothing
/// but ASCII letters, ASCII digits, whitespace and `. , -`, with no doubled ASCII spaces and
/// no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CanonicalText(String);

impl CanonicalText {
    /// Borrow the canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize raw review text.
///
/// Supplementary-plane code points (emoji and other pictographs) go first, then every
/// character outside the allowed class. Runs of ASCII spaces left behind shrink to one and
/// the ends are trimmed. Other whitespace (`\t`, `\r`, no-break space) is kept as is: the
/// vocabulary's own splitting rules decide what separates words. Never fails.
///
/// ```rust
/// use review_sentiment::sentiment::normalize;
///
/// assert_eq!(normalize("Great 🎮 card!!").as_str(), "Great card");
/// ```
pub fn normalize(text: &str) -> CanonicalText {
    let mut kept = String::with_capacity(text.len());

    for c in text
        .chars()
        .filter(|&c| (c as u32) < SUPPLEMENTARY_START)
        .filter(|&c| is_allowed(c))
    {
        if c == ' ' && kept.ends_with(' ') {
            continue;
        }
        kept.push(c);
    }

    CanonicalText(kept.trim_matches(is_space).to_string())
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_space(c) || ALLOWED_PUNCTUATION.contains(&c)
}

/// Whitespace as a Python `\s` class sees it: Unicode `White_Space` plus the
/// information separators U+001C..=U+001F.
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment::vocab::Vocabulary;
    use std::collections::HashMap;

    #[test]
    fn strips_emoji_and_disallowed_punctuation() {
        assert_eq!(normalize("Great 🎮 card!!").as_str(), "Great card");
    }

    #[test]
    fn keeps_allowed_characters() {
        let text = "Runs at 60 fps, no stutter - solid. 10/10";
        assert_eq!(normalize(text).as_str(), "Runs at 60 fps, no stutter - solid. 1010");
    }

    #[test]
    fn removes_non_ascii_letters_in_the_bmp() {
        assert_eq!(normalize("café naïve").as_str(), "caf nave");
        assert_eq!(normalize("日本語").as_str(), "");
    }

    #[test]
    fn collapses_spaces_left_by_removed_characters() {
        assert_eq!(normalize("fast ! ! quiet").as_str(), "fast quiet");
        assert_eq!(normalize("fast 🎮  quiet").as_str(), "fast quiet");
    }

    #[test]
    fn other_whitespace_reaches_the_vocabulary_untouched() {
        let vocab = Vocabulary::from_word_index(HashMap::from([
            ("great".to_string(), 2),
            ("card".to_string(), 1),
        ]));

        assert_eq!(normalize("great card\r\nlove it").as_str(), "great card\r\nlove it");
        // `card\r` is one out-of-vocabulary word for the tokenizer.
        assert_eq!(vocab.to_ids(&normalize("great card\r\nlove it")), vec![2]);
        assert!(vocab.to_ids(&normalize("great\u{a0}card")).is_empty());
        // Tab is a tokenizer filter character, so it still separates words.
        assert_eq!(vocab.to_ids(&normalize("great\tcard")), vec![2, 1]);
    }

    #[test]
    fn information_separators_count_as_whitespace() {
        assert_eq!(normalize("a\u{1c}b\u{1f}c").as_str(), "a\u{1c}b\u{1f}c");
        assert_eq!(normalize("\u{1e} ok \u{1d}").as_str(), "ok");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  \t hello \n").as_str(), "hello");
        assert_eq!(normalize("!!! ok ???").as_str(), "ok");
    }

    #[test]
    fn empty_and_symbol_only_inputs_become_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize("🎮🔥💯").is_empty());
        assert!(normalize("   ").is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "Great 🎮 card!!",
            "  mixed\tWHITE\nspace  ",
            "€uro £ound ¥en",
            "a-b,c.d",
            "\u{00a0}nbsp\u{00a0}",
            "crlf\r\n  line \u{1c}",
            "😀 leading emoji",
            "trailing emoji 😀",
        ];
        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
