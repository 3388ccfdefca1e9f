//! Text helpers shared by corpus assembly and tokenization.

use crate::types::Token;

/// Join title and description the way raw corpus texts are built.
pub fn raw_text(title: Option<&str>, description: Option<&str>) -> String {
    format!("{}\n{}", title.unwrap_or_default(), description.unwrap_or_default())
}

/// Turns one raw text into an ordered token sequence.
pub trait Tokenizer {
    /// Tokenize `text`.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<Token>,
{
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self(text)
    }
}

/// Lowercases and splits on anything that is not alphanumeric.
#[derive(Clone, Debug)]
pub struct SimpleTokenizer {
    /// Tokens shorter than this many characters are skipped.
    pub min_chars: usize,
}

impl Default for SimpleTokenizer {
    fn default() -> Self {
        Self { min_chars: 2 }
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| word.chars().count() >= self.min_chars.max(1))
            .map(str::to_lowercase)
            .collect()
    }
}
