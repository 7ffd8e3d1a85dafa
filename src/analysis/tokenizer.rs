use std::sync::LazyLock;
use regex::Regex;
use crate::analysis::processor::TextProcessor;

static STANDARD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;:!]+").expect("separator pattern is valid"));

/// Splits on whitespace and `, ; : !`. Empty fragments are dropped.
#[derive(Clone, Default)]
pub struct StandardTokenizer;

impl TextProcessor for StandardTokenizer {
    fn process(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .iter()
            .flat_map(|text| STANDARD_SEPARATORS.split(text))
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect()
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn TextProcessor> {
        Box::new(StandardTokenizer)
    }
}

/// Emits every contiguous run of exactly `token_length` characters of each
/// input token, left to right. Shorter tokens produce nothing.
#[derive(Clone)]
pub struct NGramTokenizer {
    pub token_length: usize,
}

impl NGramTokenizer {
    pub fn new(token_length: usize) -> Self {
        NGramTokenizer { token_length }
    }
}

impl TextProcessor for NGramTokenizer {
    fn process(&self, tokens: Vec<String>) -> Vec<String> {
        let n = self.token_length;
        if n == 0 {
            return Vec::new();
        }

        let mut result = Vec::new();
        for token in tokens {
            let chars: Vec<char> = token.chars().collect();
            if chars.len() < n {
                continue;
            }
            for window in chars.windows(n) {
                result.push(window.iter().collect());
            }
        }

        result
    }

    fn name(&self) -> &str {
        "ngram"
    }

    fn clone_box(&self) -> Box<dyn TextProcessor> {
        Box::new(NGramTokenizer {
            token_length: self.token_length,
        })
    }
}
