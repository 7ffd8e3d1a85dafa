use serde::{Serialize, Deserialize};
use crate::analysis::filters::{DowncaseFilter, UpcaseFilter};
use crate::analysis::processor::TextProcessor;
use crate::analysis::tokenizer::{NGramTokenizer, StandardTokenizer};
use crate::core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenizerConfig {
    Standard,
    Ngram {
        #[serde(rename = "tokenLength")]
        token_length: usize,
    },
}

/// Filters may also be an n-gram pass, applied after the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenFilterConfig {
    Downcase,
    Upcase,
    Ngram {
        #[serde(rename = "tokenLength")]
        token_length: usize,
    },
}

/// Text processing settings of a match-style index: exactly one tokenizer
/// and zero or more filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub token_filters: Vec<TokenFilterConfig>,
}

impl MatchOptions {
    pub fn new(tokenizer: TokenizerConfig) -> Self {
        MatchOptions {
            tokenizer,
            token_filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TokenFilterConfig) -> Self {
        self.token_filters.push(filter);
        self
    }

    /// Standard tokenizer followed by downcasing, the usual full-text setup.
    pub fn standard_downcase() -> Self {
        MatchOptions::new(TokenizerConfig::Standard).with_filter(TokenFilterConfig::Downcase)
    }

    pub fn validate(&self) -> Result<()> {
        let ngram_lengths = std::iter::once(match &self.tokenizer {
            TokenizerConfig::Ngram { token_length } => Some(*token_length),
            TokenizerConfig::Standard => None,
        })
        .chain(self.token_filters.iter().map(|f| match f {
            TokenFilterConfig::Ngram { token_length } => Some(*token_length),
            _ => None,
        }));

        for length in ngram_lengths.flatten() {
            if length == 0 {
                return Err(Error::schema("ngram tokenLength must be at least 1"));
            }
        }
        Ok(())
    }
}

impl TokenizerConfig {
    pub fn build(&self) -> Box<dyn TextProcessor> {
        match self {
            TokenizerConfig::Standard => Box::new(StandardTokenizer),
            TokenizerConfig::Ngram { token_length } => Box::new(NGramTokenizer::new(*token_length)),
        }
    }
}

impl TokenFilterConfig {
    pub fn build(&self) -> Box<dyn TextProcessor> {
        match self {
            TokenFilterConfig::Downcase => Box::new(DowncaseFilter),
            TokenFilterConfig::Upcase => Box::new(UpcaseFilter),
            TokenFilterConfig::Ngram { token_length } => Box::new(NGramTokenizer::new(*token_length)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_wire_shape() {
        let options = MatchOptions::new(TokenizerConfig::Ngram { token_length: 3 })
            .with_filter(TokenFilterConfig::Downcase);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "tokenizer": { "kind": "ngram", "tokenLength": 3 },
                "tokenFilters": [{ "kind": "downcase" }],
            })
        );
    }

    #[test]
    fn test_options_parse() {
        let options: MatchOptions = serde_json::from_value(json!({
            "tokenizer": { "kind": "standard" },
            "tokenFilters": [{ "kind": "upcase" }, { "kind": "ngram", "tokenLength": 2 }],
        }))
        .unwrap();
        assert_eq!(options.tokenizer, TokenizerConfig::Standard);
        assert_eq!(options.token_filters.len(), 2);
    }

    #[test]
    fn test_zero_length_ngram_rejected() {
        let options = MatchOptions::new(TokenizerConfig::Standard)
            .with_filter(TokenFilterConfig::Ngram { token_length: 0 });
        assert!(options.validate().is_err());
    }
}
