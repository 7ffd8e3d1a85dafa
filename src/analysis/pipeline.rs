use crate::analysis::config::MatchOptions;
use crate::analysis::processor::TextProcessor;

/// One tokenizer followed by zero or more filters. Tokenization always runs
/// first, whatever order the configuration lists things in.
#[derive(Clone)]
pub struct TextPipeline {
    pub tokenizer: Box<dyn TextProcessor>,
    pub filters: Vec<Box<dyn TextProcessor>>,
}

impl TextPipeline {
    pub fn new(tokenizer: Box<dyn TextProcessor>) -> Self {
        TextPipeline {
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TextProcessor>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn from_options(options: &MatchOptions) -> Self {
        options.token_filters.iter().fold(
            TextPipeline::new(options.tokenizer.build()),
            |pipeline, filter| pipeline.add_filter(filter.build()),
        )
    }

    pub fn run(&self, input: Vec<String>) -> Vec<String> {
        let mut tokens = self.tokenizer.process(input);

        for filter in &self.filters {
            tokens = filter.process(tokens);
        }

        tokens
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.run(vec![text.to_string()])
    }

    /// Processor names in execution order, e.g. `["standard", "downcase"]`.
    pub fn describe(&self) -> Vec<&str> {
        std::iter::once(self.tokenizer.name())
            .chain(self.filters.iter().map(|f| f.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::config::{TokenFilterConfig, TokenizerConfig};
    use crate::analysis::filters::DowncaseFilter;
    use crate::analysis::tokenizer::{NGramTokenizer, StandardTokenizer};

    #[test]
    fn test_tokenizes_before_ngrams() {
        let pipeline = TextPipeline::new(Box::new(StandardTokenizer))
            .add_filter(Box::new(NGramTokenizer::new(3)));

        let tokens = pipeline.analyze("CipherStash Dev Team");
        assert_eq!(
            tokens,
            vec![
                "Cip", "iph", "phe", "her", "erS", "rSt", "Sta", "tas", "ash",
                "Dev",
                "Tea", "eam",
            ]
        );
        // ngrams never span a word boundary
        assert!(!tokens.iter().any(|t| t.contains(' ')));
    }

    #[test]
    fn test_from_options_puts_tokenizer_first() {
        let options = MatchOptions::new(TokenizerConfig::Standard)
            .with_filter(TokenFilterConfig::Downcase)
            .with_filter(TokenFilterConfig::Ngram { token_length: 4 });
        let pipeline = TextPipeline::from_options(&options);

        assert_eq!(pipeline.describe(), vec!["standard", "downcase", "ngram"]);
        assert_eq!(pipeline.analyze("Ada LOVE"), vec!["love"]);
    }

    #[test]
    fn test_downcase_pipeline() {
        let pipeline = TextPipeline::new(Box::new(StandardTokenizer))
            .add_filter(Box::new(DowncaseFilter));
        assert_eq!(pipeline.analyze("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_pipeline_is_reusable() {
        let pipeline = TextPipeline::from_options(&MatchOptions::standard_downcase());
        let cloned = pipeline.clone();
        assert_eq!(pipeline.analyze("One Two"), cloned.analyze("One Two"));
        assert_eq!(pipeline.analyze("One Two"), pipeline.analyze("One Two"));
    }
}
