use crate::analysis::processor::TextProcessor;

pub struct DowncaseFilter;

impl TextProcessor for DowncaseFilter {
    fn process(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter()
            .map(|token| token.to_lowercase())
            .collect()
    }

    fn name(&self) -> &str {
        "downcase"
    }

    fn clone_box(&self) -> Box<dyn TextProcessor> {
        Box::new(DowncaseFilter)
    }
}
