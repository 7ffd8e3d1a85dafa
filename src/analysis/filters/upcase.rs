use crate::analysis::processor::TextProcessor;

pub struct UpcaseFilter;

impl TextProcessor for UpcaseFilter {
    fn process(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter()
            .map(|token| token.to_uppercase())
            .collect()
    }

    fn name(&self) -> &str {
        "upcase"
    }

    fn clone_box(&self) -> Box<dyn TextProcessor> {
        Box::new(UpcaseFilter)
    }
}
