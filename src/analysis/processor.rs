/// A total, pure transformation over a list of tokens. Tokenizers and filters
/// both implement it; a pipeline is their left-to-right composition.
pub trait TextProcessor: Send + Sync {
    fn process(&self, tokens: Vec<String>) -> Vec<String>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn TextProcessor>;
}

impl Clone for Box<dyn TextProcessor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
