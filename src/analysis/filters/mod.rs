pub mod downcase;
pub mod upcase;

pub use downcase::DowncaseFilter;
pub use upcase::UpcaseFilter;
