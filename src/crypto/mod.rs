pub mod cipher;
pub mod materials;

pub use cipher::{CipherFactory, TermCipher};
pub use materials::CipherCache;
