pub mod date;
pub mod hash;
pub mod number;
pub mod term;

pub use date::DateResolution;
pub use term::{
    decode_orderable, encode_equatable, encode_equatable_str, encode_equatable_with_resolution,
    encode_orderable, encode_orderable_with_resolution, EquatableTerm, OrderableTerm, SourceType,
};
