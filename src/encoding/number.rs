//! Order-preserving mapping between `f64` and `u64`.
//!
//! Positive values get their sign bit set; negative values have every bit
//! flipped, so unsigned comparison of the result matches numeric comparison
//! of the input across the whole finite range (infinities included).

const SIGN_BIT: u64 = 0x8000_0000_0000_0000;

pub fn f64_to_ordered(value: f64) -> u64 {
    // -0.0 and 0.0 compare equal and must encode equal
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    if bits & SIGN_BIT == 0 {
        bits | SIGN_BIT
    } else {
        !bits
    }
}

pub fn ordered_to_f64(encoded: u64) -> f64 {
    if encoded & SIGN_BIT != 0 {
        f64::from_bits(encoded & !SIGN_BIT)
    } else {
        f64::from_bits(!encoded)
    }
}
