use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed and public. Secrecy of terms comes from the per-index encryption
/// applied afterwards, not from this hash.
const TERM_HASH_KEY: [u8; 16] = [
    0xde, 0xad, 0xbe, 0xef, 0xca, 0xfe, 0xba, 0xbe,
    0x8b, 0xad, 0xf0, 0x0d, 0x1b, 0xad, 0xb0, 0x02,
];

/// Keyed hash of a string folded to 64 bits (leading 8 digest bytes, big endian).
pub fn hash_term(term: &str) -> u64 {
    let mut mac = HmacSha256::new_from_slice(&TERM_HASH_KEY)
        .expect("HMAC accepts keys of any length");
    mac.update(term.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(word)
}
