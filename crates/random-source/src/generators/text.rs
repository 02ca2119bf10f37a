//! String and byte generators.

use rand::Rng;

/// Length of strings and byte sequences produced for columns without a rule.
pub const DEFAULT_LENGTH: usize = 10;

/// Generate `len` random printable ASCII characters (space through tilde).
pub fn random_ascii_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.random_range(0x20u8..=0x7e)))
        .collect()
}

/// Generate `len` random bytes.
pub fn random_bytes<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}
