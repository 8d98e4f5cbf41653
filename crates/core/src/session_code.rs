//! Short join codes for live sessions.

use rand::Rng;

/// 32 symbols: A-Z and 2-9 without the look-alikes `I`, `O`, `0` and `1`.
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 6;

/// Attempts made to avoid an already-active code before accepting a clash.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Draw one random code.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// The outcome of [`generate_unique_code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    /// Number of draws taken, at most [`MAX_CODE_ATTEMPTS`].
    pub attempts: usize,
    /// `false` when every attempt clashed and the last draw was kept anyway.
    pub unique: bool,
}

/// Draw codes until `is_taken` returns `false` or the attempts run out.
///
/// After [`MAX_CODE_ATTEMPTS`] clashing draws the last code is returned
/// regardless, with `unique` set to `false`.
pub fn generate_unique_code<R, F>(rng: &mut R, is_taken: F) -> GeneratedCode
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut code = generate_code(rng);
    let mut attempts = 1;
    while is_taken(&code) {
        if attempts >= MAX_CODE_ATTEMPTS {
            return GeneratedCode {
                code,
                attempts,
                unique: false,
            };
        }
        code = generate_code(rng);
        attempts += 1;
    }
    GeneratedCode {
        code,
        attempts,
        unique: true,
    }
}

/// Canonical form used for lookups: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
