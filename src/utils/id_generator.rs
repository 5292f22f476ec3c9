//! Slug and secret-key generation.
//!
//! Both identifiers draw from the operating system CSPRNG through `getrandom`.
//! Neither function checks storage: slug uniqueness is enforced by the store.

use crate::error::Result;
use base64::Engine as _;

/// Characters a slug may contain.
///
/// Lowercase letters and digits without the look-alikes `0`, `o`, `1` and `l`.
pub const SLUG_ALPHABET: &[u8] = b"23456789abcdefghijkmnpqrstuvwxyz";

/// Number of characters in a slug.
pub const SLUG_LENGTH: usize = 6;

/// Number of random bytes behind a secret key before encoding.
pub const SECRET_KEY_BYTES: usize = 32;

/// Largest byte value (exclusive) that maps uniformly onto the alphabet.
const SLUG_BYTE_LIMIT: usize = 256 - (256 % SLUG_ALPHABET.len());

/// Source of slugs and secret keys used by the store.
///
/// The production implementation is [`RandomIdGenerator`]; tests substitute
/// deterministic sequences to force collisions.
pub trait IdGenerator: Send + Sync {
    fn slug(&self) -> Result<String>;

    fn secret_key(&self) -> Result<String>;
}

/// [`IdGenerator`] backed by the OS random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn slug(&self) -> Result<String> {
        generate_slug()
    }

    fn secret_key(&self) -> Result<String> {
        generate_secret_key()
    }
}

/// Generates a random slug of [`SLUG_LENGTH`] characters.
///
/// Each character is picked independently and uniformly from
/// [`SLUG_ALPHABET`]. Bytes at or above [`SLUG_BYTE_LIMIT`] are rejected so
/// the modulo never favours the start of the alphabet.
///
/// # Errors
///
/// Returns [`crate::AppError::RandomSource`] if the entropy source fails.
pub fn generate_slug() -> Result<String> {
    let mut slug = String::with_capacity(SLUG_LENGTH);
    let mut buffer = [0u8; SLUG_LENGTH * 2];

    while slug.len() < SLUG_LENGTH {
        getrandom::fill(&mut buffer)?;

        for &byte in &buffer {
            if usize::from(byte) >= SLUG_BYTE_LIMIT {
                continue;
            }
            slug.push(char::from(
                SLUG_ALPHABET[usize::from(byte) % SLUG_ALPHABET.len()],
            ));
            if slug.len() == SLUG_LENGTH {
                break;
            }
        }
    }

    Ok(slug)
}

/// Generates a secret key: [`SECRET_KEY_BYTES`] random bytes encoded as
/// URL-safe base64 without padding (43 characters).
///
/// # Errors
///
/// Returns [`crate::AppError::RandomSource`] if the entropy source fails.
pub fn generate_secret_key() -> Result<String> {
    let mut buffer = [0u8; SECRET_KEY_BYTES];

    getrandom::fill(&mut buffer)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}
