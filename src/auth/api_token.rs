use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure 64-character hex token
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Digest stored in place of an API token. Tokens carry 256 bits of
/// entropy, so an unsalted hash is enough and keeps lookups indexable.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
