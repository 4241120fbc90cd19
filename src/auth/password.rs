use pbkdf2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Pbkdf2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Iteration count used when `PBKDF2_ROUNDS` is not set. High on purpose;
/// the stored PHC string records the count, so older hashes keep verifying
/// if it ever changes.
pub const DEFAULT_ROUNDS: u32 = 600_000;

/// PBKDF2-SHA256 with a fresh random salt. The output is a PHC string
/// (`$pbkdf2-sha256$i=...`); the plaintext is never stored anywhere.
pub fn hash_password(plain: &str, rounds: u32) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params {
        rounds,
        output_length: 32,
    };
    let hash = Pbkdf2
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| {
            error!(error = %e, "pbkdf2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Constant-time verification against a stored PHC string. Returns Ok(false)
/// on mismatch; Err only when the stored hash itself is malformed.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "pbkdf2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Pbkdf2.verify_password(plain.as_bytes(), &parsed).is_ok())
}
