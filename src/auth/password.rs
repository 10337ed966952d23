use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a plaintext password with argon2id and a random salt. The PHC string
/// is returned as opaque bytes, the only form that is ever persisted.
pub fn hash_password(plain: &str) -> anyhow::Result<Vec<u8>> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash.into_bytes())
}

/// Verify a plaintext password against a stored hash. A mismatch is
/// `Ok(false)`, never an error; `Err` means the stored hash is corrupt.
pub fn verify_password(plain: &str, stored: &[u8]) -> anyhow::Result<bool> {
    let encoded = std::str::from_utf8(stored).map_err(|e| {
        error!(error = %e, "stored password hash is not valid utf-8");
        anyhow::anyhow!("malformed password hash")
    })?;
    let parsed = PasswordHash::new(encoded).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
