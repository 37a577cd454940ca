//! Argon2id password hashing and strength checks.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwertyuiop",
    "contraseña",
    "ortanovias",
];

/// Hash a plaintext password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject short, all-numeric, common, or identity-derived passwords.
pub fn validate_password_strength(password: &str, identity: &[&str]) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("La contraseña no puede ser solo numérica".to_string());
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err("La contraseña es demasiado común".to_string());
    }
    if identity
        .iter()
        .map(|s| s.split('@').next().unwrap_or(s).to_lowercase())
        .any(|id| id.len() >= 3 && lowered.contains(&id))
    {
        return Err("La contraseña es demasiado parecida a sus datos personales".to_string());
    }
    Ok(())
}
