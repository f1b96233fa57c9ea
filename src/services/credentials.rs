// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential rules for new accounts and password hashing.
//!
//! Rules are checked in a fixed order and the first failure wins:
//! 1. username not already taken
//! 2. username and password at least [`MIN_CREDENTIAL_LEN`] characters
//! 3. password contains a numeric character
//! 4. password starts with a letter and contains no whitespace

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum length, in characters, of both username and password.
pub const MIN_CREDENTIAL_LEN: usize = 8;

/// Why a registration attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Username or Password too short, must be greater or equal to 8 characters")]
    TooShort,

    #[error("Failed! Password must contain a number")]
    MissingNumber,

    #[error("Failed! Password must start with an alphabet and must not contain any spaces")]
    BadFormat,
}

/// Validate a candidate account.
///
/// `username_taken` is the caller's lookup of `username` against the stored
/// users. It is advisory: the storage primary key has the final say.
pub fn validate(username: &str, password: &str, username_taken: bool) -> Result<(), CredentialError> {
    if username_taken {
        return Err(CredentialError::UsernameTaken);
    }

    if password.chars().count() < MIN_CREDENTIAL_LEN
        || username.chars().count() < MIN_CREDENTIAL_LEN
    {
        return Err(CredentialError::TooShort);
    }

    if !password.chars().any(char::is_numeric) {
        return Err(CredentialError::MissingNumber);
    }

    let starts_with_letter = password.chars().next().is_some_and(char::is_alphabetic);
    if !starts_with_letter || password.chars().any(char::is_whitespace) {
        return Err(CredentialError::BadFormat);
    }

    Ok(())
}

/// One-way salted password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    fn hash(&self, password: &str) -> anyhow::Result<String>;

    /// Check `password` against a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with default parameters, stored as PHC strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
