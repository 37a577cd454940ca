//! Authentication primitives.
//!
//! - [`password`] -- Argon2id hashing and strength checks.
//! - [`jwt`] -- access tokens and refresh-token hashing.

pub mod jwt;
pub mod password;
