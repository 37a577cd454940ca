//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users.sql`.

/// Shop staff. Full access to the back-office endpoints.
pub const ROLE_ADMIN: &str = "admin";

/// Registered customer (bride). Can only see their own data.
pub const ROLE_CLIENT: &str = "client";

/// Every role accepted by `users.role`.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CLIENT];
