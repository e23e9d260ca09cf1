//! Business logic services.
//!
//! # Services
//!
//! - `auth` - password hashing, access tokens and user resolution

pub mod auth;
