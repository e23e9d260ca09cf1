//! Core types for Directorio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod username;

pub use id::*;
pub use username::{Username, UsernameError};
