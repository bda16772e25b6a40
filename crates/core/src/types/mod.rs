//! Core types for the Gita admin panel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod role;
pub mod uid;

pub use email::{Email, EmailError};
pub use role::AdminRole;
pub use uid::Uid;
