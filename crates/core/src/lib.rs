//! Gita Admin Core - Shared types library.
//!
//! This crate provides common types used across the Gita admin components:
//! - `auth` - Admin authorization resolution against Firebase
//! - `cli` - Command-line tools for operational checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe uids, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
