//! CLI command implementations.

pub mod doc_id;
pub mod login;
