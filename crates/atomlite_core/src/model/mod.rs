//! Stored record types.
//!
//! # Responsibility
//! - Define the entry shapes read from and written to the molecule table.
//! - Classify JSON property values by runtime type.
//!
//! # Invariants
//! - Every entry is identified by a unique string key.
//! - Properties are always a JSON object, empty by default.

pub mod entry;
pub mod json;
