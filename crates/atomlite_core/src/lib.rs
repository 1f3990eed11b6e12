//! Embedded molecule store on top of SQLite.
//!
//! Entries pair a unique key with an optional molecule, stored in a compact
//! JSON schema, and a free-form JSON properties object. The codec converts
//! between that schema and native molecules; the store persists entries and
//! exposes path-addressed property access and tabular property extraction.

pub mod chem;
pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use chem::bond::BondKind;
pub use chem::mol::{Atom, Bond, BuildMolecule, Mol, Position, ReadMolecule};
pub use codec::{decode, encode, AromaticBonds, Bonds, CodecError, CodecResult, Molecule};
pub use db::{DatabaseConfig, DbError, DbResult, DEFAULT_MOLECULE_TABLE};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::entry::{Entry, Properties, PropertyEntry};
pub use model::json::JsonType;
pub use repo::{Database, Inclusion, PropertyTable, RepoError, RepoResult, RowIter};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
