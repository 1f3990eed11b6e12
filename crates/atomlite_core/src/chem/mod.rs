//! Native molecule model used on the in-memory side of the codec.
//!
//! - [`bond`] – bond kinds and their numeric orders.
//! - [`element`] – element symbols by atomic number.
//! - [`mol`] – the `Mol` graph plus the `ReadMolecule` / `BuildMolecule`
//!   capability traits.
//! - [`molfile`] – MDL V3000 molfile and SDF export.

pub mod bond;
pub mod element;
pub mod mol;
pub mod molfile;
