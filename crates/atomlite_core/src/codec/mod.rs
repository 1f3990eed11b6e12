//! Bidirectional conversion between native molecules and the JSON schema.
//!
//! # Responsibility
//! - `encode`: classify every bond of a native molecule into one of the three
//!   stored bond collections and copy charges and conformers.
//! - `decode`: rebuild a native molecule from a validated JSON record.
//!
//! # Invariants
//! - Both directions are pure; no I/O.
//! - A molecule either converts completely or fails with a `CodecError`.
//!   `encode` rejects bond indices and conformer lengths that `decode` would
//!   reject, so nothing undecodable is ever produced.
//! - `decode(encode(m))` preserves atom order, charges, the bond multiset by
//!   `(atom1, atom2, kind)` and conformer coordinates.

mod error;
mod schema;

pub use error::{CodecError, CodecResult};
pub use schema::{AromaticBonds, BondRecord, Bonds, Molecule};

use crate::chem::bond::BondKind;
use crate::chem::mol::{BuildMolecule, ReadMolecule};

/// Nominal order written for every dative bond.
const DATIVE_BOND_ORDER: f64 = 1.0;

/// Converts a native molecule into its JSON form.
pub fn encode<M: ReadMolecule + ?Sized>(molecule: &M) -> CodecResult<Molecule> {
    let num_atoms = molecule.num_atoms();
    let mut bonds = Bonds::default();
    let mut dative_bonds = Bonds::default();
    let mut aromatic_bonds = AromaticBonds::default();

    for index in 0..molecule.num_bonds() {
        let (atom1, atom2, kind) = molecule.bond(index);
        let field = match kind {
            BondKind::Dative => "dative_bonds",
            BondKind::Aromatic => "aromatic_bonds",
            _ => "bonds",
        };
        for atom in [atom1, atom2] {
            if atom >= num_atoms {
                return Err(CodecError::AtomIndexOutOfRange {
                    field,
                    index: atom,
                    atom_count: num_atoms,
                });
            }
        }
        match kind {
            BondKind::Dative => dative_bonds.push(atom1, atom2, DATIVE_BOND_ORDER),
            BondKind::Aromatic => aromatic_bonds.push(atom1, atom2),
            other => match other.order() {
                Some(order) => bonds.push(atom1, atom2, order),
                None => {
                    return Err(CodecError::UnsupportedBondType {
                        bond: index,
                        kind: other,
                    })
                }
            },
        }
    }

    let atomic_numbers: Vec<u8> = (0..num_atoms)
        .map(|atom| molecule.atomic_number(atom))
        .collect();
    if let Some(index) = atomic_numbers.iter().position(|&z| z == 0) {
        return Err(CodecError::InvalidAtomicNumber {
            index,
            atomic_number: 0,
        });
    }
    let charges: Vec<i32> = (0..num_atoms)
        .map(|atom| molecule.formal_charge(atom))
        .collect();
    let atom_charges = charges.iter().any(|&charge| charge != 0).then_some(charges);

    let mut conformers = Vec::with_capacity(molecule.num_conformers());
    for conformer in 0..molecule.num_conformers() {
        let positions = molecule.conformer(conformer);
        if positions.len() != num_atoms {
            return Err(CodecError::ConformerAtomCountMismatch {
                conformer,
                expected: num_atoms,
                actual: positions.len(),
            });
        }
        conformers.push(positions.to_vec());
    }

    Ok(Molecule {
        atomic_numbers,
        atom_charges,
        bonds: non_empty(bonds, Bonds::is_empty),
        dative_bonds: non_empty(dative_bonds, Bonds::is_empty),
        aromatic_bonds: non_empty(aromatic_bonds, AromaticBonds::is_empty),
        conformers: (!conformers.is_empty()).then_some(conformers),
    })
}

/// Builds a native molecule from its JSON form.
///
/// The record is fully validated before the builder is touched.
pub fn decode<M: BuildMolecule>(molecule: &Molecule) -> CodecResult<M> {
    let num_atoms = molecule.num_atoms();

    if let Some(charges) = &molecule.atom_charges {
        if charges.len() != num_atoms {
            return Err(CodecError::AtomChargeCountMismatch {
                expected: num_atoms,
                actual: charges.len(),
            });
        }
    }
    if let Some(index) = molecule.atomic_numbers.iter().position(|&z| z == 0) {
        return Err(CodecError::InvalidAtomicNumber {
            index,
            atomic_number: 0,
        });
    }
    let bond_records = molecule.bond_records()?;
    if let Some(conformers) = &molecule.conformers {
        for (conformer, positions) in conformers.iter().enumerate() {
            if positions.len() != num_atoms {
                return Err(CodecError::ConformerAtomCountMismatch {
                    conformer,
                    expected: num_atoms,
                    actual: positions.len(),
                });
            }
        }
    }

    let mut native = M::empty();
    for (atom, &atomic_number) in molecule.atomic_numbers.iter().enumerate() {
        native.add_atom(atomic_number, molecule.charge(atom), true);
    }
    for record in bond_records {
        native.add_bond(record.atom1, record.atom2, record.kind);
    }
    for positions in molecule.conformers.iter().flatten() {
        native.add_conformer(positions.clone());
    }
    Ok(native)
}

fn non_empty<T>(value: T, is_empty: impl Fn(&T) -> bool) -> Option<T> {
    if is_empty(&value) {
        None
    } else {
        Some(value)
    }
}
