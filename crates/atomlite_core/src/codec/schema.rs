//! Canonical JSON molecule schema.
//!
//! # Responsibility
//! - Define the serde types persisted in the `molecule` column.
//! - Validate parallel bond arrays into index-checked bond records.
//!
//! # Invariants
//! - Atom index is the position in `atomic_numbers`; every other field
//!   refers to atoms by that index.
//! - Absent `atom_charges` means every charge is zero.
//! - Optional collections are omitted rather than written empty.

use super::error::{CodecError, CodecResult};
use crate::chem::bond::BondKind;
use crate::chem::mol::Position;
use serde::{Deserialize, Serialize};

/// Ordinary or dative bonds stored as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bonds {
    pub atom1: Vec<usize>,
    pub atom2: Vec<usize>,
    pub order: Vec<f64>,
}

impl Bonds {
    pub fn push(&mut self, atom1: usize, atom2: usize, order: f64) {
        self.atom1.push(atom1);
        self.atom2.push(atom2);
        self.order.push(order);
    }

    pub fn is_empty(&self) -> bool {
        self.atom1.is_empty()
    }
}

/// Aromatic bonds. Aromaticity is a bond kind, so no order is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AromaticBonds {
    pub atom1: Vec<usize>,
    pub atom2: Vec<usize>,
}

impl AromaticBonds {
    pub fn push(&mut self, atom1: usize, atom2: usize) {
        self.atom1.push(atom1);
        self.atom2.push(atom2);
    }

    pub fn is_empty(&self) -> bool {
        self.atom1.is_empty()
    }
}

/// A molecule in its stored JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub atomic_numbers: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_charges: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonds: Option<Bonds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dative_bonds: Option<Bonds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aromatic_bonds: Option<AromaticBonds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conformers: Option<Vec<Vec<Position>>>,
}

/// One validated bond, ready to hand to a molecule builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondRecord {
    pub atom1: usize,
    pub atom2: usize,
    pub kind: BondKind,
}

impl Molecule {
    pub fn num_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    /// Charge of `atom`, treating absent `atom_charges` as all zero.
    pub fn charge(&self, atom: usize) -> i32 {
        self.atom_charges
            .as_ref()
            .and_then(|charges| charges.get(atom).copied())
            .unwrap_or(0)
    }

    /// Flattens the three bond collections into one validated list.
    ///
    /// Records are emitted in collection order: `bonds`, then
    /// `dative_bonds`, then `aromatic_bonds`.
    pub fn bond_records(&self) -> CodecResult<Vec<BondRecord>> {
        let atom_count = self.num_atoms();
        let mut records = Vec::new();

        if let Some(bonds) = &self.bonds {
            check_lengths("bonds", &bonds.atom1, &bonds.atom2, Some(bonds.order.as_slice()))?;
            for (position, ((&atom1, &atom2), &order)) in bonds
                .atom1
                .iter()
                .zip(&bonds.atom2)
                .zip(&bonds.order)
                .enumerate()
            {
                let kind = BondKind::from_order(order)
                    .ok_or(CodecError::InvalidBondOrder { position, order })?;
                records.push(checked_record("bonds", atom1, atom2, kind, atom_count)?);
            }
        }

        if let Some(bonds) = &self.dative_bonds {
            check_lengths(
                "dative_bonds",
                &bonds.atom1,
                &bonds.atom2,
                Some(bonds.order.as_slice()),
            )?;
            for (&atom1, &atom2) in bonds.atom1.iter().zip(&bonds.atom2) {
                records.push(checked_record(
                    "dative_bonds",
                    atom1,
                    atom2,
                    BondKind::Dative,
                    atom_count,
                )?);
            }
        }

        if let Some(bonds) = &self.aromatic_bonds {
            check_lengths("aromatic_bonds", &bonds.atom1, &bonds.atom2, None)?;
            for (&atom1, &atom2) in bonds.atom1.iter().zip(&bonds.atom2) {
                records.push(checked_record(
                    "aromatic_bonds",
                    atom1,
                    atom2,
                    BondKind::Aromatic,
                    atom_count,
                )?);
            }
        }

        Ok(records)
    }
}

fn check_lengths(
    field: &'static str,
    atom1: &[usize],
    atom2: &[usize],
    order: Option<&[f64]>,
) -> CodecResult<()> {
    let order_len = order.map(<[f64]>::len);
    let order_ok = order_len.map_or(true, |len| len == atom1.len());
    if atom1.len() != atom2.len() || !order_ok {
        return Err(CodecError::BondArrayLengthMismatch {
            field,
            atom1: atom1.len(),
            atom2: atom2.len(),
            order: order_len,
        });
    }
    Ok(())
}

fn checked_record(
    field: &'static str,
    atom1: usize,
    atom2: usize,
    kind: BondKind,
    atom_count: usize,
) -> CodecResult<BondRecord> {
    for index in [atom1, atom2] {
        if index >= atom_count {
            return Err(CodecError::AtomIndexOutOfRange {
                field,
                index,
                atom_count,
            });
        }
    }
    Ok(BondRecord { atom1, atom2, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Molecule {
        Molecule {
            atomic_numbers: vec![8, 1, 1],
            bonds: Some(Bonds {
                atom1: vec![0, 0],
                atom2: vec![1, 2],
                order: vec![1.0, 1.0],
            }),
            ..Molecule::default()
        }
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let json = serde_json::to_string(&water()).expect("serialize molecule");
        assert_eq!(
            json,
            r#"{"atomic_numbers":[8,1,1],"bonds":{"atom1":[0,0],"atom2":[1,2],"order":[1.0,1.0]}}"#
        );
    }

    #[test]
    fn deserializes_integer_coordinates() {
        let molecule: Molecule = serde_json::from_str(
            r#"{"atomic_numbers":[6],"conformers":[[[1,2,3]]]}"#,
        )
        .expect("deserialize molecule");
        assert_eq!(molecule.conformers, Some(vec![vec![[1.0, 2.0, 3.0]]]));
        assert_eq!(molecule.charge(0), 0);
    }

    #[test]
    fn bond_records_validate_lengths() {
        let mut molecule = water();
        molecule.bonds.as_mut().unwrap().order.pop();
        let err = molecule.bond_records().unwrap_err();
        assert_eq!(
            err,
            CodecError::BondArrayLengthMismatch {
                field: "bonds",
                atom1: 2,
                atom2: 2,
                order: Some(1),
            }
        );
    }

    #[test]
    fn bond_records_validate_atom_indices() {
        let mut molecule = water();
        molecule.aromatic_bonds = Some(AromaticBonds {
            atom1: vec![1],
            atom2: vec![3],
        });
        let err = molecule.bond_records().unwrap_err();
        assert_eq!(
            err,
            CodecError::AtomIndexOutOfRange {
                field: "aromatic_bonds",
                index: 3,
                atom_count: 3,
            }
        );
    }

    #[test]
    fn bond_records_reject_unknown_orders() {
        let mut molecule = water();
        molecule.bonds.as_mut().unwrap().order[1] = 7.0;
        let err = molecule.bond_records().unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidBondOrder {
                position: 1,
                order: 7.0
            }
        );
    }
}
