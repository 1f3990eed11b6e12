//! In-memory molecule graph and the capability traits the codec relies on.
//!
//! # Responsibility
//! - Define the read/build contract any chemistry toolkit must satisfy to be
//!   converted to and from the stored JSON representation.
//! - Provide `Mol`, a minimal implementation used by the CLI and tests.
//!
//! # Invariants
//! - Atom indices are insertion order and never change.
//! - Every conformer holds exactly one position per atom.

use super::bond::BondKind;
use super::element::element_symbol;
use std::fmt::Write;

/// Cartesian position in Angstrom.
pub type Position = [f64; 3];

/// Read access to a native molecule.
pub trait ReadMolecule {
    fn num_atoms(&self) -> usize;
    fn atomic_number(&self, atom: usize) -> u8;
    fn formal_charge(&self, atom: usize) -> i32;
    fn num_bonds(&self) -> usize;
    /// Returns `(begin_atom, end_atom, kind)`.
    fn bond(&self, bond: usize) -> (usize, usize, BondKind);
    fn num_conformers(&self) -> usize;
    fn conformer(&self, conformer: usize) -> &[Position];
}

/// Incremental construction of a native molecule.
///
/// Callers are responsible for passing valid atom indices and conformers
/// whose length matches the atom count; the codec validates both before
/// calling into a builder.
pub trait BuildMolecule {
    fn empty() -> Self;
    /// Adds an atom and returns its index.
    fn add_atom(&mut self, atomic_number: u8, formal_charge: i32, no_implicit: bool) -> usize;
    /// Adds a bond and returns its index.
    fn add_bond(&mut self, begin: usize, end: usize, kind: BondKind) -> usize;
    /// Adds a conformer and returns its index.
    fn add_conformer(&mut self, positions: Vec<Position>) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub atomic_number: u8,
    pub formal_charge: i32,
    /// Set when hydrogen counts must not be inferred for this atom.
    pub no_implicit: bool,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            formal_charge: 0,
            no_implicit: false,
        }
    }

    pub fn with_charge(atomic_number: u8, formal_charge: i32) -> Self {
        Self {
            formal_charge,
            ..Self::new(atomic_number)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub kind: BondKind,
}

impl Bond {
    pub fn new(begin: usize, end: usize, kind: BondKind) -> Self {
        Self { begin, end, kind }
    }

    /// Endpoint pair used for comparison; undirected kinds are sorted.
    fn canonical_pair(&self) -> (usize, usize) {
        if self.kind.is_directed() || self.begin <= self.end {
            (self.begin, self.end)
        } else {
            (self.end, self.begin)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mol {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub conformers: Vec<Vec<Position>>,
}

impl Mol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn push_bond(&mut self, begin: usize, end: usize, kind: BondKind) -> usize {
        self.bonds.push(Bond::new(begin, end, kind));
        self.bonds.len() - 1
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Deterministic text form used to compare molecules structurally.
    ///
    /// Atoms are rendered in index order as `Symbol` plus a signed charge
    /// when non-zero. Bonds follow after `|`, sorted, each as
    /// `atom1<symbol>atom2`. Coordinates and hydrogen flags are not part of
    /// the rendering.
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        for (idx, atom) in self.atoms.iter().enumerate() {
            if idx > 0 {
                out.push('.');
            }
            match element_symbol(atom.atomic_number) {
                Some(symbol) => out.push_str(symbol),
                None => {
                    let _ = write!(out, "#{}", atom.atomic_number);
                }
            }
            if atom.formal_charge != 0 {
                let _ = write!(out, "{:+}", atom.formal_charge);
            }
        }

        let mut bonds: Vec<(usize, usize, BondKind)> = self
            .bonds
            .iter()
            .map(|bond| {
                let (a, b) = bond.canonical_pair();
                (a, b, bond.kind)
            })
            .collect();
        bonds.sort();

        out.push('|');
        for (idx, (a, b, kind)) in bonds.into_iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            let _ = write!(out, "{a}{}{b}", kind.symbol());
        }
        out
    }
}

impl ReadMolecule for Mol {
    fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    fn atomic_number(&self, atom: usize) -> u8 {
        self.atoms[atom].atomic_number
    }

    fn formal_charge(&self, atom: usize) -> i32 {
        self.atoms[atom].formal_charge
    }

    fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    fn bond(&self, bond: usize) -> (usize, usize, BondKind) {
        let bond = &self.bonds[bond];
        (bond.begin, bond.end, bond.kind)
    }

    fn num_conformers(&self) -> usize {
        self.conformers.len()
    }

    fn conformer(&self, conformer: usize) -> &[Position] {
        &self.conformers[conformer]
    }
}

impl BuildMolecule for Mol {
    fn empty() -> Self {
        Self::new()
    }

    fn add_atom(&mut self, atomic_number: u8, formal_charge: i32, no_implicit: bool) -> usize {
        self.push_atom(Atom {
            atomic_number,
            formal_charge,
            no_implicit,
        })
    }

    fn add_bond(&mut self, begin: usize, end: usize, kind: BondKind) -> usize {
        debug_assert!(begin < self.atoms.len() && end < self.atoms.len());
        self.push_bond(begin, end, kind)
    }

    fn add_conformer(&mut self, positions: Vec<Position>) -> usize {
        debug_assert_eq!(positions.len(), self.atoms.len());
        self.conformers.push(positions);
        self.conformers.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_ignores_bond_insertion_order_and_direction() {
        let mut first = Mol::new();
        first.push_atom(Atom::new(6));
        first.push_atom(Atom::new(8));
        first.push_atom(Atom::with_charge(8, -1));
        first.push_bond(0, 1, BondKind::Double);
        first.push_bond(0, 2, BondKind::Single);

        let mut second = first.clone();
        second.bonds = vec![
            Bond::new(2, 0, BondKind::Single),
            Bond::new(1, 0, BondKind::Double),
        ];

        assert_eq!(first.canonical_string(), "C.O.O-1|0=1,0-2");
        assert_eq!(first.canonical_string(), second.canonical_string());
    }

    #[test]
    fn canonical_string_keeps_dative_direction() {
        let mut forward = Mol::new();
        forward.push_atom(Atom::new(17));
        forward.push_atom(Atom::new(26));
        forward.push_bond(0, 1, BondKind::Dative);

        let mut backward = forward.clone();
        backward.bonds[0] = Bond::new(1, 0, BondKind::Dative);

        assert_eq!(forward.canonical_string(), "Cl.Fe|0->1");
        assert_ne!(forward.canonical_string(), backward.canonical_string());
    }
}
