use crate::chem::bond::BondKind;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Failures converting between a native molecule and its JSON form.
///
/// Every variant is fatal for the molecule being converted; nothing is
/// partially emitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("bond {bond} has unsupported bond type '{kind}'")]
    UnsupportedBondType { bond: usize, kind: BondKind },

    #[error("invalid bond order {order} in `bonds` at position {position}")]
    InvalidBondOrder { position: usize, order: f64 },

    #[error("conformer {conformer} has {actual} positions but the molecule has {expected} atoms")]
    ConformerAtomCountMismatch {
        conformer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("`{field}` arrays have mismatched lengths (atom1={atom1}, atom2={atom2}, order={order:?})")]
    BondArrayLengthMismatch {
        field: &'static str,
        atom1: usize,
        atom2: usize,
        order: Option<usize>,
    },

    #[error("`{field}` references atom {index} but the molecule has {atom_count} atoms")]
    AtomIndexOutOfRange {
        field: &'static str,
        index: usize,
        atom_count: usize,
    },

    #[error("`atom_charges` has {actual} entries but the molecule has {expected} atoms")]
    AtomChargeCountMismatch { expected: usize, actual: usize },

    #[error("atom {index} has invalid atomic number {atomic_number}")]
    InvalidAtomicNumber { index: usize, atomic_number: u8 },
}
