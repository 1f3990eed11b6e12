use super::bond::BondKind;
use super::element::element_symbol;
use super::mol::Mol;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MolfileError {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("bond {index} has kind '{kind}' which has no molfile bond code")]
    UnsupportedBond { index: usize, kind: BondKind },

    #[error("atom {index} has atomic number {atomic_number} which has no element symbol")]
    UnknownElement { index: usize, atomic_number: u8 },
}

/// Writes `mol` as an MDL V3000 molfile.
///
/// Coordinates come from the first conformer; a molecule without conformers
/// is written with every atom at the origin.
pub fn write_v3000<W: Write>(mut writer: W, mol: &Mol, name: &str) -> Result<(), MolfileError> {
    let bond_codes = mol
        .bonds
        .iter()
        .enumerate()
        .map(|(index, bond)| {
            bond_code(bond.kind).ok_or(MolfileError::UnsupportedBond {
                index,
                kind: bond.kind,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    writeln!(writer, "{name}")?;
    writeln!(writer, "     atomlite          3D")?;
    writeln!(writer)?;
    writeln!(writer, "  0  0  0     0  0            999 V3000")?;
    writeln!(writer, "M  V30 BEGIN CTAB")?;
    writeln!(
        writer,
        "M  V30 COUNTS {} {} 0 0 0",
        mol.atom_count(),
        mol.bond_count()
    )?;

    writeln!(writer, "M  V30 BEGIN ATOM")?;
    let positions = mol.conformers.first();
    for (index, atom) in mol.atoms.iter().enumerate() {
        let symbol =
            element_symbol(atom.atomic_number).ok_or(MolfileError::UnknownElement {
                index,
                atomic_number: atom.atomic_number,
            })?;
        let [x, y, z] = positions
            .and_then(|conformer| conformer.get(index).copied())
            .unwrap_or([0.0; 3]);
        write!(
            writer,
            "M  V30 {} {} {:.6} {:.6} {:.6} 0",
            index + 1,
            symbol,
            x,
            y,
            z
        )?;
        if atom.formal_charge != 0 {
            write!(writer, " CHG={}", atom.formal_charge)?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "M  V30 END ATOM")?;

    if !mol.bonds.is_empty() {
        writeln!(writer, "M  V30 BEGIN BOND")?;
        for (index, (bond, code)) in mol.bonds.iter().zip(bond_codes).enumerate() {
            writeln!(
                writer,
                "M  V30 {} {} {} {}",
                index + 1,
                code,
                bond.begin + 1,
                bond.end + 1
            )?;
        }
        writeln!(writer, "M  V30 END BOND")?;
    }

    writeln!(writer, "M  V30 END CTAB")?;
    writeln!(writer, "M  END")?;
    Ok(())
}

/// Writes `mol` as a single-record SDF file.
pub fn write_sdf<W: Write>(mut writer: W, mol: &Mol, name: &str) -> Result<(), MolfileError> {
    write_v3000(&mut writer, mol, name)?;
    writeln!(writer, "$$$$")?;
    Ok(())
}

fn bond_code(kind: BondKind) -> Option<u8> {
    match kind {
        BondKind::Single => Some(1),
        BondKind::Double => Some(2),
        BondKind::Triple => Some(3),
        BondKind::Aromatic => Some(4),
        BondKind::Dative => Some(9),
        BondKind::Hydrogen => Some(10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::mol::Atom;

    fn formate() -> Mol {
        let mut mol = Mol::new();
        mol.push_atom(Atom::new(8));
        mol.push_atom(Atom::new(6));
        mol.push_atom(Atom::with_charge(8, -1));
        mol.push_bond(0, 1, BondKind::Double);
        mol.push_bond(1, 2, BondKind::Single);
        mol.conformers
            .push(vec![[0.0, 1.2, 0.0], [0.0, 0.0, 0.0], [1.1, -0.6, 0.0]]);
        mol
    }

    #[test]
    fn writes_counts_atoms_and_bonds() {
        let mut buf = Vec::new();
        write_v3000(&mut buf, &formate(), "formate").expect("write molfile");
        let text = String::from_utf8(buf).expect("molfile is utf-8");

        assert!(text.starts_with("formate\n"));
        assert!(text.contains("999 V3000"));
        assert!(text.contains("M  V30 COUNTS 3 2 0 0 0"));
        assert!(text.contains("M  V30 3 O 1.100000 -0.600000 0.000000 0 CHG=-1"));
        assert!(text.contains("M  V30 1 2 1 2"));
        assert!(text.contains("M  V30 2 1 2 3"));
        assert!(text.trim_end().ends_with("M  END"));
    }

    #[test]
    fn sdf_appends_record_terminator() {
        let mut buf = Vec::new();
        write_sdf(&mut buf, &formate(), "formate").expect("write sdf");
        let text = String::from_utf8(buf).expect("sdf is utf-8");
        assert!(text.ends_with("M  END\n$$$$\n"));
    }

    #[test]
    fn rejects_bonds_without_molfile_code() {
        let mut mol = formate();
        mol.push_bond(0, 2, BondKind::Quadruple);

        let mut buf = Vec::new();
        let err = write_v3000(&mut buf, &mol, "bad").expect_err("quadruple bonds are unsupported");
        assert!(matches!(
            err,
            MolfileError::UnsupportedBond {
                index: 2,
                kind: BondKind::Quadruple
            }
        ));
        assert!(buf.is_empty());
    }
}
