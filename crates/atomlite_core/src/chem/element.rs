/// Element symbols indexed by `atomic_number - 1`.
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

pub const MAX_ATOMIC_NUMBER: u8 = 118;

/// Returns the element symbol for `atomic_number`, or `None` outside 1..=118.
pub fn element_symbol(atomic_number: u8) -> Option<&'static str> {
    if atomic_number == 0 {
        return None;
    }
    SYMBOLS.get(usize::from(atomic_number) - 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_cover_the_periodic_table() {
        assert_eq!(element_symbol(1), Some("H"));
        assert_eq!(element_symbol(6), Some("C"));
        assert_eq!(element_symbol(26), Some("Fe"));
        assert_eq!(element_symbol(MAX_ATOMIC_NUMBER), Some("Og"));
    }

    #[test]
    fn out_of_range_numbers_have_no_symbol() {
        assert_eq!(element_symbol(0), None);
        assert_eq!(element_symbol(119), None);
    }
}
