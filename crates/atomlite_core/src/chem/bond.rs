use std::fmt;

/// Bond classification used by the native molecule model.
///
/// Only the ordinary kinds (whole and half orders), `Aromatic` and `Dative`
/// can be stored. The remaining kinds exist so that molecules coming from
/// other toolkits can be represented and rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondKind {
    Unspecified,
    Single,
    Double,
    Triple,
    Quadruple,
    Quintuple,
    Hextuple,
    OneAndAHalf,
    TwoAndAHalf,
    ThreeAndAHalf,
    FourAndAHalf,
    FiveAndAHalf,
    Aromatic,
    Dative,
    Ionic,
    Hydrogen,
    Zero,
    Other,
}

impl BondKind {
    /// Numeric order of an ordinary bond, `None` for every other kind.
    pub fn order(self) -> Option<f64> {
        match self {
            Self::Single => Some(1.0),
            Self::OneAndAHalf => Some(1.5),
            Self::Double => Some(2.0),
            Self::TwoAndAHalf => Some(2.5),
            Self::Triple => Some(3.0),
            Self::ThreeAndAHalf => Some(3.5),
            Self::Quadruple => Some(4.0),
            Self::FourAndAHalf => Some(4.5),
            Self::Quintuple => Some(5.0),
            Self::FiveAndAHalf => Some(5.5),
            Self::Hextuple => Some(6.0),
            _ => None,
        }
    }

    /// Inverse of [`BondKind::order`].
    ///
    /// Matching is exact: every recognised order is a multiple of one half and
    /// is therefore represented exactly as `f64`.
    pub fn from_order(order: f64) -> Option<Self> {
        if !order.is_finite() {
            return None;
        }
        let doubled = order * 2.0;
        if doubled.fract() != 0.0 {
            return None;
        }
        match doubled as i64 {
            2 => Some(Self::Single),
            3 => Some(Self::OneAndAHalf),
            4 => Some(Self::Double),
            5 => Some(Self::TwoAndAHalf),
            6 => Some(Self::Triple),
            7 => Some(Self::ThreeAndAHalf),
            8 => Some(Self::Quadruple),
            9 => Some(Self::FourAndAHalf),
            10 => Some(Self::Quintuple),
            11 => Some(Self::FiveAndAHalf),
            12 => Some(Self::Hextuple),
            _ => None,
        }
    }

    pub fn is_ordinary(self) -> bool {
        self.order().is_some()
    }

    /// Dative bonds point from donor to acceptor; all other kinds are symmetric.
    pub fn is_directed(self) -> bool {
        matches!(self, Self::Dative)
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Self::Single => "-",
            Self::Double => "=",
            Self::Triple => "#",
            Self::Quadruple => "$",
            Self::Aromatic => ":",
            Self::Dative => "->",
            Self::OneAndAHalf => "~1.5~",
            Self::TwoAndAHalf => "~2.5~",
            Self::ThreeAndAHalf => "~3.5~",
            Self::FourAndAHalf => "~4.5~",
            Self::Quintuple => "~5~",
            Self::FiveAndAHalf => "~5.5~",
            Self::Hextuple => "~6~",
            Self::Unspecified => "~?~",
            Self::Ionic => "~ionic~",
            Self::Hydrogen => "~hbond~",
            Self::Zero => "~0~",
            Self::Other => "~other~",
        }
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "unspecified",
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::Quadruple => "quadruple",
            Self::Quintuple => "quintuple",
            Self::Hextuple => "hextuple",
            Self::OneAndAHalf => "one-and-a-half",
            Self::TwoAndAHalf => "two-and-a-half",
            Self::ThreeAndAHalf => "three-and-a-half",
            Self::FourAndAHalf => "four-and-a-half",
            Self::FiveAndAHalf => "five-and-a-half",
            Self::Aromatic => "aromatic",
            Self::Dative => "dative",
            Self::Ionic => "ionic",
            Self::Hydrogen => "hydrogen",
            Self::Zero => "zero",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDINARY: [BondKind; 11] = [
        BondKind::Single,
        BondKind::Double,
        BondKind::Triple,
        BondKind::Quadruple,
        BondKind::Quintuple,
        BondKind::Hextuple,
        BondKind::OneAndAHalf,
        BondKind::TwoAndAHalf,
        BondKind::ThreeAndAHalf,
        BondKind::FourAndAHalf,
        BondKind::FiveAndAHalf,
    ];

    #[test]
    fn from_order_inverts_order_for_all_ordinary_kinds() {
        for kind in ORDINARY {
            let order = kind.order().expect("ordinary kinds have an order");
            assert_eq!(BondKind::from_order(order), Some(kind));
        }
    }

    #[test]
    fn from_order_rejects_values_outside_the_recognised_set() {
        for order in [0.0, 0.5, 1.25, 6.5, 7.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(BondKind::from_order(order), None, "order {order}");
        }
    }

    #[test]
    fn special_kinds_have_no_order() {
        for kind in [
            BondKind::Aromatic,
            BondKind::Dative,
            BondKind::Ionic,
            BondKind::Hydrogen,
            BondKind::Zero,
            BondKind::Unspecified,
            BondKind::Other,
        ] {
            assert!(!kind.is_ordinary());
        }
    }
}
