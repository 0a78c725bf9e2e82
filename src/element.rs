/// Elements that can appear in reaction-family templates and species.
///
/// The table is limited to the main-group elements found in gas-phase
/// combustion and pyrolysis mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    Br = 35,
    I = 53,
}

const ELEMENTS: [(&str, Element); 14] = [
    ("H", Element::H),
    ("He", Element::He),
    ("C", Element::C),
    ("N", Element::N),
    ("O", Element::O),
    ("F", Element::F),
    ("Ne", Element::Ne),
    ("Si", Element::Si),
    ("P", Element::P),
    ("S", Element::S),
    ("Cl", Element::Cl),
    ("Ar", Element::Ar),
    ("Br", Element::Br),
    ("I", Element::I),
];

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ELEMENTS
            .iter()
            .map(|&(_, e)| e)
            .find(|e| e.atomic_num() == n)
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        ELEMENTS.iter().find(|(sym, _)| *sym == s).map(|(_, e)| *e)
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        ELEMENTS
            .iter()
            .find(|(_, e)| *e == self)
            .map_or("?", |(sym, _)| sym)
    }

    pub fn atomic_weight(self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::He => 4.0026,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998,
            Element::Ne => 20.180,
            Element::Si => 28.085,
            Element::P => 30.974,
            Element::S => 32.06,
            Element::Cl => 35.45,
            Element::Ar => 39.948,
            Element::Br => 79.904,
            Element::I => 126.904,
        }
    }

    /// Noble gases never bond; they take part in reactions only as bath gas.
    pub fn is_noble_gas(self) -> bool {
        matches!(self, Element::He | Element::Ne | Element::Ar)
    }

    pub fn is_heavy(self) -> bool {
        self != Element::H
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for (sym, elem) in ELEMENTS {
            assert_eq!(Element::from_symbol(sym), Some(elem));
            assert_eq!(elem.symbol(), sym);
        }
    }

    #[test]
    fn atomic_numbers() {
        assert_eq!(Element::C.atomic_num(), 6);
        assert_eq!(Element::from_atomic_num(8), Some(Element::O));
        assert_eq!(Element::from_atomic_num(26), None);
    }

    #[test]
    fn unknown_symbol() {
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::from_symbol("c"), None);
    }

    #[test]
    fn heavy_atoms() {
        assert!(!Element::H.is_heavy());
        assert!(Element::C.is_heavy());
        assert!(Element::Ar.is_noble_gas());
    }
}
