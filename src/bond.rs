#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    pub fn value(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn from_value(value: i16) -> Option<BondOrder> {
        match value {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            _ => None,
        }
    }

    pub fn shifted(self, delta: i8) -> Option<BondOrder> {
        BondOrder::from_value(self.value() as i16 + delta as i16)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BondOrder::Single => "S",
            BondOrder::Double => "D",
            BondOrder::Triple => "T",
        }
    }

    pub fn from_symbol(s: &str) -> Option<BondOrder> {
        match s {
            "S" => Some(BondOrder::Single),
            "D" => Some(BondOrder::Double),
            "T" => Some(BondOrder::Triple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bond {
    pub order: BondOrder,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self { order }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::RecipeBond for Bond {
    fn single() -> Self {
        Self::new(BondOrder::Single)
    }

    fn change_order(&mut self, delta: i8) -> bool {
        match self.order.shifted(delta) {
            Some(order) => {
                self.order = order;
                true
            }
            None => false,
        }
    }

    fn order_hint(&self) -> Option<BondOrder> {
        Some(self.order)
    }
}

/// Bond in a group pattern. An empty `orders` list matches any order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupBond {
    pub orders: Vec<BondOrder>,
}

impl GroupBond {
    pub fn new(orders: Vec<BondOrder>) -> Self {
        Self { orders }
    }

    pub fn matches_bond(&self, bond: &Bond) -> bool {
        self.orders.is_empty() || self.orders.contains(&bond.order)
    }

    pub fn is_equivalent(&self, other: &GroupBond) -> bool {
        same_set(&self.orders, &other.orders)
    }
}

impl crate::traits::RecipeBond for GroupBond {
    fn single() -> Self {
        Self::new(vec![BondOrder::Single])
    }

    fn change_order(&mut self, delta: i8) -> bool {
        let shifted: Option<Vec<BondOrder>> =
            self.orders.iter().map(|o| o.shifted(delta)).collect();
        match shifted {
            Some(orders) => {
                self.orders = orders;
                true
            }
            None => false,
        }
    }

    fn order_hint(&self) -> Option<BondOrder> {
        match self.orders.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

pub(crate) fn same_set<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.iter().all(|x| b.contains(x)) && b.iter().all(|x| a.contains(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecipeBond;

    #[test]
    fn shift_within_range() {
        assert_eq!(BondOrder::Single.shifted(1), Some(BondOrder::Double));
        assert_eq!(BondOrder::Triple.shifted(-2), Some(BondOrder::Single));
        assert_eq!(BondOrder::Single.shifted(-1), None);
        assert_eq!(BondOrder::Triple.shifted(1), None);
    }

    #[test]
    fn group_bond_shift_all_or_nothing() {
        let mut bond = GroupBond::new(vec![BondOrder::Single, BondOrder::Double]);
        assert!(bond.change_order(1));
        assert_eq!(bond.orders, vec![BondOrder::Double, BondOrder::Triple]);
        assert!(!bond.change_order(1));
        assert_eq!(bond.orders, vec![BondOrder::Double, BondOrder::Triple]);
    }

    #[test]
    fn group_bond_matching() {
        let any = GroupBond::default();
        let double = GroupBond::new(vec![BondOrder::Double]);
        assert!(any.matches_bond(&Bond::new(BondOrder::Triple)));
        assert!(double.matches_bond(&Bond::new(BondOrder::Double)));
        assert!(!double.matches_bond(&Bond::new(BondOrder::Single)));
    }

    #[test]
    fn equivalence_ignores_order_of_listing() {
        let a = GroupBond::new(vec![BondOrder::Single, BondOrder::Double]);
        let b = GroupBond::new(vec![BondOrder::Double, BondOrder::Single]);
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&GroupBond::single()));
    }
}
