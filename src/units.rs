//! Physical quantities used by rate laws.
//!
//! Values are held in SI together with the unit string they were given in,
//! so they print back the way they were written. Only the units that occur
//! in rate-rule data are recognized.

use serde::{Deserialize, Serialize};

/// Molar gas constant, J/(mol*K).
pub const GAS_CONSTANT: f64 = 8.314462618;
pub const AVOGADRO: f64 = 6.02214076e23;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitsError {
    /// The unit string is not in the table for this kind of quantity.
    #[error("unknown {quantity} units {units:?}")]
    UnknownUnits {
        quantity: &'static str,
        units: String,
    },
    /// Rate coefficients of different reaction orders cannot be combined.
    #[error("cannot combine rate coefficients of {0:?} and {1:?} reactions")]
    MixedOrders(ReactionOrder, ReactionOrder),
    #[error("no rate laws to average")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionOrder {
    Unimolecular,
    Bimolecular,
    Termolecular,
}

impl ReactionOrder {
    /// The order of a reaction with `count` reactants.
    pub fn from_reactant_count(count: usize) -> Option<ReactionOrder> {
        match count {
            1 => Some(ReactionOrder::Unimolecular),
            2 => Some(ReactionOrder::Bimolecular),
            3 => Some(ReactionOrder::Termolecular),
            _ => None,
        }
    }

    /// SI-like units that averaged rate coefficients are reported in.
    pub fn canonical_units(self) -> &'static str {
        match self {
            ReactionOrder::Unimolecular => "s^-1",
            ReactionOrder::Bimolecular => "m^3/(mol*s)",
            ReactionOrder::Termolecular => "m^6/(mol^2*s)",
        }
    }
}

const RATE_UNITS: &[(&str, ReactionOrder, f64)] = &[
    ("s^-1", ReactionOrder::Unimolecular, 1.0),
    ("m^3/(mol*s)", ReactionOrder::Bimolecular, 1.0),
    ("cm^3/(mol*s)", ReactionOrder::Bimolecular, 1e-6),
    ("m^3/(molecule*s)", ReactionOrder::Bimolecular, AVOGADRO),
    ("cm^3/(molecule*s)", ReactionOrder::Bimolecular, 1e-6 * AVOGADRO),
    ("m^6/(mol^2*s)", ReactionOrder::Termolecular, 1.0),
    ("cm^6/(mol^2*s)", ReactionOrder::Termolecular, 1e-12),
    (
        "m^6/(molecule^2*s)",
        ReactionOrder::Termolecular,
        AVOGADRO * AVOGADRO,
    ),
    (
        "cm^6/(molecule^2*s)",
        ReactionOrder::Termolecular,
        1e-12 * AVOGADRO * AVOGADRO,
    ),
];

const ENERGY_UNITS: &[(&str, f64)] = &[
    ("J/mol", 1.0),
    ("kJ/mol", 1e3),
    ("cal/mol", 4.184),
    ("kcal/mol", 4184.0),
    ("K", GAS_CONSTANT),
];

/// A pre-exponential factor or rate coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, String)", into = "(f64, String)")]
pub struct RateCoefficient {
    value_si: f64,
    // Not a serialized field (the container goes through `(f64, String)`);
    // skipping keeps serde from inferring a `'de: 'static` borrow.
    #[serde(skip)]
    units: &'static str,
    factor: f64,
    order: ReactionOrder,
}

impl RateCoefficient {
    pub fn new(value: f64, units: &str) -> Result<Self, UnitsError> {
        let &(units, order, factor) = RATE_UNITS
            .iter()
            .find(|(name, _, _)| *name == units.trim())
            .ok_or_else(|| UnitsError::UnknownUnits {
                quantity: "rate coefficient",
                units: units.to_string(),
            })?;
        Ok(Self {
            value_si: value * factor,
            units,
            factor,
            order,
        })
    }

    /// A value already in SI, reported in the canonical units of `order`.
    pub fn from_si(value_si: f64, order: ReactionOrder) -> Self {
        Self {
            value_si,
            units: order.canonical_units(),
            factor: 1.0,
            order,
        }
    }

    pub fn value_si(&self) -> f64 {
        self.value_si
    }

    /// The value in the units it was given in.
    pub fn value(&self) -> f64 {
        self.value_si / self.factor
    }

    pub fn units(&self) -> &'static str {
        self.units
    }

    pub fn order(&self) -> ReactionOrder {
        self.order
    }

    pub fn scale(&mut self, factor: f64) {
        self.value_si *= factor;
    }
}

impl TryFrom<(f64, String)> for RateCoefficient {
    type Error = UnitsError;

    fn try_from((value, units): (f64, String)) -> Result<Self, Self::Error> {
        RateCoefficient::new(value, &units)
    }
}

impl From<RateCoefficient> for (f64, String) {
    fn from(k: RateCoefficient) -> Self {
        (k.value(), k.units.to_string())
    }
}

impl std::fmt::Display for RateCoefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3e} {}", self.value(), self.units)
    }
}

/// A molar energy, such as an activation energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, String)", into = "(f64, String)")]
pub struct Energy {
    value_si: f64,
    // Not a serialized field (the container goes through `(f64, String)`);
    // skipping keeps serde from inferring a `'de: 'static` borrow.
    #[serde(skip)]
    units: &'static str,
    factor: f64,
}

impl Energy {
    pub fn new(value: f64, units: &str) -> Result<Self, UnitsError> {
        let &(units, factor) = ENERGY_UNITS
            .iter()
            .find(|(name, _)| *name == units.trim())
            .ok_or_else(|| UnitsError::UnknownUnits {
                quantity: "energy",
                units: units.to_string(),
            })?;
        Ok(Self {
            value_si: value * factor,
            units,
            factor,
        })
    }

    /// An energy in J/mol, reported in kJ/mol.
    pub fn from_si(value_si: f64) -> Self {
        Self {
            value_si,
            units: "kJ/mol",
            factor: 1e3,
        }
    }

    pub fn value_si(&self) -> f64 {
        self.value_si
    }

    pub fn value(&self) -> f64 {
        self.value_si / self.factor
    }

    pub fn units(&self) -> &'static str {
        self.units
    }
}

impl Default for Energy {
    fn default() -> Self {
        Energy::from_si(0.0)
    }
}

impl TryFrom<(f64, String)> for Energy {
    type Error = UnitsError;

    fn try_from((value, units): (f64, String)) -> Result<Self, Self::Error> {
        Energy::new(value, &units)
    }
}

impl From<Energy> for (f64, String) {
    fn from(e: Energy) -> Self {
        (e.value(), e.units.to_string())
    }
}

impl std::fmt::Display for Energy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} {}", self.value(), self.units)
    }
}
