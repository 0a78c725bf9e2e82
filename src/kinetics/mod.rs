//! Rate-law models and their averaging.

mod arrhenius;

pub use arrhenius::{Arrhenius, ArrheniusEP};

use serde::{Deserialize, Serialize};

use crate::units::{Energy, RateCoefficient, UnitsError};

/// Any rate law stored in a family's rules or depositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KineticsModel {
    Arrhenius(Arrhenius),
    ArrheniusEP(ArrheniusEP),
}

impl KineticsModel {
    pub fn comment(&self) -> &str {
        match self {
            KineticsModel::Arrhenius(k) => &k.comment,
            KineticsModel::ArrheniusEP(k) => &k.comment,
        }
    }

    pub fn comment_mut(&mut self) -> &mut String {
        match self {
            KineticsModel::Arrhenius(k) => &mut k.comment,
            KineticsModel::ArrheniusEP(k) => &mut k.comment,
        }
    }

    pub fn multiply_a(&mut self, factor: f64) {
        match self {
            KineticsModel::Arrhenius(k) => k.multiply_a(factor),
            KineticsModel::ArrheniusEP(k) => k.multiply_a(factor),
        }
    }

    pub fn a(&self) -> &RateCoefficient {
        match self {
            KineticsModel::Arrhenius(k) => &k.a,
            KineticsModel::ArrheniusEP(k) => &k.a,
        }
    }

    /// Rate coefficient at `t` K for a reaction enthalpy `dh` in J/mol.
    /// `dh` only matters for Evans-Polanyi models.
    pub fn rate_coefficient(&self, t: f64, dh: f64) -> f64 {
        match self {
            KineticsModel::Arrhenius(k) => k.rate_coefficient(t),
            KineticsModel::ArrheniusEP(k) => k.rate_coefficient(t, dh),
        }
    }

    pub fn to_arrhenius_ep(&self) -> ArrheniusEP {
        match self {
            KineticsModel::Arrhenius(k) => k.to_arrhenius_ep(),
            KineticsModel::ArrheniusEP(k) => k.clone(),
        }
    }
}

impl From<Arrhenius> for KineticsModel {
    fn from(k: Arrhenius) -> Self {
        KineticsModel::Arrhenius(k)
    }
}

impl From<ArrheniusEP> for KineticsModel {
    fn from(k: ArrheniusEP) -> Self {
        KineticsModel::ArrheniusEP(k)
    }
}

/// Average rate laws of one reaction order.
///
/// A is averaged as the mean of log10 of its SI value; n, alpha and E0 are
/// averaged linearly. The result is reported in the canonical units of the
/// shared order and carries an empty comment.
pub fn average_kinetics(kinetics: &[ArrheniusEP]) -> Result<ArrheniusEP, UnitsError> {
    let first = kinetics.first().ok_or(UnitsError::Empty)?;
    let order = first.a.order();
    if let Some(other) = kinetics.iter().find(|k| k.a.order() != order) {
        return Err(UnitsError::MixedOrders(order, other.a.order()));
    }

    let count = kinetics.len() as f64;
    let mut log_a = 0.0;
    let mut n = 0.0;
    let mut alpha = 0.0;
    let mut e0 = 0.0;
    for k in kinetics {
        log_a += k.a.value_si().log10();
        n += k.n;
        alpha += k.alpha;
        e0 += k.e0.value_si();
    }

    Ok(ArrheniusEP::new(
        RateCoefficient::from_si(10f64.powf(log_a / count), order),
        n / count,
        alpha / count,
        Energy::from_si(e0 / count),
    ))
}
