use serde::{Deserialize, Serialize};

use crate::units::{Energy, GAS_CONSTANT, RateCoefficient};

fn one_kelvin() -> f64 {
    1.0
}

/// Modified Arrhenius expression, `k(T) = A (T/T0)^n exp(-Ea/RT)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrhenius {
    pub a: RateCoefficient,
    #[serde(default)]
    pub n: f64,
    pub ea: Energy,
    /// Reference temperature in K.
    #[serde(default = "one_kelvin")]
    pub t0: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_max: Option<f64>,
    #[serde(default)]
    pub comment: String,
}

impl Arrhenius {
    pub fn new(a: RateCoefficient, n: f64, ea: Energy) -> Self {
        Self {
            a,
            n,
            ea,
            t0: 1.0,
            t_min: None,
            t_max: None,
            comment: String::new(),
        }
    }

    /// Rate coefficient at `t` K, in SI.
    pub fn rate_coefficient(&self, t: f64) -> f64 {
        self.a.value_si() * (t / self.t0).powf(self.n) * (-self.ea.value_si() / (GAS_CONSTANT * t)).exp()
    }

    pub fn is_temperature_valid(&self, t: f64) -> bool {
        self.t_min.is_none_or(|lo| t >= lo) && self.t_max.is_none_or(|hi| t <= hi)
    }

    /// Move the reference temperature to `t0`, keeping k(T) unchanged.
    pub fn change_t0(&mut self, t0: f64) {
        self.a.scale((t0 / self.t0).powf(self.n));
        self.t0 = t0;
    }

    pub fn multiply_a(&mut self, factor: f64) {
        self.a.scale(factor);
    }

    /// The equivalent Evans-Polanyi form with `alpha = 0` and `E0 = Ea`.
    pub fn to_arrhenius_ep(&self) -> ArrheniusEP {
        let mut rebased = self.clone();
        rebased.change_t0(1.0);
        ArrheniusEP {
            a: rebased.a,
            n: rebased.n,
            alpha: 0.0,
            e0: rebased.ea,
            t_min: rebased.t_min,
            t_max: rebased.t_max,
            comment: rebased.comment,
        }
    }
}

/// Arrhenius expression with an Evans-Polanyi activation energy,
/// `Ea = alpha * dH + E0`, referenced to T0 = 1 K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusEP {
    pub a: RateCoefficient,
    #[serde(default)]
    pub n: f64,
    #[serde(default)]
    pub alpha: f64,
    pub e0: Energy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_max: Option<f64>,
    #[serde(default)]
    pub comment: String,
}

impl ArrheniusEP {
    pub fn new(a: RateCoefficient, n: f64, alpha: f64, e0: Energy) -> Self {
        Self {
            a,
            n,
            alpha,
            e0,
            t_min: None,
            t_max: None,
            comment: String::new(),
        }
    }

    /// Activation energy in J/mol for a reaction enthalpy `dh` in J/mol.
    pub fn activation_energy(&self, dh: f64) -> f64 {
        self.alpha * dh + self.e0.value_si()
    }

    pub fn rate_coefficient(&self, t: f64, dh: f64) -> f64 {
        self.a.value_si() * t.powf(self.n) * (-self.activation_energy(dh) / (GAS_CONSTANT * t)).exp()
    }

    pub fn is_temperature_valid(&self, t: f64) -> bool {
        self.t_min.is_none_or(|lo| t >= lo) && self.t_max.is_none_or(|hi| t <= hi)
    }

    pub fn multiply_a(&mut self, factor: f64) {
        self.a.scale(factor);
    }

    /// Fix the activation energy for a reaction enthalpy `dh` in J/mol.
    pub fn to_arrhenius(&self, dh: f64) -> Arrhenius {
        Arrhenius {
            a: self.a.clone(),
            n: self.n,
            ea: Energy::from_si(self.activation_energy(dh)),
            t0: 1.0,
            t_min: self.t_min,
            t_max: self.t_max,
            comment: self.comment.clone(),
        }
    }
}
