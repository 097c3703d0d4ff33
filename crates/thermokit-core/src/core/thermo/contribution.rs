use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Thermal contribution of one degree-of-freedom class (translation, rotation or electronic).
///
/// Energies are in kJ/mol, entropy and heat capacity in J/(mol·K); `ln_q` is the natural log of
/// the molecular partition function.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Component {
    pub energy: f64,
    pub entropy: f64,
    pub heat_capacity: f64,
    pub ln_q: f64,
}

impl Component {
    pub fn new(energy: f64, entropy: f64, heat_capacity: f64, ln_q: f64) -> Self {
        Self {
            energy,
            entropy,
            heat_capacity,
            ln_q,
        }
    }
}

/// Contribution of a single vibrational mode, or the sum over modes.
///
/// `energy` is the thermal part U(T) − U(0) only; the zero-point energy is kept separately.
/// `ln_q_v0` and `ln_q_bot` are the log partition functions referenced to the lowest
/// vibrational level and to the bottom of the well.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeContribution {
    pub zpe: f64,
    pub energy: f64,
    pub entropy: f64,
    pub heat_capacity: f64,
    pub ln_q_v0: f64,
    pub ln_q_bot: f64,
}

impl Add for ModeContribution {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            zpe: self.zpe + rhs.zpe,
            energy: self.energy + rhs.energy,
            entropy: self.entropy + rhs.entropy,
            heat_capacity: self.heat_capacity + rhs.heat_capacity,
            ln_q_v0: self.ln_q_v0 + rhs.ln_q_v0,
            ln_q_bot: self.ln_q_bot + rhs.ln_q_bot,
        }
    }
}

impl AddAssign for ModeContribution {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ModeContribution {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
