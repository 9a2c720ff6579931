//! Per-axis motion state.
//!
//! Three independent registers, each holding the current value and the
//! value as of the last consumed delta. Every stored value goes through
//! [`round6`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::round6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Axis> {
        Self::ALL.get(index).copied()
    }

    pub fn from_name(name: &str) -> Option<Axis> {
        match name {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// One axis: current value and the baseline the next delta is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisRegister {
    pub current: f64,
    pub previous: f64,
}

impl AxisRegister {
    /// `current - previous`, rounded.
    pub fn delta(&self) -> f64 {
        round6(self.current - self.previous)
    }
}

/// All three axes, zeroed at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    axes: [AxisRegister; 3],
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new value; the old current value becomes the baseline.
    /// Returns the stored (rounded) value.
    pub fn set(&mut self, axis: Axis, value: f64) -> f64 {
        let reg = &mut self.axes[axis.index()];
        reg.previous = reg.current;
        reg.current = round6(value);
        reg.current
    }

    /// Return the pending delta and consume it, so an immediate second
    /// call returns `0.0`.
    pub fn take_delta(&mut self, axis: Axis) -> f64 {
        let reg = &mut self.axes[axis.index()];
        let delta = reg.delta();
        reg.previous = reg.current;
        delta
    }

    /// The pending delta, without consuming it.
    pub fn pending_delta(&self, axis: Axis) -> f64 {
        self.axes[axis.index()].delta()
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.axes[axis.index()].current
    }

    pub fn register(&self, axis: Axis) -> AxisRegister {
        self.axes[axis.index()]
    }

    /// Euclidean norm of the three pending deltas, rounded.
    pub fn rate_magnitude(&self) -> f64 {
        let sum: f64 = Axis::ALL
            .iter()
            .map(|&axis| self.pending_delta(axis).powi(2))
            .sum();
        round6(sum.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let m = MotionState::new();
        for axis in Axis::ALL {
            assert_eq!(m.get(axis), 0.0);
            assert_eq!(m.pending_delta(axis), 0.0);
        }
        assert_eq!(m.rate_magnitude(), 0.0);
    }

    #[test]
    fn test_set_then_delta_consumes() {
        let mut m = MotionState::new();
        m.set(Axis::X, 1.234567);
        assert_eq!(m.take_delta(Axis::X), 1.234567);
        assert_eq!(m.take_delta(Axis::X), 0.0);
        m.set(Axis::X, 1.0);
        assert_eq!(m.take_delta(Axis::X), -0.234567);
    }

    #[test]
    fn test_set_rounds() {
        let mut m = MotionState::new();
        assert_eq!(m.set(Axis::Y, 0.12345678), 0.123457);
        assert_eq!(m.register(Axis::Y).previous, 0.0);
    }

    #[test]
    fn test_rate_magnitude_three_four_five() {
        let mut m = MotionState::new();
        m.set(Axis::X, 3.0);
        m.set(Axis::Y, 4.0);
        assert_eq!(m.rate_magnitude(), 5.0);
        // Reading the rate does not consume deltas.
        assert_eq!(m.rate_magnitude(), 5.0);
    }

    #[test]
    fn test_axis_names_and_indices() {
        assert_eq!(Axis::from_name("z"), Some(Axis::Z));
        assert_eq!(Axis::from_name("w"), None);
        assert_eq!(Axis::from_index(1), Some(Axis::Y));
        assert_eq!(Axis::from_index(3), None);
        assert_eq!(Axis::Y.to_string(), "y");
    }
}
