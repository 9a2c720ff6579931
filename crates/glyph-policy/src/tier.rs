//! The escalation tier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An escalation tier, always in `[Tier::MIN, Tier::MAX]`.
///
/// Every constructor clamps, so an out-of-range tier cannot exist. The
/// serialized form is the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(7);

    /// Clamp `level` into `[1, 7]`.
    pub const fn new(level: u8) -> Self {
        if level < Self::MIN.0 {
            Self::MIN
        } else if level > Self::MAX.0 {
            Self::MAX
        } else {
            Tier(level)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// One step up, saturating at [`Tier::MAX`].
    pub const fn up(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One step down, saturating at [`Tier::MIN`].
    pub const fn down(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u8> for Tier {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
