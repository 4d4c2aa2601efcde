//! Rig flags: operator overrides applied to the next bet of one mode.

use super::Mode;

/// Override forced onto the next round of a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigOverride {
    /// Replaces the aviation win probability
    WinRate(f64),
    /// Replaces the tap payout fraction
    PayoutRate(f64),
}

impl RigOverride {
    /// `/riggame win|lose`
    pub fn from_game_action(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "win" => Some(RigOverride::WinRate(1.0)),
            "lose" => Some(RigOverride::WinRate(0.0)),
            _ => None,
        }
    }

    /// `/rigtap boost`
    pub fn from_tap_action(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "boost" => Some(RigOverride::PayoutRate(1.0)),
            _ => None,
        }
    }

    /// Mode whose next bet consumes this override
    pub fn mode(&self) -> Mode {
        match self {
            RigOverride::WinRate(_) => Mode::Aviation,
            RigOverride::PayoutRate(_) => Mode::Tap,
        }
    }

    /// Stored value
    pub fn value(&self) -> f64 {
        match self {
            RigOverride::WinRate(v) | RigOverride::PayoutRate(v) => *v,
        }
    }

    /// Rebuilds an override from its persisted (mode, value) pair.
    pub fn for_mode(mode: Mode, value: f64) -> Self {
        let value = value.clamp(0.0, 1.0);
        match mode {
            Mode::Aviation => RigOverride::WinRate(value),
            Mode::Tap => RigOverride::PayoutRate(value),
        }
    }
}
