//! Payout engine: one weighted coin-flip per bet.
//!
//! Aviation is a crash game. The round either reaches the player's cash-out
//! multiplier (win) or crashes below it (lose). Tap always pays a fixed share
//! of the stake. All randomness goes through [`OutcomeRng`].

use super::rig::RigOverride;
use super::{Mode, Outcome};
use crate::core::config::GameConfig;
use crate::core::error::{AppError, AppResult};

/// Source of uniform samples in `[0, 1)`.
pub trait OutcomeRng {
    fn unit(&mut self) -> f64;

    /// Uniform sample between `low` and `high`. The bounds may be given in
    /// either order.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.unit()
    }
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRng;

impl OutcomeRng for ThreadRng {
    fn unit(&mut self) -> f64 {
        rand::random::<f64>()
    }
}

/// A bet as submitted by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wager {
    pub amount: f64,
    pub multiplier: f64,
    pub mode: Mode,
}

impl Wager {
    pub fn new(amount: f64, multiplier: f64, mode: Mode) -> Self {
        Self {
            amount,
            multiplier,
            mode,
        }
    }

    /// Rejects stakes and multipliers that would produce nonsense payouts.
    pub fn validate(&self) -> AppResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AppError::Validation("Bet amount must be a positive number".to_string()));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(AppError::Validation("Multiplier must be at least 1.0".to_string()));
        }
        Ok(())
    }
}

/// Everything the ledger needs to record a settled bet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub outcome: Outcome,
    pub crash_point: f64,
    pub player_profit: f64,
    pub house_profit: f64,
}

impl Settlement {
    /// Amount applied to the player's balance.
    pub fn balance_delta(&self) -> f64 {
        self.player_profit + self.house_profit
    }
}

/// Settles a wager against the configured rates.
///
/// A rig override for the wager's mode replaces the win rate (aviation) or
/// the payout rate (tap) for this round only.
pub fn settle(wager: &Wager, config: &GameConfig, rig: Option<RigOverride>, rng: &mut impl OutcomeRng) -> Settlement {
    match wager.mode {
        Mode::Aviation => settle_aviation(wager, config, rig, rng),
        Mode::Tap => settle_tap(wager, config, rig),
    }
}

fn settle_aviation(wager: &Wager, config: &GameConfig, rig: Option<RigOverride>, rng: &mut impl OutcomeRng) -> Settlement {
    let win_rate = match rig {
        Some(RigOverride::WinRate(rate)) => rate,
        _ => config.win_rate,
    };

    let outcome = if rng.unit() < win_rate {
        Outcome::Win
    } else {
        Outcome::Lose
    };

    match outcome {
        Outcome::Win => {
            let crash_point = wager.multiplier + rng.uniform(0.1, 1.0);
            let player_profit = wager.amount * (wager.multiplier - 1.0) * (1.0 - config.house_edge);
            Settlement {
                outcome,
                crash_point,
                player_profit,
                house_profit: -player_profit * config.house_edge,
            }
        }
        Outcome::Lose => {
            // Crash strictly below the cash-out point; never below 1.0x.
            let upper = (wager.multiplier - 0.1).max(1.0);
            Settlement {
                outcome,
                crash_point: rng.uniform(1.0, upper),
                player_profit: -wager.amount,
                house_profit: wager.amount * config.house_edge,
            }
        }
    }
}

fn settle_tap(wager: &Wager, config: &GameConfig, rig: Option<RigOverride>) -> Settlement {
    let payout_rate = match rig {
        Some(RigOverride::PayoutRate(rate)) => rate,
        _ => config.tap_payout_rate,
    };

    Settlement {
        outcome: Outcome::Win,
        crash_point: wager.multiplier,
        player_profit: wager.amount * payout_rate,
        house_profit: wager.amount * (1.0 - payout_rate),
    }
}

/// Operator bonus commands that credit a random amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bonus {
    HackCash,
    Fling,
}

impl Bonus {
    /// Label stored in the `profits.mode` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Bonus::HackCash => "hackcash",
            Bonus::Fling => "fling",
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Bonus::HackCash => (20.0, 100.0),
            Bonus::Fling => (50.0, 150.0),
        }
    }
}

/// Draws the credit for a bonus command.
pub fn bonus_amount(bonus: Bonus, rng: &mut impl OutcomeRng) -> f64 {
    let (low, high) = bonus.range();
    rng.uniform(low, high)
}
