//! Balance-changing operations.
//!
//! Each function wraps its reads and writes in one `IMMEDIATE` transaction so
//! the bot and the API cannot interleave a read-modify-write on the same row.

use rusqlite::{Connection, TransactionBehavior};

use crate::core::config::GameConfig;
use crate::core::error::{AppError, AppResult};
use crate::game::{settle, Bonus, Mode, OutcomeRng, Settlement, Wager};
use crate::storage::db;

/// Result of a settled bet as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetReceipt {
    pub settlement: Settlement,
    /// Balance after the bet
    pub balance: f64,
    /// All-time house profit after the bet
    pub total_profit: f64,
}

/// Settles a bet and records it.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `user_id` - Player placing the bet
/// * `wager` - Stake, cash-out multiplier and mode
/// * `config` - House edge and rates
/// * `rng` - Outcome source
///
/// # Returns
///
/// The settlement with the new balance and profit total, or
/// `AppError::InsufficientBalance` when the stake exceeds the balance.
/// A pending rig flag for the wager's mode is consumed only when the bet
/// goes through.
pub fn place_bet(
    conn: &mut Connection,
    user_id: i64,
    wager: &Wager,
    config: &GameConfig,
    rng: &mut impl OutcomeRng,
) -> AppResult<BetReceipt> {
    wager.validate()?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let balance = db::get_balance(&tx, user_id)?;
    if balance < wager.amount {
        return Err(AppError::InsufficientBalance {
            balance,
            requested: wager.amount,
        });
    }

    let rig = db::take_rig_flag(&tx, wager.mode)?;
    if let Some(rig) = rig {
        log::info!("Applying rig override {:?} to {} bet of user {}", rig, wager.mode, user_id);
    }

    let settlement = settle(wager, config, rig, rng);
    let balance = db::apply_balance_delta(&tx, user_id, settlement.balance_delta(), wager.mode)?;
    let total_profit = db::record_profit(&tx, settlement.house_profit, wager.mode.as_str())?;
    db::record_bet(
        &tx,
        user_id,
        wager.amount,
        wager.multiplier,
        settlement.outcome.as_str(),
        settlement.player_profit,
        wager.mode,
    )?;

    tx.commit()?;

    Ok(BetReceipt {
        settlement,
        balance,
        total_profit,
    })
}

fn require_positive(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation("Amount must be a positive number".to_string()));
    }
    Ok(())
}

/// Credits a confirmed deposit and returns the new balance.
pub fn credit_deposit(conn: &mut Connection, user_id: i64, amount: f64) -> AppResult<f64> {
    require_positive(amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let balance = db::apply_balance_delta(&tx, user_id, amount, Mode::default())?;
    tx.commit()?;
    Ok(balance)
}

/// Debits `amount` if the balance covers it and returns the new balance.
pub fn withdraw(conn: &mut Connection, user_id: i64, amount: f64) -> AppResult<f64> {
    require_positive(amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let balance = db::get_balance(&tx, user_id)?;
    if balance < amount {
        return Err(AppError::InsufficientBalance {
            balance,
            requested: amount,
        });
    }

    let balance = db::apply_balance_delta(&tx, user_id, -amount, Mode::default())?;
    tx.commit()?;
    Ok(balance)
}

/// Credits an operator bonus and books it as a profit entry.
///
/// Returns the new balance.
pub fn credit_bonus(conn: &mut Connection, user_id: i64, bonus: Bonus, amount: f64) -> AppResult<f64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let balance = db::apply_balance_delta(&tx, user_id, amount, Mode::default())?;
    db::record_profit(&tx, amount, bonus.as_str())?;
    tx.commit()?;
    Ok(balance)
}
