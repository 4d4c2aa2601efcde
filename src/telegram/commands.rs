//! Command logic, independent of the Bot API
//!
//! `execute` turns a parsed [`Command`] into a [`CommandReply`]. The
//! dispatcher only sends the reply, which keeps every branch testable against
//! a scratch database.

use crate::core::error::AppResult;
use crate::game::{bonus_amount, Bonus, Mode, OutcomeRng, RigOverride};
use crate::storage::{db, ledger, DbPool};
use crate::telegram::admin::is_allowed;
use crate::telegram::bot::Command;
use crate::telegram::notifications::bonus_message;

/// Bets listed by `/history`
pub const HISTORY_LIMIT: usize = 10;

/// What the bot sends back for one command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReply {
    /// Reply in the chat the command came from
    pub text: String,
    /// Extra message to the operator's private chat
    pub direct_message: Option<String>,
}

impl CommandReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direct_message: None,
        }
    }
}

/// Settings the command logic reads
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub admin_id: i64,
    pub public_url: String,
}

/// Runs a command for `user_id`.
///
/// Non-admin users get an access-denied reply and touch nothing. Errors are
/// storage failures only; malformed arguments produce a usage reply.
pub fn execute(
    pool: &DbPool,
    ctx: &CommandContext,
    user_id: i64,
    command: &Command,
    rng: &mut impl OutcomeRng,
) -> AppResult<CommandReply> {
    if !is_allowed(user_id, ctx.admin_id) {
        log::warn!("Rejected /{} from user {}", command.name(), user_id);
        let text = match command {
            Command::Start => "Access denied! This is the operator's private cash machine.",
            _ => "Access denied!",
        };
        return Ok(CommandReply::text(text));
    }

    let mut conn = db::get_connection(pool)?;

    let reply = match command {
        Command::Start => {
            if db::ensure_player(&conn, user_id)? {
                log::info!("Created player row for {}", user_id);
            }
            CommandReply::text(format!(
                "Welcome to your Cash Machine! Use /mode <aviation|tap>, /deposit <amount>, and play at {}",
                ctx.public_url
            ))
        }
        Command::Mode(arg) => match first_arg(arg).map(str::parse::<Mode>) {
            Some(Ok(mode)) => {
                db::set_mode(&conn, user_id, mode)?;
                CommandReply::text(format!("Mode set to {}!", mode))
            }
            _ => CommandReply::text("Usage: /mode aviation|tap"),
        },
        Command::Deposit(arg) => match first_arg(arg).and_then(parse_amount) {
            Some(amount) => CommandReply::text(format!(
                "Visit {}/deposit?user_id={}&amount={:?} to deposit ${:.2}",
                ctx.public_url, user_id, amount, amount
            )),
            None => CommandReply::text("Usage: /deposit <amount>"),
        },
        Command::Balance => {
            let (balance, mode) = match db::get_player(&conn, user_id)? {
                Some(player) => (player.balance, player.mode),
                None => (0.0, Mode::default()),
            };
            CommandReply::text(format!("Your balance: ${:.2}\nMode: {}", balance, mode))
        }
        Command::RigGame(arg) => match first_arg(arg).and_then(RigOverride::from_game_action) {
            Some(rig) => {
                db::set_rig_flag(&conn, rig)?;
                let action = if rig.value() >= 1.0 { "win" } else { "lose" };
                log::info!("Aviation rigged to {} for the next bet", action);
                CommandReply::text(format!("Aviation game rigged to {} next bet!", action))
            }
            None => CommandReply::text("Usage: /riggame win|lose"),
        },
        Command::RigTap(arg) => match first_arg(arg).and_then(RigOverride::from_tap_action) {
            Some(rig) => {
                db::set_rig_flag(&conn, rig)?;
                log::info!("Tap rigged to full payout for the next conversion");
                CommandReply::text("Tap-to-Pay rigged to 100% payout next conversion!")
            }
            None => CommandReply::text("Usage: /rigtap boost"),
        },
        Command::Profits => {
            let total = db::total_profit(&conn)?;
            CommandReply::text(format!("Total System Profits: ${:.2}", total))
        }
        Command::HackCash => {
            let amount = bonus_amount(Bonus::HackCash, rng);
            ledger::credit_bonus(&mut conn, user_id, Bonus::HackCash, amount)?;
            CommandReply {
                text: format!("💸 Hacked the System! Added ${:.2} to your balance!", amount),
                direct_message: Some(bonus_message(Bonus::HackCash, amount)),
            }
        }
        Command::Fling => {
            let amount = bonus_amount(Bonus::Fling, rng);
            ledger::credit_bonus(&mut conn, user_id, Bonus::Fling, amount)?;
            CommandReply {
                text: format!("🚀 Fling Exploit! Added ${:.2} to your balance!", amount),
                direct_message: Some(bonus_message(Bonus::Fling, amount)),
            }
        }
        Command::History => {
            let bets = db::recent_bets(&conn, user_id, HISTORY_LIMIT)?;
            if bets.is_empty() {
                CommandReply::text("No bets yet.")
            } else {
                let lines: Vec<String> = bets
                    .iter()
                    .map(|b| {
                        format!(
                            "{} ${:.2} @ {:?}x: {} ({:+.2})",
                            b.mode, b.bet_amount, b.multiplier, b.outcome, b.profit
                        )
                    })
                    .collect();
                CommandReply::text(format!("Last {} bets:\n{}", bets.len(), lines.join("\n")))
            }
        }
    };

    Ok(reply)
}

fn first_arg(raw: &str) -> Option<&str> {
    raw.split_whitespace().next()
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}
