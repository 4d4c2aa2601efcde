//! Operator notifications
//!
//! Every balance change is reported to the admin chat. Delivery is
//! best-effort: failures are logged and counted, never returned to the caller.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::core::config;
use crate::core::metrics;
use crate::core::retry::{retry, AlwaysRetryable, RetryConfig};
use crate::game::{Bonus, Wager};
use crate::storage::BetReceipt;

/// Destination for operator messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text`; returns whether it was delivered.
    async fn notify(&self, text: &str) -> bool;
}

/// Sends notifications through the Bot API to a fixed chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
    retry: RetryConfig,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            retry: RetryConfig::outbound(),
        }
    }

    /// Notifier addressed to `ADMIN_USER_ID`.
    pub fn for_admin(bot: Bot) -> Self {
        Self::new(bot, ChatId(*config::admin::ADMIN_USER_ID))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> bool {
        let outcome = retry(&self.retry, "notification", || {
            let bot = self.bot.clone();
            let chat_id = self.chat_id;
            let text = text.to_string();
            async move { bot.send_message(chat_id, text).await.map_err(AlwaysRetryable) }
        })
        .await;

        if outcome.is_ok() {
            log::info!("Telegram notification sent: {}", text.replace('\n', " | "));
            true
        } else {
            metrics::NOTIFICATION_FAILURES_TOTAL.inc();
            log::error!(
                "Failed to send Telegram notification after {} attempts",
                outcome.attempts
            );
            false
        }
    }
}

/// Notifier that only writes to the log. Used when no bot token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) -> bool {
        log::info!("Notification (not delivered): {}", text.replace('\n', " | "));
        false
    }
}

/// Report for a settled bet
pub fn bet_message(wager: &Wager, receipt: &BetReceipt) -> String {
    let settlement = &receipt.settlement;
    format!(
        "🎮 {} Action\n\
         Amount: ${:.2} @ {:?}x\n\
         Outcome: {}\n\
         Player Profit: ${:.2}\n\
         House Profit: ${:.2}\n\
         Balance: ${:.2}\n\
         Total System Profit: ${:.2}",
        wager.mode.display_name(),
        wager.amount,
        wager.multiplier,
        settlement.outcome,
        settlement.player_profit,
        settlement.house_profit,
        receipt.balance,
        receipt.total_profit
    )
}

pub fn deposit_message(amount: f64, balance: f64, paystack_url: &str) -> String {
    format!(
        "💸 Deposit\nAmount: ${:.2}\nNew Balance: ${:.2}\nPaystack URL: {}",
        amount, balance, paystack_url
    )
}

pub fn withdrawal_message(amount: f64, balance: f64) -> String {
    format!(
        "💳 Withdrawal\nAmount: ${:.2}\nNew Balance: ${:.2}\nNote: Complete withdrawal via Paystack dashboard.",
        amount, balance
    )
}

/// Direct message sent after a bonus command
pub fn bonus_message(bonus: Bonus, amount: f64) -> String {
    let label = match bonus {
        Bonus::HackCash => "Hack",
        Bonus::Fling => "Fling",
    };
    format!("💰 {} Profit: ${:.2}", label, amount)
}
