use std::sync::Arc;

use crate::core::config::GameConfig;
use crate::core::retry::RetryConfig;
use crate::payments::PaymentGateway;
use crate::storage::DbPool;
use crate::telegram::notifications::Notifier;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<DbPool>,
    pub game: GameConfig,
    pub notifier: Arc<dyn Notifier>,
    pub payments: Arc<dyn PaymentGateway>,
    /// Retry policy for payment initialization
    pub payment_retry: RetryConfig,
}

impl ApiState {
    pub fn new(
        db: Arc<DbPool>,
        game: GameConfig,
        notifier: Arc<dyn Notifier>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            game,
            notifier,
            payments,
            payment_retry: RetryConfig::outbound(),
        }
    }

    #[must_use]
    pub fn with_payment_retry(mut self, retry: RetryConfig) -> Self {
        self.payment_retry = retry;
        self
    }
}
