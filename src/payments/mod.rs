//! Payment provider integration
//!
//! Only transaction initialization is supported: the provider returns a
//! checkout URL and settlement happens outside this service.

pub mod paystack;

use async_trait::async_trait;

use crate::core::error::AppResult;

pub use paystack::PaystackClient;

/// Checkout session returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInit {
    pub authorization_url: String,
    pub reference: Option<String>,
}

/// A provider able to open a checkout for an amount in dollars.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, email: &str, amount: f64) -> AppResult<PaymentInit>;
}

/// Placeholder address the provider requires for the single player.
pub fn player_email(user_id: i64) -> String {
    format!("player_{}@example.com", user_id)
}

/// Converts dollars to the provider's minor units (kobo/cents), truncating.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0) as i64
}
