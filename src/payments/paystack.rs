//! Paystack client for `POST /transaction/initialize`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{to_minor_units, PaymentGateway, PaymentInit};
use crate::core::config;
use crate::core::error::{AppError, AppResult};

#[derive(Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    amount: i64,
}

#[derive(Deserialize)]
struct InitializeResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<InitializeData>,
}

#[derive(Deserialize)]
struct InitializeData {
    authorization_url: Option<String>,
    reference: Option<String>,
}

pub struct PaystackClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
}

impl PaystackClient {
    pub fn new(base_url: impl Into<String>, secret_key: SecretString) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// Client configured from `PAYSTACK_BASE_URL` and `PAYSTACK_SECRET_KEY`.
    pub fn from_env() -> AppResult<Self> {
        if config::paystack::SECRET_KEY.is_empty() {
            log::warn!("PAYSTACK_SECRET_KEY is not set, deposits will be rejected by Paystack");
        }
        Self::new(
            config::paystack::BASE_URL.as_str(),
            SecretString::from(config::paystack::SECRET_KEY.clone()),
        )
    }

    fn initialize_url(&self) -> String {
        format!("{}/transaction/initialize", self.base_url)
    }
}

impl std::fmt::Debug for PaystackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, email: &str, amount: f64) -> AppResult<PaymentInit> {
        let body = InitializeRequest {
            email,
            amount: to_minor_units(amount),
        };

        let response = self
            .http
            .post(self.initialize_url())
            .bearer_auth(self.secret_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Paystack initialize returned status {}", status);
            return Err(AppError::HttpStatus(status));
        }

        let parsed: InitializeResponse = response.json().await?;
        if !parsed.status {
            let message = parsed.message.unwrap_or_else(|| "initialization rejected".to_string());
            return Err(AppError::Payment(message));
        }

        let data = parsed
            .data
            .ok_or_else(|| AppError::Payment("response has no data".to_string()))?;
        let authorization_url = data
            .authorization_url
            .ok_or_else(|| AppError::Payment("response has no authorization_url".to_string()))?;

        log::info!("Paystack checkout opened for {} ({} minor units)", email, body.amount);

        Ok(PaymentInit {
            authorization_url,
            reference: data.reference,
        })
    }
}
