//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use cashmachine::api::ApiState;
use cashmachine::core::config::GameConfig;
use cashmachine::core::error::{AppError, AppResult};
use cashmachine::core::retry::RetryConfig;
use cashmachine::payments::{PaymentGateway, PaymentInit};
use cashmachine::storage::{create_pool, DbPool};
use cashmachine::telegram::Notifier;

/// Notifier that keeps every message in memory
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> bool {
        self.messages.lock().unwrap().push(text.to_string());
        true
    }
}

/// Gateway that fails a fixed number of times before succeeding
pub struct ScriptedGateway {
    failures: u32,
    calls: AtomicU32,
}

impl ScriptedGateway {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, email: &str, _amount: f64) -> AppResult<PaymentInit> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(AppError::Payment(format!("gateway unavailable (call {})", call + 1)));
        }
        Ok(PaymentInit {
            authorization_url: format!("https://checkout.example.com/{}", email),
            reference: Some(format!("ref-{}", call)),
        })
    }
}

/// Everything an API test needs. The temp dir lives as long as the env.
pub struct TestEnvironment {
    _dir: TempDir,
    pub pool: Arc<DbPool>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<ScriptedGateway>,
}

impl TestEnvironment {
    pub fn new(gateway_failures: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cashmachine.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();

        Self {
            _dir: dir,
            pool: Arc::new(pool),
            notifier: Arc::new(RecordingNotifier::default()),
            gateway: Arc::new(ScriptedGateway::failing(gateway_failures)),
        }
    }

    /// API state with default rates and no delay between payment retries
    pub fn state(&self) -> ApiState {
        ApiState::new(
            Arc::clone(&self.pool),
            GameConfig::default(),
            self.notifier.clone(),
            self.gateway.clone(),
        )
        .with_payment_retry(RetryConfig::fixed_attempts(3, Duration::ZERO))
    }
}
