//! Bot handlers driven through the real dispatcher schema
//!
//! Run with: cargo test --test handlers_test

mod common;

use std::sync::Arc;

use serial_test::serial;
use teloxide_tests::{MockBot, MockMessageText};

use cashmachine::storage::{create_pool, db, get_connection, DbPool};
use cashmachine::telegram::{schema, CommandContext, HandlerDeps};
use common::RecordingNotifier;

struct Harness {
    _dir: tempfile::TempDir,
    pool: Arc<DbPool>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handlers.db");
        let pool = Arc::new(create_pool(path.to_str().unwrap()).unwrap());
        Self {
            _dir: dir,
            pool,
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn deps(&self, admin_id: i64) -> HandlerDeps {
        let context = CommandContext {
            admin_id,
            public_url: "https://cash.example.com".to_string(),
        };
        HandlerDeps::new(Arc::clone(&self.pool), context, self.notifier.clone())
    }

    /// Sends `text` from the mock user and returns the bot's replies
    async fn dispatch(&self, text: &str, admin_id: i64) -> Vec<String> {
        let mut bot = MockBot::new(MockMessageText::new().text(text), schema(self.deps(admin_id)));
        bot.dispatch().await;
        bot.get_responses()
            .sent_messages
            .iter()
            .filter_map(|m| m.text().map(str::to_string))
            .collect()
    }
}

/// Telegram id the mock messages are sent from
fn mock_user_id() -> i64 {
    let msg = MockMessageText::new().text("/start").build();
    msg.from.as_ref().map(|u| u.id.0 as i64).unwrap()
}

#[tokio::test]
#[serial]
async fn test_balance_reply_for_admin() {
    let harness = Harness::new();
    let admin = mock_user_id();

    let replies = harness.dispatch("/balance", admin).await;

    assert_eq!(replies, vec!["Your balance: $0.00\nMode: aviation".to_string()]);
    assert!(harness.notifier.messages().is_empty());
}

#[tokio::test]
#[serial]
async fn test_non_admin_is_denied() {
    let harness = Harness::new();
    let admin = mock_user_id() + 1;

    let replies = harness.dispatch("/hackcash", admin).await;

    assert_eq!(replies, vec!["Access denied!".to_string()]);
    assert!(harness.notifier.messages().is_empty());
    let conn = get_connection(&harness.pool).unwrap();
    assert_eq!(db::get_balance(&conn, mock_user_id()).unwrap(), 0.0);
}

#[tokio::test]
#[serial]
async fn test_bonus_direct_message_goes_through_notifier() {
    let harness = Harness::new();
    let admin = mock_user_id();

    let replies = harness.dispatch("/hackcash", admin).await;

    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("💸 Hacked the System! Added $"), "{}", replies[0]);

    let dms = harness.notifier.messages();
    assert_eq!(dms.len(), 1);
    assert!(dms[0].starts_with("💰 Hack Profit: $"), "{}", dms[0]);

    let conn = get_connection(&harness.pool).unwrap();
    let balance = db::get_balance(&conn, admin).unwrap();
    assert!((20.0..100.0).contains(&balance), "{}", balance);
}

#[tokio::test]
#[serial]
async fn test_storage_failure_gets_generic_reply() {
    let harness = Harness::new();
    let admin = mock_user_id();
    {
        let conn = get_connection(&harness.pool).unwrap();
        conn.execute_batch("DROP TABLE player").unwrap();
    }

    let replies = harness.dispatch("/balance", admin).await;

    assert_eq!(replies, vec!["Something went wrong, please try again.".to_string()]);
    assert!(harness.notifier.messages().is_empty());
}
