use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Runner passes before giving up. Extra passes only happen when another
/// process is migrating the same file at the same time.
const MIGRATION_ATTEMPTS: u32 = 5;

/// Applies the embedded schema migrations.
///
/// Runs are serialized per-process by a mutex. Across processes, two runners
/// can both see an empty history and race on the same version; the loser's
/// migration transaction rolls back, and the next pass reads the winner's
/// history row and applies only what is still missing.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    // Migrations are idempotent, so a poisoned lock is safe to reuse
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(Duration::from_secs(30))
        .context("set SQLite busy timeout")?;

    let mut attempt = 1;
    loop {
        match embedded::migrations::runner().run(conn) {
            Ok(report) => {
                for migration in report.applied_migrations() {
                    log::info!("Applied migration {}", migration);
                }
                return Ok(());
            }
            Err(err) if attempt < MIGRATION_ATTEMPTS => {
                log::warn!(
                    "Migration pass {}/{} failed, retrying: {}",
                    attempt,
                    MIGRATION_ATTEMPTS,
                    err
                );
                std::thread::sleep(Duration::from_millis(50 * u64::from(attempt)));
                attempt += 1;
            }
            Err(err) => return Err(err).context("apply migrations"),
        }
    }
}
