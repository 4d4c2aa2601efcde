use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::core::error::{AppError, AppResult};
use crate::game::{Mode, RigOverride};
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// The single `player` row tracked by the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Telegram ID of the player
    pub user_id: i64,
    /// Simulated balance in dollars
    pub balance: f64,
    /// Currently selected minigame
    pub mode: Mode,
    /// ISO-8601 creation time
    pub created_at: String,
}

/// A row of the `bets` table
#[derive(Debug, Clone, PartialEq)]
pub struct BetRecord {
    pub id: i64,
    pub user_id: i64,
    pub bet_amount: f64,
    pub multiplier: f64,
    pub outcome: String,
    /// Player profit (negative on a loss)
    pub profit: f64,
    pub mode: Mode,
    pub created_at: String,
}

/// Current time in the format stored in `created_at` columns
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Create a new database connection pool
///
/// Opens (or creates) the SQLite file, enables WAL so the bot and the API can
/// share it, and applies schema migrations on the first connection.
///
/// # Example
///
/// ```no_run
/// use cashmachine::storage::db;
///
/// let pool = db::create_pool("solo_cashmachine.db")?;
/// # Ok::<(), cashmachine::core::error::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|c| c.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;"));
    let pool = Pool::builder().max_size(8).build(manager)?;
    migrate(&pool)?;
    Ok(pool)
}

/// Single-connection pool over a private in-memory database.
///
/// Every connection to `:memory:` is a separate database, so the pool is
/// capped at one connection.
pub fn create_in_memory_pool() -> AppResult<DbPool> {
    let pool = Pool::builder()
        .max_size(1)
        .build(SqliteConnectionManager::memory())?;
    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DbPool) -> AppResult<()> {
    let mut conn = pool.get()?;
    run_migrations(&mut conn).map_err(|e| AppError::Migration(format!("{:#}", e)))
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

fn player_from_row(row: &rusqlite::Row<'_>) -> Result<Player> {
    Ok(Player {
        user_id: row.get(0)?,
        balance: row.get(1)?,
        mode: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Creates the player row with a zero balance unless it already exists.
///
/// Returns `true` when a row was inserted.
pub fn ensure_player(conn: &Connection, user_id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO player (user_id, balance, mode, created_at) VALUES (?1, 0, ?2, ?3)",
        params![user_id, Mode::default(), now_timestamp()],
    )?;
    Ok(inserted > 0)
}

pub fn get_player(conn: &Connection, user_id: i64) -> Result<Option<Player>> {
    conn.query_row(
        "SELECT user_id, balance, mode, created_at FROM player WHERE user_id = ?1",
        [user_id],
        player_from_row,
    )
    .optional()
}

/// Balance of the player, or 0 when the row does not exist yet.
pub fn get_balance(conn: &Connection, user_id: i64) -> Result<f64> {
    let balance: Option<f64> = conn
        .query_row("SELECT balance FROM player WHERE user_id = ?1", [user_id], |row| row.get(0))
        .optional()?;
    Ok(balance.unwrap_or(0.0))
}

/// Switches the player's mode, creating the row if needed.
pub fn set_mode(conn: &Connection, user_id: i64, mode: Mode) -> Result<()> {
    ensure_player(conn, user_id)?;
    conn.execute("UPDATE player SET mode = ?1 WHERE user_id = ?2", params![mode, user_id])?;
    Ok(())
}

/// Adds `delta` to the balance and returns the new balance.
///
/// A missing row starts from zero with `mode_if_new`; an existing row keeps
/// its mode and creation time. Callers that need the read and the write to
/// be atomic run this inside a transaction.
pub fn apply_balance_delta(conn: &Connection, user_id: i64, delta: f64, mode_if_new: Mode) -> Result<f64> {
    let new_balance = get_balance(conn, user_id)? + delta;
    conn.execute(
        "INSERT INTO player (user_id, balance, mode, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET balance = excluded.balance",
        params![user_id, new_balance, mode_if_new, now_timestamp()],
    )?;
    Ok(new_balance)
}

/// Appends a house profit entry and returns the new all-time total.
pub fn record_profit(conn: &Connection, profit: f64, label: &str) -> Result<f64> {
    conn.execute(
        "INSERT INTO profits (profit, mode, created_at) VALUES (?1, ?2, ?3)",
        params![profit, label, now_timestamp()],
    )?;
    total_profit(conn)
}

/// Sum of all profit entries (0 when the table is empty).
pub fn total_profit(conn: &Connection) -> Result<f64> {
    let total: Option<f64> = conn.query_row("SELECT SUM(profit) FROM profits", [], |row| row.get(0))?;
    Ok(total.unwrap_or(0.0))
}

/// Inserts a settled bet and returns its id.
pub fn record_bet(
    conn: &Connection,
    user_id: i64,
    bet_amount: f64,
    multiplier: f64,
    outcome: &str,
    profit: f64,
    mode: Mode,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO bets (user_id, bet_amount, multiplier, outcome, profit, mode, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![user_id, bet_amount, multiplier, outcome, profit, mode, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent bets first.
pub fn recent_bets(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<BetRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, bet_amount, multiplier, outcome, profit, mode, created_at
         FROM bets WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit as i64], |row| {
        Ok(BetRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            bet_amount: row.get(2)?,
            multiplier: row.get(3)?,
            outcome: row.get(4)?,
            profit: row.get(5)?,
            mode: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;
    rows.collect()
}

/// Stores an override for the next bet of its mode, replacing any pending one.
pub fn set_rig_flag(conn: &Connection, rig: RigOverride) -> Result<()> {
    conn.execute(
        "INSERT INTO rig_flags (mode, value, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(mode) DO UPDATE SET value = excluded.value, created_at = excluded.created_at",
        params![rig.mode(), rig.value(), now_timestamp()],
    )?;
    Ok(())
}

/// Pending override for `mode` without consuming it.
pub fn peek_rig_flag(conn: &Connection, mode: Mode) -> Result<Option<RigOverride>> {
    let value: Option<f64> = conn
        .query_row("SELECT value FROM rig_flags WHERE mode = ?1", [mode], |row| row.get(0))
        .optional()?;
    Ok(value.map(|v| RigOverride::for_mode(mode, v)))
}

/// Removes and returns the pending override for `mode`.
pub fn take_rig_flag(conn: &Connection, mode: Mode) -> Result<Option<RigOverride>> {
    let rig = peek_rig_flag(conn, mode)?;
    if rig.is_some() {
        conn.execute("DELETE FROM rig_flags WHERE mode = ?1", [mode])?;
    }
    Ok(rig)
}
