//! Schema setup when several processes open a fresh database at once
//!
//! Run with: cargo test --test migrations_test

use std::path::Path;
use std::process::{Child, Command, Stdio};

use rusqlite::Connection;
use tempfile::TempDir;

const PROCESSES: usize = 4;
const ROUNDS: usize = 10;

fn spawn_init_db(dir: &Path, database: &Path, index: usize) -> Child {
    Command::new(env!("CARGO_BIN_EXE_cashmachine"))
        .args(["init-db", "--database"])
        .arg(database)
        .current_dir(dir)
        .env("LOG_FILE_PATH", dir.join(format!("init-{}.log", index)))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cashmachine")
}

#[test]
fn test_concurrent_init_db_processes_all_succeed() {
    for round in 0..ROUNDS {
        let dir = TempDir::new().unwrap();
        let database = dir.path().join("race.db");

        let children: Vec<Child> = (0..PROCESSES)
            .map(|i| spawn_init_db(dir.path(), &database, i))
            .collect();

        for child in children {
            let output = child.wait_with_output().unwrap();
            assert!(
                output.status.success(),
                "init-db failed in round {}: {}",
                round,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let conn = Connection::open(&database).unwrap();
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 2, "round {}", round);
    }
}

#[test]
fn test_init_db_on_migrated_file_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("twice.db");

    for i in 0..2 {
        let output = spawn_init_db(dir.path(), &database, i).wait_with_output().unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }

    let conn = Connection::open(&database).unwrap();
    let applied: i64 = conn
        .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| row.get(0))
        .unwrap();
    assert_eq!(applied, 2);
}
