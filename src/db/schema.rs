//! Versioned schema migrations.
//!
//! A migration's SQL and the `schema_migrations` row recording it are
//! committed in one transaction, so a failed migration is retried on the next
//! start instead of being marked as applied.

use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};

/// `(version, name, sql)`, applied in order.
const MIGRATIONS: &[(&str, &str, &str)] = &[(
    "001",
    "initial",
    include_str!("migrations/001_initial.sql"),
)];

/// Apply every pending migration and return how many ran.
pub fn run_migrations(conn: &mut Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = applied_versions(conn)?;
    let mut count = 0;

    for &(version, name, sql) in MIGRATIONS {
        if applied.contains(version) {
            continue;
        }

        let tx = conn.transaction()?;
        apply(&tx, version, name, sql)
            .with_context(|| format!("Failed to apply migration {version}_{name}"))?;
        tx.commit()?;
        count += 1;
    }

    Ok(count)
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(versions)
}

fn apply(tx: &Transaction, version: &str, name: &str, sql: &str) -> Result<()> {
    tracing::info!("Applying migration {}_{}", version, name);

    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        (version, name, chrono::Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn fresh_database_gets_every_migration() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert_eq!(run_migrations(&mut conn).unwrap(), MIGRATIONS.len());
        assert_eq!(tables(&conn), ["expenses", "members", "schema_migrations"]);
        assert!(applied_versions(&conn).unwrap().contains("001"));
    }

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
        assert_eq!(applied_versions(&conn).unwrap().len(), MIGRATIONS.len());
    }

    #[test]
    fn expenses_reject_non_positive_amounts() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO expenses (id, member_id, description, amount) VALUES ('e', 'm', 'd', 0)",
            [],
        );
        assert!(result.is_err());
    }
}
