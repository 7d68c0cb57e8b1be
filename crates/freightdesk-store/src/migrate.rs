use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension};

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_init.sql",
    include_str!("../migrations/001_init.sql"),
)];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_schema_table(&tx)?;
    let current = schema_version(&tx)?;
    let latest = MIGRATIONS.len() as i64;

    if current > latest {
        return Err(StoreError::Migration(format!(
            "db version {current} newer than available migrations {latest}"
        )));
    }

    for (version, (name, sql)) in (1_i64..).zip(MIGRATIONS.iter()) {
        if current >= version {
            continue;
        }
        tracing::debug!(migration = name, version, "applying migration");
        tx.execute_batch(sql)?;
        set_version(&tx, version)?;
    }

    tx.commit()?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT version FROM freightdesk_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version.unwrap_or(0))
}

fn ensure_schema_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS freightdesk_schema (version INTEGER NOT NULL);",
    )?;
    let rows: i64 =
        conn.query_row("SELECT COUNT(*) FROM freightdesk_schema;", [], |row| row.get(0))?;
    if rows == 0 {
        conn.execute("INSERT INTO freightdesk_schema (version) VALUES (0);", [])?;
    }
    Ok(())
}

fn set_version(conn: &Connection, version: i64) -> Result<()> {
    let updated = conn.execute("UPDATE freightdesk_schema SET version = ?1;", [version])?;
    if updated != 1 {
        return Err(StoreError::Migration(format!(
            "expected single schema row, updated {updated}"
        )));
    }
    Ok(())
}
