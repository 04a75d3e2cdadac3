use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "matatag.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    // Opaque string values owned by the front end (preset library and similar).
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

pub fn preference_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?",
            [key],
            |r| r.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn preference_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO preferences(key, value, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_roundtrip_and_overwrite() {
        let conn = open_in_memory().expect("db");
        assert_eq!(settings_get_json(&conn, "setup.generation").expect("get"), None);
        settings_set_json(&conn, "setup.generation", &json!({ "model": "a" })).expect("set");
        settings_set_json(&conn, "setup.generation", &json!({ "model": "b" })).expect("set");
        assert_eq!(
            settings_get_json(&conn, "setup.generation").expect("get"),
            Some(json!({ "model": "b" }))
        );
    }

    #[test]
    fn preferences_are_plain_strings() {
        let conn = open_in_memory().expect("db");
        preference_set(&conn, "k", "not json at all").expect("set");
        assert_eq!(
            preference_get(&conn, "k").expect("get").as_deref(),
            Some("not json at all")
        );
    }
}
