use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::{FoodItem, Goals, LedgerState, LoggedFoodEntry, MacroHistoryEntry, Macros};
use crate::store::Store;

const KEY_TOTALS: &str = "ledger.totals";
const KEY_FOOD_LOG: &str = "ledger.food_log";
const KEY_GOALS: &str = "ledger.goals";
const KEY_ROLLOVER_DATE: &str = "ledger.last_rollover_date";
const KEY_HISTORY: &str = "history";
const KEY_CATALOG: &str = "catalog";

const LEDGER_KEYS: [&str; 4] = [KEY_TOTALS, KEY_FOOD_LOG, KEY_GOALS, KEY_ROLLOVER_DATE];

/// SQLite-backed key/value document store.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS documents (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn get_document(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM documents WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn has_document(&self, key: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Write a document verbatim, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, value: &str) {
        self.conn
            .execute(
                "INSERT INTO documents (key, value, updated_at) VALUES (?1, ?2, '')
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .unwrap();
    }
}

fn put_document<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json =
        serde_json::to_string(value).with_context(|| format!("Failed to encode document {key}"))?;
    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO documents (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, json, now],
    )
    .with_context(|| format!("Failed to write document {key}"))?;
    Ok(())
}

/// Decode a single-value document, falling back to `fallback` when it is unreadable.
fn decode_or<T: DeserializeOwned>(key: &str, raw: Option<&str>, fallback: T) -> T {
    let Some(raw) = raw else {
        return fallback;
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "document failed to decode, using default");
            fallback
        }
    }
}

/// Decode an array document element by element, dropping elements that fail.
/// `None` when the document is not an array at all.
fn decode_list<T: DeserializeOwned>(key: &str, raw: &str) -> Option<Vec<T>> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "document is not a list, treating as absent");
            return None;
        }
    };
    let mut out = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => out.push(item),
            Err(e) => warn!(key, index, error = %e, "skipping record that failed to decode"),
        }
    }
    Some(out)
}

impl Store for Database {
    fn load_ledger_state(&self, today: NaiveDate) -> Result<Option<LedgerState>> {
        let mut any = false;
        for key in LEDGER_KEYS {
            any |= self.has_document(key)?;
        }
        if !any {
            return Ok(None);
        }

        let totals = self.get_document(KEY_TOTALS)?;
        let food_log = self.get_document(KEY_FOOD_LOG)?;
        let goals = self.get_document(KEY_GOALS)?;
        let date = self.get_document(KEY_ROLLOVER_DATE)?;

        let food_log: Vec<LoggedFoodEntry> = food_log
            .as_deref()
            .and_then(|raw| decode_list(KEY_FOOD_LOG, raw))
            .unwrap_or_default();

        Ok(Some(LedgerState {
            totals: decode_or(KEY_TOTALS, totals.as_deref(), Macros::default()),
            goals: decode_or(KEY_GOALS, goals.as_deref(), Goals::default()),
            food_log,
            last_rollover_date: decode_or(KEY_ROLLOVER_DATE, date.as_deref(), today),
        }))
    }

    fn save_ledger_state(&self, state: &LedgerState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        put_document(&tx, KEY_TOTALS, &state.totals)?;
        put_document(&tx, KEY_FOOD_LOG, &state.food_log)?;
        put_document(&tx, KEY_GOALS, &state.goals)?;
        put_document(&tx, KEY_ROLLOVER_DATE, &state.last_rollover_date)?;
        tx.commit()?;
        Ok(())
    }

    fn save_goals(&self, goals: &Goals) -> Result<()> {
        put_document(&self.conn, KEY_GOALS, goals)
    }

    fn load_history(&self) -> Result<Vec<MacroHistoryEntry>> {
        Ok(self
            .get_document(KEY_HISTORY)?
            .and_then(|raw| decode_list(KEY_HISTORY, &raw))
            .unwrap_or_default())
    }

    fn save_history(&self, entries: &[MacroHistoryEntry]) -> Result<()> {
        put_document(&self.conn, KEY_HISTORY, entries)
    }

    fn load_catalog(&self) -> Result<Option<Vec<FoodItem>>> {
        Ok(self
            .get_document(KEY_CATALOG)?
            .and_then(|raw| decode_list(KEY_CATALOG, &raw)))
    }

    fn save_catalog(&self, items: &[FoodItem]) -> Result<()> {
        put_document(&self.conn, KEY_CATALOG, items)
    }
}
