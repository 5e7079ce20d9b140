use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{FoodItem, Goals, LedgerState, MacroHistoryEntry};

/// Durable storage consumed by [`crate::service::MacroService`].
///
/// Loads are lenient: documents that fail to decode come back as defaults
/// rather than errors. An `Err` means the storage itself could not be read.
pub trait Store {
    /// `None` when no ledger document has ever been written.
    /// `today` stands in for a missing or unreadable rollover date.
    fn load_ledger_state(&self, today: NaiveDate) -> Result<Option<LedgerState>>;

    /// Writes totals, food log, goals, and the rollover date together.
    fn save_ledger_state(&self, state: &LedgerState) -> Result<()>;

    fn save_goals(&self, goals: &Goals) -> Result<()>;

    fn load_history(&self) -> Result<Vec<MacroHistoryEntry>>;

    fn save_history(&self, entries: &[MacroHistoryEntry]) -> Result<()>;

    /// `None` when the catalog has never been saved, `Some(vec![])` when it was saved empty.
    fn load_catalog(&self) -> Result<Option<Vec<FoodItem>>>;

    fn save_catalog(&self, items: &[FoodItem]) -> Result<()>;
}
