use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    FoodItem, Goals, LedgerState, LoggedFoodEntry, MacroHistoryEntry, Macros, MeasurementMode,
};

/// Today's running totals and food log.
///
/// Every path that changes `food_log` adjusts `totals` in the same call, so
/// `totals` stays the elementwise sum of each entry's scaled contribution
/// (calories rounded per entry).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLedger {
    state: LedgerState,
}

impl DailyLedger {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            state: LedgerState::fresh(today),
        }
    }

    #[must_use]
    pub fn from_state(state: LedgerState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    #[must_use]
    pub fn totals(&self) -> Macros {
        self.state.totals
    }

    #[must_use]
    pub fn goals(&self) -> Goals {
        self.state.goals
    }

    #[must_use]
    pub fn food_log(&self) -> &[LoggedFoodEntry] {
        &self.state.food_log
    }

    #[must_use]
    pub fn last_rollover_date(&self) -> NaiveDate {
        self.state.last_rollover_date
    }

    #[must_use]
    pub fn entry(&self, id: Uuid) -> Option<&LoggedFoodEntry> {
        self.state.food_log.iter().find(|e| e.id == id)
    }

    /// Snapshot `food`, add its scaled contribution to the totals, and append it to the log.
    pub fn log_food(
        &mut self,
        food: &FoodItem,
        quantity: f64,
        mode: MeasurementMode,
        at: DateTime<Utc>,
    ) -> LoggedFoodEntry {
        let entry = LoggedFoodEntry {
            id: Uuid::new_v4(),
            food: food.clone(),
            quantity: quantity.max(0.0),
            mode,
            serving_unit: food.serving_unit,
            timestamp: at,
        };
        let contribution = entry.scaled();
        self.state.totals.add_scaled(&contribution);
        self.state.food_log.push(entry.clone());
        debug!(entry_id = %entry.id, food = %food.name, quantity, "logged food");
        entry
    }

    /// Remove an entry and reverse its contribution, clamping totals at zero.
    pub fn delete_entry(&mut self, id: Uuid) -> Option<LoggedFoodEntry> {
        let idx = self.state.food_log.iter().position(|e| e.id == id)?;
        let entry = self.state.food_log.remove(idx);
        self.state.totals.subtract_scaled(&entry.scaled());
        debug!(entry_id = %id, "deleted log entry");
        Some(entry)
    }

    /// Change an entry's quantity in place, applying only the difference to the totals.
    pub fn update_quantity(&mut self, id: Uuid, new_quantity: f64) -> Option<&LoggedFoodEntry> {
        let idx = self.state.food_log.iter().position(|e| e.id == id)?;
        let entry = &mut self.state.food_log[idx];
        let old = entry.scaled();
        entry.quantity = new_quantity.max(0.0);
        let new = entry.scaled();

        let totals = &mut self.state.totals;
        totals.calories = (totals.calories + new.rounded_calories() - old.rounded_calories()).max(0);
        totals.protein = (totals.protein + new.protein - old.protein).max(0.0);
        totals.carbs = (totals.carbs + new.carbs - old.carbs).max(0.0);
        totals.fats = (totals.fats + new.fats - old.fats).max(0.0);
        debug!(entry_id = %id, new_quantity, "updated log entry quantity");
        Some(&self.state.food_log[idx])
    }

    /// Zero the totals and clear the log. Goals and the rollover date are untouched.
    pub fn reset_day(&mut self) {
        self.state.totals = Macros::default();
        self.state.food_log.clear();
    }

    pub fn set_goals(&mut self, goals: Goals) {
        self.state.goals = goals;
    }

    /// Mark `today` as the active day without archiving anything.
    pub fn restart_day(&mut self, today: NaiveDate) {
        self.state.last_rollover_date = today;
    }

    /// Archive the active day if `today` differs from the stored day.
    ///
    /// Any number of skipped days collapse into a single entry labeled with the
    /// stored day. Calling again on the same day returns `None`.
    pub fn rollover(&mut self, today: NaiveDate) -> Option<MacroHistoryEntry> {
        let active_day = self.state.last_rollover_date;
        if active_day == today {
            return None;
        }
        let archived = MacroHistoryEntry {
            id: Uuid::new_v4(),
            date: active_day,
            totals: self.state.totals,
            foods_eaten: std::mem::take(&mut self.state.food_log),
        };
        self.reset_day();
        self.state.last_rollover_date = today;
        info!(
            date = %active_day,
            calories = archived.totals.calories,
            entries = archived.foods_eaten.len(),
            "archived day"
        );
        Some(archived)
    }

    /// Rebuild totals from the log.
    #[must_use]
    pub fn recomputed_totals(&self) -> Macros {
        let mut totals = Macros::default();
        for entry in &self.state.food_log {
            totals.add_scaled(&entry.scaled());
        }
        totals
    }

    /// Replace stored totals that no longer match the log, e.g. after a
    /// damaged totals document or a dropped log record. Returns true if
    /// anything changed.
    pub fn reconcile_totals(&mut self) -> bool {
        const EPS: f64 = 1e-6;
        let rebuilt = self.recomputed_totals();
        let stored = self.state.totals;
        let matches = stored.calories == rebuilt.calories
            && (stored.protein - rebuilt.protein).abs() < EPS
            && (stored.carbs - rebuilt.carbs).abs() < EPS
            && (stored.fats - rebuilt.fats).abs() < EPS;
        if matches {
            return false;
        }
        warn!(
            stored = stored.calories,
            rebuilt = rebuilt.calories,
            entries = self.state.food_log.len(),
            "totals disagree with food log, rebuilding"
        );
        self.state.totals = rebuilt;
        true
    }
}
