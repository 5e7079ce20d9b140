use serde::Serialize;
use uuid::Uuid;

use crate::models::MacroHistoryEntry;

/// Archived days, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStore {
    entries: Vec<MacroHistoryEntry>,
}

/// Mean of each macro across all archived days.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AverageMacros {
    pub days: usize,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl HistoryStore {
    #[must_use]
    pub fn new(entries: Vec<MacroHistoryEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[MacroHistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: MacroHistoryEntry) {
        self.entries.push(entry);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<MacroHistoryEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&MacroHistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries sorted by date, most recent first. Ties keep the later insertion first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<&MacroHistoryEntry> {
        let mut sorted: Vec<&MacroHistoryEntry> = self.entries.iter().rev().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> AverageMacros {
        if self.entries.is_empty() {
            return AverageMacros::default();
        }
        let n = self.entries.len() as f64;
        let mut avg = AverageMacros {
            days: self.entries.len(),
            ..AverageMacros::default()
        };
        for entry in &self.entries {
            avg.calories += entry.totals.calories as f64;
            avg.protein += entry.totals.protein;
            avg.carbs += entry.totals.carbs;
            avg.fats += entry.totals.fats;
        }
        avg.calories /= n;
        avg.protein /= n;
        avg.carbs /= n;
        avg.fats /= n;
        avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Macros;
    use chrono::NaiveDate;

    fn entry(d: u32, calories: i64, protein: f64) -> MacroHistoryEntry {
        MacroHistoryEntry {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            totals: Macros::new(calories, protein, 100.0, 50.0),
            foods_eaten: Vec::new(),
        }
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        let store = HistoryStore::default();
        assert_eq!(store.average(), AverageMacros::default());
    }

    #[test]
    fn test_average_per_field() {
        let store = HistoryStore::new(vec![entry(1, 2000, 100.0), entry(2, 1500, 150.0)]);
        let avg = store.average();
        assert_eq!(avg.days, 2);
        assert!((avg.calories - 1750.0).abs() < 0.01);
        assert!((avg.protein - 125.0).abs() < 0.01);
        assert!((avg.carbs - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_remove_and_get() {
        let first = entry(1, 2000, 100.0);
        let id = first.id;
        let mut store = HistoryStore::new(vec![first, entry(2, 1500, 150.0)]);

        assert!(store.get(id).is_some());
        assert_eq!(store.remove(id).unwrap().id, id);
        assert!(store.get(id).is_none());
        assert!(store.remove(id).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_newest_first() {
        let mut store = HistoryStore::default();
        store.append(entry(3, 1, 0.0));
        store.append(entry(9, 2, 0.0));
        store.append(entry(5, 3, 0.0));
        let dates: Vec<u32> = store
            .newest_first()
            .iter()
            .map(|e| chrono::Datelike::day(&e.date))
            .collect();
        assert_eq!(dates, vec![9, 5, 3]);
    }

    #[test]
    fn test_clear() {
        let mut store = HistoryStore::new(vec![entry(1, 1, 0.0)]);
        store.clear();
        assert!(store.is_empty());
    }
}
