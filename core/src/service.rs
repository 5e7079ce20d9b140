use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, FoodUpdate};
use crate::composer::{self, MealComposer};
use crate::goals::GoalProgress;
use crate::history::{AverageMacros, HistoryStore};
use crate::ledger::DailyLedger;
use crate::models::{
    FoodItem, Goals, LoggedFoodEntry, MacroHistoryEntry, Macros, MeasurementMode,
    validate_food_data, validate_goals, validate_quantity,
};
use crate::store::Store;

/// Remote food lookup (barcode databases).
///
/// The CLI implements this with reqwest. Called synchronously; any timeout
/// belongs to the implementation.
pub trait FoodLookupProvider: Send + Sync {
    fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodItem>>;
}

/// Owns the ledger, catalog and history, and writes them to `S` after each change.
///
/// Saves are best-effort: a failed write is logged and the in-memory state
/// stays authoritative.
pub struct MacroService<S: Store> {
    store: S,
    ledger: DailyLedger,
    catalog: Catalog,
    history: HistoryStore,
}

impl<S: Store> MacroService<S> {
    /// Load everything from `store`, seed the catalog if it was never saved,
    /// then archive the stored day if it is not `today`.
    pub fn open(store: S, today: NaiveDate) -> Result<Self> {
        let (ledger, repaired) = match store
            .load_ledger_state(today)
            .context("Failed to load ledger state")?
        {
            Some(state) => {
                let mut ledger = DailyLedger::from_state(state);
                let repaired = ledger.reconcile_totals();
                (ledger, repaired)
            }
            None => (DailyLedger::new(today), false),
        };
        let history = HistoryStore::new(store.load_history().context("Failed to load history")?);
        let (catalog, seeded) =
            Catalog::bootstrap(store.load_catalog().context("Failed to load catalog")?);

        let mut svc = Self {
            store,
            ledger,
            catalog,
            history,
        };
        if seeded {
            svc.persist_catalog();
        }
        if repaired {
            svc.persist_ledger();
        }
        svc.on_foreground(today);
        Ok(svc)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // --- Persistence ---

    fn persist_ledger(&self) {
        if let Err(e) = self.store.save_ledger_state(self.ledger.state()) {
            warn!(error = %format!("{e:#}"), "failed to save ledger state");
        }
    }

    fn persist_goals(&self) {
        if let Err(e) = self.store.save_goals(&self.ledger.goals()) {
            warn!(error = %format!("{e:#}"), "failed to save goals");
        }
    }

    fn persist_history(&self) {
        if let Err(e) = self.store.save_history(self.history.entries()) {
            warn!(error = %format!("{e:#}"), "failed to save history");
        }
    }

    fn persist_catalog(&self) {
        if let Err(e) = self.store.save_catalog(self.catalog.items()) {
            warn!(error = %format!("{e:#}"), "failed to save catalog");
        }
    }

    // --- Ledger ---

    /// Log `quantity` of `food`. The entry keeps its own copy of the food.
    pub fn log_food(
        &mut self,
        food: &FoodItem,
        quantity: f64,
        mode: MeasurementMode,
        at: DateTime<Utc>,
    ) -> Result<LoggedFoodEntry> {
        let quantity = validate_quantity(quantity)?;
        let entry = self.ledger.log_food(food, quantity, mode, at);
        self.persist_ledger();
        Ok(entry)
    }

    /// Log a catalog item by id. `Ok(None)` if no such item exists.
    pub fn log_catalog_food(
        &mut self,
        food_id: Uuid,
        quantity: f64,
        mode: MeasurementMode,
        at: DateTime<Utc>,
    ) -> Result<Option<LoggedFoodEntry>> {
        let Some(food) = self.catalog.get(food_id).cloned() else {
            return Ok(None);
        };
        self.log_food(&food, quantity, mode, at).map(Some)
    }

    pub fn delete_entry(&mut self, entry_id: Uuid) -> Option<LoggedFoodEntry> {
        let removed = self.ledger.delete_entry(entry_id)?;
        self.persist_ledger();
        Some(removed)
    }

    pub fn update_quantity(
        &mut self,
        entry_id: Uuid,
        quantity: f64,
    ) -> Result<Option<LoggedFoodEntry>> {
        let quantity = validate_quantity(quantity)?;
        let Some(entry) = self.ledger.update_quantity(entry_id, quantity).cloned() else {
            return Ok(None);
        };
        self.persist_ledger();
        Ok(Some(entry))
    }

    pub fn reset_day(&mut self) {
        self.ledger.reset_day();
        debug!("reset day");
        self.persist_ledger();
    }

    pub fn set_goals(&mut self, goals: Goals) -> Result<()> {
        validate_goals(&goals)?;
        self.ledger.set_goals(goals);
        self.persist_goals();
        Ok(())
    }

    #[must_use]
    pub fn totals(&self) -> Macros {
        self.ledger.totals()
    }

    #[must_use]
    pub fn food_log(&self) -> &[LoggedFoodEntry] {
        self.ledger.food_log()
    }

    #[must_use]
    pub fn goals(&self) -> Goals {
        self.ledger.goals()
    }

    #[must_use]
    pub fn progress(&self) -> GoalProgress {
        GoalProgress::compute(&self.ledger.totals(), &self.ledger.goals())
    }

    #[must_use]
    pub fn active_day(&self) -> NaiveDate {
        self.ledger.last_rollover_date()
    }

    // --- Rollover ---

    /// Archive the stored day if `today` is a different day. Safe to call repeatedly.
    pub fn on_foreground(&mut self, today: NaiveDate) -> Option<MacroHistoryEntry> {
        let archived = self.ledger.rollover(today)?;
        self.history.append(archived.clone());
        self.persist_history();
        self.persist_ledger();
        Some(archived)
    }

    // --- History ---

    #[must_use]
    pub fn history(&self) -> Vec<&MacroHistoryEntry> {
        self.history.newest_first()
    }

    #[must_use]
    pub fn history_entry(&self, id: Uuid) -> Option<&MacroHistoryEntry> {
        self.history.get(id)
    }

    pub fn delete_history_entry(&mut self, id: Uuid) -> Option<MacroHistoryEntry> {
        let removed = self.history.remove(id)?;
        self.persist_history();
        Some(removed)
    }

    /// Drop all history and make `today` the active day so no rollover fires next launch.
    pub fn clear_history(&mut self, today: NaiveDate) {
        self.history.clear();
        self.ledger.restart_day(today);
        self.persist_history();
        self.persist_ledger();
    }

    #[must_use]
    pub fn average_macros(&self) -> AverageMacros {
        self.history.average()
    }

    // --- Catalog ---

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// `Ok(None)` when the name is already taken.
    pub fn add_food(&mut self, food: FoodItem) -> Result<Option<FoodItem>> {
        validate_food_data(&food)?;
        let Some(added) = self.catalog.add(food) else {
            return Ok(None);
        };
        self.persist_catalog();
        Ok(Some(added))
    }

    pub fn edit_food(&mut self, id: Uuid, update: &FoodUpdate) -> Result<FoodItem> {
        let edited = self.catalog.edit(id, update)?;
        self.persist_catalog();
        Ok(edited)
    }

    pub fn delete_food(&mut self, id: Uuid) -> Option<FoodItem> {
        let removed = self.catalog.delete(id)?;
        self.persist_catalog();
        Some(removed)
    }

    pub fn toggle_favorite(&mut self, id: Uuid) -> Option<bool> {
        let favorite = self.catalog.toggle_favorite(id)?;
        self.persist_catalog();
        Some(favorite)
    }

    /// Look up a barcode and add the product to the catalog. An item that is
    /// already cataloged under the same name is returned as is.
    pub fn import_barcode(
        &mut self,
        provider: &dyn FoodLookupProvider,
        code: &str,
    ) -> Result<Option<FoodItem>> {
        let Some(food) = provider.lookup_barcode(code)? else {
            return Ok(None);
        };
        if let Some(existing) = self.catalog.find_by_name(&food.name) {
            return Ok(Some(existing.clone()));
        }
        self.add_food(food)
    }

    // --- Meals ---

    pub fn save_meal(&mut self, composer: &MealComposer) -> Result<FoodItem> {
        let meal = composer.save(&mut self.catalog)?;
        self.persist_catalog();
        Ok(meal)
    }

    fn meal(&self, meal_id: Uuid) -> Result<Option<FoodItem>> {
        match self.catalog.get(meal_id) {
            None => Ok(None),
            Some(item) if !item.is_meal => bail!("'{}' is not a meal", item.name),
            Some(item) => Ok(Some(item.clone())),
        }
    }

    fn store_meal(&mut self, meal: FoodItem) -> FoodItem {
        self.catalog.replace(meal.clone());
        self.persist_catalog();
        meal
    }

    /// Change one ingredient's quantity. `Ok(None)` if the meal or ingredient is unknown.
    pub fn set_meal_ingredient_quantity(
        &mut self,
        meal_id: Uuid,
        ingredient_id: Uuid,
        quantity: f64,
    ) -> Result<Option<FoodItem>> {
        let quantity = validate_quantity(quantity)?;
        let Some(mut meal) = self.meal(meal_id)? else {
            return Ok(None);
        };
        if !composer::set_ingredient_quantity(&mut meal, ingredient_id, quantity) {
            return Ok(None);
        }
        Ok(Some(self.store_meal(meal)))
    }

    pub fn remove_meal_ingredient(
        &mut self,
        meal_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<Option<FoodItem>> {
        let Some(mut meal) = self.meal(meal_id)? else {
            return Ok(None);
        };
        if composer::remove_ingredient(&mut meal, ingredient_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.store_meal(meal)))
    }

    /// Scale every ingredient so the meal weighs `new_total_weight` grams.
    pub fn rescale_meal(&mut self, meal_id: Uuid, new_total_weight: f64) -> Result<Option<FoodItem>> {
        let new_total_weight = validate_quantity(new_total_weight)?;
        let Some(mut meal) = self.meal(meal_id)? else {
            return Ok(None);
        };
        if !composer::rescale_to_total_weight(&mut meal, new_total_weight) {
            bail!("'{}' has no weight to scale from", meal.name);
        }
        Ok(Some(self.store_meal(meal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{LedgerState, ServingUnit};
    use anyhow::anyhow;

    struct MockProvider {
        foods: Vec<(String, FoodItem)>,
    }

    impl FoodLookupProvider for MockProvider {
        fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodItem>> {
            Ok(self
                .foods
                .iter()
                .find(|(code, _)| code == barcode)
                .map(|(_, f)| f.clone()))
        }
    }

    struct BrokenProvider;

    impl FoodLookupProvider for BrokenProvider {
        fn lookup_barcode(&self, _barcode: &str) -> Result<Option<FoodItem>> {
            Err(anyhow!("network unreachable"))
        }
    }

    /// Loads nothing, fails every write.
    struct FailingStore;

    impl Store for FailingStore {
        fn load_ledger_state(&self, _today: NaiveDate) -> Result<Option<LedgerState>> {
            Ok(None)
        }
        fn save_ledger_state(&self, _state: &LedgerState) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        fn save_goals(&self, _goals: &Goals) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        fn load_history(&self) -> Result<Vec<MacroHistoryEntry>> {
            Ok(Vec::new())
        }
        fn save_history(&self, _entries: &[MacroHistoryEntry]) -> Result<()> {
            Err(anyhow!("disk full"))
        }
        fn load_catalog(&self) -> Result<Option<Vec<FoodItem>>> {
            Ok(Some(Vec::new()))
        }
        fn save_catalog(&self, _items: &[FoodItem]) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn yogurt() -> FoodItem {
        FoodItem::new(
            "Yogurt",
            100,
            1,
            ServingUnit::Grams,
            Macros::new(200, 20.0, 10.0, 5.0),
        )
    }

    fn open_empty(today: NaiveDate) -> MacroService<Database> {
        let db = Database::open_in_memory().unwrap();
        db.save_catalog(&[]).unwrap();
        MacroService::open(db, today).unwrap()
    }

    #[test]
    fn test_open_seeds_and_persists_catalog() {
        let svc = MacroService::open(Database::open_in_memory().unwrap(), day(1)).unwrap();
        assert!(!svc.catalog().is_empty());
        let stored = svc.store().load_catalog().unwrap().unwrap();
        assert_eq!(stored.len(), svc.catalog().len());
        assert!(svc.history().is_empty());
        assert_eq!(svc.active_day(), day(1));
    }

    #[test]
    fn test_open_keeps_empty_catalog() {
        let svc = open_empty(day(1));
        assert!(svc.catalog().is_empty());
    }

    #[test]
    fn test_log_food_persists_across_reopen() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 50.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        assert_eq!(svc.totals().calories, 100);

        let svc = MacroService::open(svc.into_store(), day(1)).unwrap();
        assert_eq!(svc.totals().calories, 100);
        assert!((svc.totals().fats - 2.5).abs() < 0.01);
        assert_eq!(svc.food_log().len(), 1);
        assert!(svc.history().is_empty());
    }

    #[test]
    fn test_reopen_rebuilds_corrupt_totals_from_log() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 100.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        let db = svc.into_store();
        db.put_raw("ledger.totals", "{bad");

        let mut svc = MacroService::open(db, day(1)).unwrap();
        assert_eq!(svc.totals().calories, 200);
        assert!((svc.totals().protein - 20.0).abs() < 0.01);

        let stored = svc.store().load_ledger_state(day(1)).unwrap().unwrap();
        assert_eq!(stored.totals.calories, 200);

        let id = svc.food_log()[0].id;
        svc.delete_entry(id).unwrap();
        assert_eq!(svc.totals(), Macros::default());
    }

    #[test]
    fn test_reopen_drops_totals_of_unreadable_log_entry() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 100.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        svc.log_food(&yogurt(), 50.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        assert_eq!(svc.totals().calories, 300);

        let kept = serde_json::to_value(&svc.food_log()[0]).unwrap();
        let damaged = serde_json::json!([kept, { "quantity": "lots" }]);
        let db = svc.into_store();
        db.put_raw("ledger.food_log", &damaged.to_string());

        let svc = MacroService::open(db, day(2)).unwrap();
        let archived = svc.history()[0];
        assert_eq!(archived.foods_eaten.len(), 1);
        assert_eq!(archived.totals.calories, 200);
        assert!((archived.totals.fats - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_rejected_quantity_changes_nothing() {
        let mut svc = open_empty(day(1));
        assert!(
            svc.log_food(&yogurt(), 0.0, MeasurementMode::Weight, Utc::now())
                .is_err()
        );
        assert!(
            svc.log_food(&yogurt(), f64::NAN, MeasurementMode::Weight, Utc::now())
                .is_err()
        );
        assert_eq!(svc.totals(), Macros::default());
        assert!(svc.food_log().is_empty());
        assert!(svc.store().load_ledger_state(day(1)).unwrap().is_none());
    }

    #[test]
    fn test_delete_and_update_entry() {
        let mut svc = open_empty(day(1));
        let entry = svc
            .log_food(&yogurt(), 50.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        let updated = svc.update_quantity(entry.id, 75.0).unwrap().unwrap();
        assert!((updated.quantity - 75.0).abs() < 0.01);
        assert_eq!(svc.totals().calories, 150);
        assert!(svc.update_quantity(entry.id, -1.0).is_err());
        assert!(svc.update_quantity(Uuid::new_v4(), 1.0).unwrap().is_none());

        assert!(svc.delete_entry(entry.id).is_some());
        assert_eq!(svc.totals(), Macros::default());
        assert!(svc.delete_entry(entry.id).is_none());
    }

    #[test]
    fn test_rollover_on_open() {
        let db = Database::open_in_memory().unwrap();
        let mut state = LedgerState::fresh(day(14));
        state.totals = Macros::new(500, 30.0, 60.0, 15.0);
        db.save_ledger_state(&state).unwrap();
        db.save_catalog(&[]).unwrap();

        let svc = MacroService::open(db, day(15)).unwrap();
        let history = svc.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, day(14));
        assert_eq!(history[0].totals.calories, 500);
        assert_eq!(svc.totals(), Macros::default());
        assert_eq!(svc.active_day(), day(15));

        let svc = MacroService::open(svc.into_store(), day(15)).unwrap();
        assert_eq!(svc.history().len(), 1);
    }

    #[test]
    fn test_on_foreground_is_idempotent() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 100.0, MeasurementMode::Weight, Utc::now())
            .unwrap();

        assert!(svc.on_foreground(day(1)).is_none());
        let archived = svc.on_foreground(day(2)).unwrap();
        assert_eq!(archived.foods_eaten.len(), 1);
        assert!(svc.on_foreground(day(2)).is_none());
        assert_eq!(svc.history().len(), 1);
        assert_eq!(svc.store().load_history().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_history_restarts_day() {
        let mut svc = open_empty(day(1));
        svc.on_foreground(day(2));
        svc.on_foreground(day(3));
        assert_eq!(svc.history().len(), 2);

        svc.clear_history(day(5));
        assert!(svc.history().is_empty());
        assert_eq!(svc.active_day(), day(5));

        let svc = MacroService::open(svc.into_store(), day(5)).unwrap();
        assert!(svc.history().is_empty());
    }

    #[test]
    fn test_history_delete_and_average() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 100.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        svc.on_foreground(day(2));
        svc.log_food(&yogurt(), 200.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        svc.on_foreground(day(3));

        let avg = svc.average_macros();
        assert_eq!(avg.days, 2);
        assert!((avg.calories - 300.0).abs() < 0.01);

        let newest = svc.history()[0].id;
        assert_eq!(svc.history_entry(newest).unwrap().date, day(2));
        assert!(svc.delete_history_entry(newest).is_some());
        assert!(svc.delete_history_entry(newest).is_none());
        assert!((svc.average_macros().calories - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_set_goals() {
        let mut svc = open_empty(day(1));
        svc.log_food(&yogurt(), 100.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        let goals = Goals::from_calorie_split(2000, 30, 40, 30).unwrap();
        svc.set_goals(goals).unwrap();
        assert_eq!(svc.totals().calories, 200);
        assert!((svc.progress().calories.fraction - 0.1).abs() < 0.01);

        assert!(
            svc.set_goals(Goals {
                calorie_goal: -5,
                ..Goals::default()
            })
            .is_err()
        );
        assert_eq!(svc.goals(), goals);

        let svc = MacroService::open(svc.into_store(), day(1)).unwrap();
        assert_eq!(svc.goals(), goals);
    }

    #[test]
    fn test_failed_saves_keep_memory_state() {
        let mut svc = MacroService::open(FailingStore, day(1)).unwrap();
        let entry = svc
            .log_food(&yogurt(), 50.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        svc.set_goals(Goals {
            calorie_goal: 1800,
            ..Goals::default()
        })
        .unwrap();
        let added = svc.add_food(yogurt()).unwrap().unwrap();

        assert_eq!(svc.totals().calories, 100);
        assert_eq!(svc.food_log()[0].id, entry.id);
        assert_eq!(svc.goals().calorie_goal, 1800);
        assert!(svc.catalog().get(added.id).is_some());
        assert!(svc.on_foreground(day(2)).is_some());
        assert_eq!(svc.history().len(), 1);
    }

    #[test]
    fn test_catalog_operations() {
        let mut svc = open_empty(day(1));
        let added = svc.add_food(yogurt()).unwrap().unwrap();
        assert!(svc.add_food(yogurt()).unwrap().is_none());

        let mut invalid = yogurt();
        invalid.name = "Bad".to_string();
        invalid.macros.protein = -1.0;
        assert!(svc.add_food(invalid).is_err());

        assert_eq!(svc.toggle_favorite(added.id), Some(true));
        let edited = svc
            .edit_food(
                added.id,
                &FoodUpdate {
                    calories: Some(180),
                    ..FoodUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(edited.macros.calories, 180);
        assert!(edited.is_favorite);

        let stored = svc.store().load_catalog().unwrap().unwrap();
        assert_eq!(stored, vec![edited]);

        assert!(svc.delete_food(added.id).is_some());
        assert!(svc.store().load_catalog().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_log_catalog_food() {
        let mut svc = open_empty(day(1));
        let added = svc.add_food(yogurt()).unwrap().unwrap();
        let entry = svc
            .log_catalog_food(added.id, 1.0, MeasurementMode::Serving, Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(entry.food.id, added.id);
        assert_eq!(svc.totals().calories, 200);
        assert!(
            svc.log_catalog_food(Uuid::new_v4(), 1.0, MeasurementMode::Serving, Utc::now())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_import_barcode() {
        let mut svc = open_empty(day(1));
        let provider = MockProvider {
            foods: vec![("3017620422003".to_string(), yogurt())],
        };

        let food = svc
            .import_barcode(&provider, "3017620422003")
            .unwrap()
            .unwrap();
        assert_eq!(food.name, "Yogurt");
        assert_eq!(svc.catalog().len(), 1);

        let again = svc
            .import_barcode(&provider, "3017620422003")
            .unwrap()
            .unwrap();
        assert_eq!(again.id, food.id);
        assert_eq!(svc.catalog().len(), 1);

        assert!(svc.import_barcode(&provider, "0000").unwrap().is_none());
    }

    #[test]
    fn test_import_barcode_provider_error_leaves_catalog() {
        let mut svc = open_empty(day(1));
        assert!(svc.import_barcode(&BrokenProvider, "123").is_err());
        assert!(svc.catalog().is_empty());
        assert_eq!(svc.store().load_catalog().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_meal_lifecycle() {
        let mut svc = open_empty(day(1));
        let pasta = svc
            .add_food(FoodItem::new(
                "Pasta",
                200,
                1,
                ServingUnit::Grams,
                Macros::new(100, 4.0, 20.0, 1.0),
            ))
            .unwrap()
            .unwrap();
        let sauce = svc
            .add_food(FoodItem::new(
                "Sauce",
                240,
                4,
                ServingUnit::Grams,
                Macros::new(80, 2.0, 8.0, 4.0),
            ))
            .unwrap()
            .unwrap();

        let mut composer = MealComposer::new("Dinner");
        composer.add_component(&pasta, 100.0, MeasurementMode::Weight);
        composer.add_component(&sauce, 2.0, MeasurementMode::Serving);
        let meal = svc.save_meal(&composer).unwrap();
        assert_eq!(meal.macros.calories, 90);
        assert_eq!(meal.weight_in_grams, 220);

        // log half the meal, then change the meal; the log keeps its snapshot
        svc.log_food(&meal, 110.0, MeasurementMode::Weight, Utc::now())
            .unwrap();
        assert_eq!(svc.totals().calories, 45);

        let rescaled = svc.rescale_meal(meal.id, 440.0).unwrap().unwrap();
        assert_eq!(rescaled.macros.calories, 180);
        assert_eq!(svc.totals().calories, 45);

        let pasta_ing = rescaled.ingredients[0].id;
        let edited = svc
            .set_meal_ingredient_quantity(meal.id, pasta_ing, 100.0)
            .unwrap()
            .unwrap();
        assert_eq!(edited.macros.calories, 130);
        assert!((edited.ingredients[1].quantity - 4.0).abs() < 0.01);

        let sauce_ing = edited.ingredients[1].id;
        let trimmed = svc
            .remove_meal_ingredient(meal.id, sauce_ing)
            .unwrap()
            .unwrap();
        assert_eq!(trimmed.macros.calories, 50);
        assert!(svc.remove_meal_ingredient(meal.id, pasta_ing).is_err());

        let stored = svc.store().load_catalog().unwrap().unwrap();
        let stored_meal = stored.iter().find(|f| f.id == meal.id).unwrap();
        assert_eq!(stored_meal.ingredients.len(), 1);
    }

    #[test]
    fn test_meal_ops_reject_plain_food() {
        let mut svc = open_empty(day(1));
        let food = svc.add_food(yogurt()).unwrap().unwrap();
        assert!(svc.rescale_meal(food.id, 100.0).is_err());
        assert!(svc.rescale_meal(Uuid::new_v4(), 100.0).unwrap().is_none());
    }
}
