use anyhow::{Result, bail};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{FoodItem, ServingUnit, validate_food_data};

const DEFAULT_FOODS: &str = include_str!("../data/default_foods.json");

pub const SORT_ORDERS: &[&str] = &["name", "calories", "protein", "carbs", "fats"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Name,
    Calories,
    Protein,
    Carbs,
    Fats,
}

impl SortOrder {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortOrder::Name),
            "calories" | "kcal" => Ok(SortOrder::Calories),
            "protein" => Ok(SortOrder::Protein),
            "carbs" => Ok(SortOrder::Carbs),
            "fats" | "fat" => Ok(SortOrder::Fats),
            _ => bail!(
                "Invalid sort order '{s}'. Must be one of: {}",
                SORT_ORDERS.join(", ")
            ),
        }
    }
}

/// Partial edit of a catalog item. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub weight_in_grams: Option<u32>,
    pub servings: Option<u32>,
    pub serving_unit: Option<ServingUnit>,
    pub calories: Option<i64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl FoodUpdate {
    fn touches_nutrition(&self) -> bool {
        self.weight_in_grams.is_some()
            || self.servings.is_some()
            || self.serving_unit.is_some()
            || self.calories.is_some()
            || self.protein.is_some()
            || self.carbs.is_some()
            || self.fats.is_some()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// The dictionary of reusable foods and meals. Names are unique case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<FoodItem>,
}

impl Catalog {
    #[must_use]
    pub fn new(items: Vec<FoodItem>) -> Self {
        Self { items }
    }

    /// Build the catalog from what the store returned. `None` (never saved)
    /// seeds from the bundled defaults; the flag reports whether that happened.
    #[must_use]
    pub fn bootstrap(loaded: Option<Vec<FoodItem>>) -> (Self, bool) {
        match loaded {
            Some(items) => (Self::new(items), false),
            None => {
                let items = default_foods();
                info!(count = items.len(), "seeded catalog from bundled defaults");
                (Self::new(items), true)
            }
        }
    }

    #[must_use]
    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&FoodItem> {
        self.items.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&FoodItem> {
        self.items.iter().find(|f| same_name(&f.name, name))
    }

    /// Append `item` unless its name is already taken. Returns the stored copy.
    pub fn add(&mut self, mut item: FoodItem) -> Option<FoodItem> {
        item.name = item.name.trim().to_string();
        if self.find_by_name(&item.name).is_some() {
            return None;
        }
        self.items.push(item.clone());
        Some(item)
    }

    /// Swap in `item` for the entry with the same id, keeping its position.
    pub fn replace(&mut self, item: FoodItem) -> bool {
        match self.items.iter_mut().find(|f| f.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Apply a direct edit. Meals may be renamed, but their nutrition only
    /// changes through the composer.
    pub fn edit(&mut self, id: Uuid, update: &FoodUpdate) -> Result<FoodItem> {
        let Some(current) = self.get(id) else {
            bail!("Food not found");
        };
        if current.is_meal && update.touches_nutrition() {
            bail!("'{}' is a meal; edit its ingredients instead", current.name);
        }

        let mut edited = current.clone();
        if let Some(name) = &update.name {
            let name = name.trim();
            if self
                .items
                .iter()
                .any(|f| f.id != id && same_name(&f.name, name))
            {
                bail!("A food named '{name}' already exists");
            }
            edited.name = name.to_string();
        }
        if let Some(w) = update.weight_in_grams {
            edited.weight_in_grams = w;
        }
        if let Some(s) = update.servings {
            edited.servings = s;
        }
        if let Some(unit) = update.serving_unit {
            edited.serving_unit = unit;
        }
        if let Some(c) = update.calories {
            edited.macros.calories = c;
        }
        if let Some(p) = update.protein {
            edited.macros.protein = p;
        }
        if let Some(c) = update.carbs {
            edited.macros.carbs = c;
        }
        if let Some(f) = update.fats {
            edited.macros.fats = f;
        }
        validate_food_data(&edited)?;

        self.replace(edited.clone());
        Ok(edited)
    }

    pub fn delete(&mut self, id: Uuid) -> Option<FoodItem> {
        let idx = self.items.iter().position(|f| f.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self, id: Uuid) -> Option<bool> {
        let item = self.items.iter_mut().find(|f| f.id == id)?;
        item.is_favorite = !item.is_favorite;
        Some(item.is_favorite)
    }

    /// Case-insensitive substring match on the name. An empty query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FoodItem> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|f| needle.is_empty() || f.name.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn sorted(&self, order: SortOrder) -> Vec<&FoodItem> {
        let mut out: Vec<&FoodItem> = self.items.iter().collect();
        sort_items(&mut out, order);
        out
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<&FoodItem> {
        self.items.iter().filter(|f| f.is_favorite).collect()
    }

    #[must_use]
    pub fn meals(&self) -> Vec<&FoodItem> {
        self.items.iter().filter(|f| f.is_meal).collect()
    }
}

/// Name ascending; nutrient orders descending.
pub fn sort_items(items: &mut [&FoodItem], order: SortOrder) {
    match order {
        SortOrder::Name => items.sort_by_key(|f| f.name.to_lowercase()),
        SortOrder::Calories => items.sort_by(|a, b| b.macros.calories.cmp(&a.macros.calories)),
        SortOrder::Protein => items.sort_by(|a, b| b.macros.protein.total_cmp(&a.macros.protein)),
        SortOrder::Carbs => items.sort_by(|a, b| b.macros.carbs.total_cmp(&a.macros.carbs)),
        SortOrder::Fats => items.sort_by(|a, b| b.macros.fats.total_cmp(&a.macros.fats)),
    }
}

fn default_foods() -> Vec<FoodItem> {
    match serde_json::from_str(DEFAULT_FOODS) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "bundled default foods failed to decode");
            Vec::new()
        }
    }
}
