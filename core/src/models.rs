use std::fmt;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scaling::{self, ScaledMacros};

/// Which base value a quantity is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    Weight,
    Serving,
}

/// Unit label for weight-mode quantities. Does not affect arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServingUnit {
    #[default]
    #[serde(rename = "g", alias = "grams")]
    Grams,
    #[serde(rename = "ml", alias = "milliliters")]
    Milliliters,
}

impl ServingUnit {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ServingUnit::Grams => "g",
            ServingUnit::Milliliters => "ml",
        }
    }
}

impl fmt::Display for ServingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calories plus the three macronutrients in grams.
///
/// Used both for per-base nutrition on foods and for running totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Macros {
    #[must_use]
    pub fn new(calories: i64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    /// Add a scaled contribution. Calories are rounded per contribution.
    pub fn add_scaled(&mut self, scaled: &ScaledMacros) {
        self.calories += scaled.rounded_calories();
        self.protein += scaled.protein;
        self.carbs += scaled.carbs;
        self.fats += scaled.fats;
    }

    /// Subtract a scaled contribution, clamping every field at zero.
    pub fn subtract_scaled(&mut self, scaled: &ScaledMacros) {
        self.calories = (self.calories - scaled.rounded_calories()).max(0);
        self.protein = (self.protein - scaled.protein).max(0.0);
        self.carbs = (self.carbs - scaled.carbs).max(0.0);
        self.fats = (self.fats - scaled.fats).max(0.0);
    }
}

/// A reusable nutrition definition. Macros are per base quantity, not per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub weight_in_grams: u32,
    #[serde(default)]
    pub servings: u32,
    #[serde(default)]
    pub serving_unit: ServingUnit,
    #[serde(flatten)]
    pub macros: Macros,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_meal: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<MealIngredient>,
}

impl FoodItem {
    #[must_use]
    pub fn new(
        name: &str,
        weight_in_grams: u32,
        servings: u32,
        serving_unit: ServingUnit,
        macros: Macros,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            weight_in_grams,
            servings,
            serving_unit,
            macros,
            is_favorite: false,
            is_meal: false,
            ingredients: Vec::new(),
        }
    }
}

/// Frozen nutrition snapshot embedded in a meal.
///
/// `food_id` is a display-only back-reference and is never followed for arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealIngredient {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub food_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base_weight_in_grams: u32,
    #[serde(default)]
    pub base_servings: u32,
    #[serde(default)]
    pub serving_unit: ServingUnit,
    #[serde(flatten)]
    pub macros: Macros,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub mode: MeasurementMode,
}

impl MealIngredient {
    /// Copy the food's current per-base values. Later edits to `food` do not propagate.
    #[must_use]
    pub fn snapshot(food: &FoodItem, quantity: f64, mode: MeasurementMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            food_id: Some(food.id),
            name: food.name.clone(),
            base_weight_in_grams: food.weight_in_grams,
            base_servings: food.servings,
            serving_unit: food.serving_unit,
            macros: food.macros,
            quantity: quantity.max(0.0),
            mode,
        }
    }

    #[must_use]
    pub fn scaled(&self) -> ScaledMacros {
        scaling::scale(self, self.quantity, self.mode)
    }

    #[must_use]
    pub fn weight_contribution(&self) -> f64 {
        scaling::weight_contribution(self, self.quantity, self.mode)
    }
}

/// One act of eating an amount of a food on the active day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFoodEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub food: FoodItem,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub mode: MeasurementMode,
    #[serde(default)]
    pub serving_unit: ServingUnit,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl LoggedFoodEntry {
    /// Contribution computed from the entry's own snapshot, never the live catalog.
    #[must_use]
    pub fn scaled(&self) -> ScaledMacros {
        scaling::scale(&self.food, self.quantity, self.mode)
    }
}

/// Archived snapshot of one finished day. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroHistoryEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub date: NaiveDate,
    #[serde(default)]
    pub totals: Macros,
    #[serde(default)]
    pub foods_eaten: Vec<LoggedFoodEntry>,
}

/// Daily targets. Zero means unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    pub calorie_goal: i64,
    pub protein_goal: f64,
    pub carb_goal: f64,
    pub fat_goal: f64,
}

impl Goals {
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Goals::default()
    }
}

/// Everything the daily ledger persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub totals: Macros,
    pub goals: Goals,
    pub food_log: Vec<LoggedFoodEntry>,
    pub last_rollover_date: NaiveDate,
}

impl LedgerState {
    #[must_use]
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            totals: Macros::default(),
            goals: Goals::default(),
            food_log: Vec::new(),
            last_rollover_date: today,
        }
    }
}

/// Reject non-numeric, non-finite, or non-positive quantities before they reach the ledger.
pub fn validate_quantity(quantity: f64) -> Result<f64> {
    if !quantity.is_finite() {
        bail!("Quantity must be a number");
    }
    if quantity <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok(quantity)
}

/// Validate a food definition: name must not be empty, macros must not be negative.
pub fn validate_food_data(food: &FoodItem) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    if food.macros.calories < 0 {
        bail!("calories must not be negative");
    }
    for (label, value) in [
        ("protein", food.macros.protein),
        ("carbs", food.macros.carbs),
        ("fats", food.macros.fats),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{label} must be a non-negative number");
        }
    }
    if food.weight_in_grams == 0 && food.servings == 0 {
        bail!("A food needs a base weight or a serving count");
    }
    Ok(())
}

pub fn validate_goals(goals: &Goals) -> Result<()> {
    if goals.calorie_goal < 0 {
        bail!("Calorie goal must not be negative");
    }
    for (label, value) in [
        ("protein", goals.protein_goal),
        ("carb", goals.carb_goal),
        ("fat", goals.fat_goal),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("The {label} goal must be a non-negative number");
        }
    }
    Ok(())
}

pub fn validate_macro_split(protein: i64, carbs: i64, fat: i64) -> Result<()> {
    if protein < 0 || carbs < 0 || fat < 0 {
        bail!("Macro percentages must be non-negative");
    }
    if protein > 100 || carbs > 100 || fat > 100 {
        bail!("Each macro percentage must be between 0 and 100");
    }
    let sum = protein + carbs + fat;
    if sum != 100 {
        bail!("Macro percentages must sum to 100 (got {sum})");
    }
    Ok(())
}
