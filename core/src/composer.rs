//! Meal composition: building a meal from snapshotted ingredients and keeping
//! its top-level nutrition derived from them after later edits.

use anyhow::{Result, bail};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::models::{FoodItem, Macros, MealIngredient, MeasurementMode, ServingUnit};
use crate::scaling::ScaledMacros;

/// Floor applied to every quantity after a weight rescale.
pub const MIN_INGREDIENT_QUANTITY: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MealTotals {
    pub macros: Macros,
    pub weight_in_grams: f64,
}

/// Sum of every ingredient's contribution. Calories are rounded once, after summing.
#[must_use]
pub fn meal_totals(ingredients: &[MealIngredient]) -> MealTotals {
    let scaled: ScaledMacros = ingredients.iter().map(MealIngredient::scaled).sum();
    MealTotals {
        macros: scaled.to_macros(),
        weight_in_grams: ingredients
            .iter()
            .map(MealIngredient::weight_contribution)
            .sum(),
    }
}

#[allow(clippy::cast_sign_loss)]
fn rounded_weight(weight: f64) -> u32 {
    weight.round().max(0.0) as u32
}

/// Recompute a meal's macros and base weight from its ingredients.
pub fn refresh_meal(meal: &mut FoodItem) {
    let totals = meal_totals(&meal.ingredients);
    meal.macros = totals.macros;
    meal.weight_in_grams = rounded_weight(totals.weight_in_grams);
    meal.servings = 1;
}

/// Change one ingredient's quantity. Siblings are left alone.
pub fn set_ingredient_quantity(meal: &mut FoodItem, ingredient_id: Uuid, quantity: f64) -> bool {
    let Some(ingredient) = meal.ingredients.iter_mut().find(|i| i.id == ingredient_id) else {
        return false;
    };
    ingredient.quantity = quantity.max(0.0);
    refresh_meal(meal);
    true
}

/// Drop one ingredient. A meal keeps at least one ingredient.
pub fn remove_ingredient(meal: &mut FoodItem, ingredient_id: Uuid) -> Result<Option<MealIngredient>> {
    let Some(idx) = meal.ingredients.iter().position(|i| i.id == ingredient_id) else {
        return Ok(None);
    };
    if meal.ingredients.len() == 1 {
        bail!("A meal needs at least one ingredient; delete the meal instead");
    }
    let removed = meal.ingredients.remove(idx);
    refresh_meal(meal);
    Ok(Some(removed))
}

/// Scale every ingredient by `new_total / current_total` so the meal weighs `new_total`.
///
/// Returns `false` without touching the meal when the current weight is not
/// positive or the target is not a finite number.
pub fn rescale_to_total_weight(meal: &mut FoodItem, new_total_weight: f64) -> bool {
    let current = meal_totals(&meal.ingredients).weight_in_grams;
    if current <= 0.0 || !new_total_weight.is_finite() || new_total_weight < 0.0 {
        return false;
    }
    let factor = new_total_weight / current;
    for ingredient in &mut meal.ingredients {
        ingredient.quantity = (ingredient.quantity * factor).max(MIN_INGREDIENT_QUANTITY);
    }
    refresh_meal(meal);
    true
}

/// Working set of ingredients for a meal being created or re-edited.
#[derive(Debug, Clone, Default)]
pub struct MealComposer {
    name: String,
    existing_id: Option<Uuid>,
    is_favorite: bool,
    components: Vec<MealIngredient>,
}

impl MealComposer {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }

    /// Start from an existing meal; saving replaces it in place.
    #[must_use]
    pub fn edit(meal: &FoodItem) -> Self {
        Self {
            name: meal.name.clone(),
            existing_id: Some(meal.id),
            is_favorite: meal.is_favorite,
            components: meal.ingredients.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    #[must_use]
    pub fn existing_id(&self) -> Option<Uuid> {
        self.existing_id
    }

    /// Snapshot `food` as a new ingredient and return the ingredient id.
    pub fn add_component(&mut self, food: &FoodItem, quantity: f64, mode: MeasurementMode) -> Uuid {
        let ingredient = MealIngredient::snapshot(food, quantity, mode);
        let id = ingredient.id;
        self.components.push(ingredient);
        id
    }

    pub fn remove_component(&mut self, ingredient_id: Uuid) -> bool {
        let before = self.components.len();
        self.components.retain(|i| i.id != ingredient_id);
        self.components.len() != before
    }

    #[must_use]
    pub fn components(&self) -> &[MealIngredient] {
        &self.components
    }

    #[must_use]
    pub fn totals(&self) -> MealTotals {
        meal_totals(&self.components)
    }

    /// The meal as it would be stored: one serving weighing the rounded total.
    pub fn build(&self) -> Result<FoodItem> {
        if self.name.is_empty() {
            bail!("Meal name must not be empty");
        }
        if self.components.is_empty() {
            bail!("A meal needs at least one ingredient");
        }
        let totals = self.totals();
        let mut meal = FoodItem::new(
            &self.name,
            rounded_weight(totals.weight_in_grams),
            1,
            ServingUnit::Grams,
            totals.macros,
        );
        if let Some(id) = self.existing_id {
            meal.id = id;
        }
        meal.is_meal = true;
        meal.is_favorite = self.is_favorite;
        meal.ingredients = self.components.clone();
        Ok(meal)
    }

    /// Write the meal into `catalog`, replacing the original when editing.
    pub fn save(&self, catalog: &mut Catalog) -> Result<FoodItem> {
        let meal = self.build()?;
        if let Some(clash) = catalog.find_by_name(&meal.name) {
            if Some(clash.id) != self.existing_id {
                bail!("A food named '{}' already exists", meal.name);
            }
        }
        match self.existing_id {
            Some(_) => {
                if !catalog.replace(meal.clone()) {
                    bail!("Meal '{}' no longer exists", meal.name);
                }
                Ok(meal)
            }
            None => match catalog.add(meal) {
                Some(saved) => Ok(saved),
                None => bail!("A food named '{}' already exists", self.name),
            },
        }
    }
}
