//! Pure conversion from base nutrition plus a quantity to a macro contribution.
//!
//! Every function here is total: a zero base, a negative quantity, or a
//! non-finite quantity yields a zero ratio instead of an error or `NaN`.

use std::ops::Add;

use serde::Serialize;

use crate::models::{FoodItem, Macros, MealIngredient, MeasurementMode};

/// Anything that carries nutrition defined per a base weight and serving count.
pub trait NutritionBase {
    fn base_weight_in_grams(&self) -> u32;
    fn base_servings(&self) -> u32;
    fn base_macros(&self) -> Macros;
}

impl NutritionBase for FoodItem {
    fn base_weight_in_grams(&self) -> u32 {
        self.weight_in_grams
    }

    fn base_servings(&self) -> u32 {
        self.servings
    }

    fn base_macros(&self) -> Macros {
        self.macros
    }
}

impl NutritionBase for MealIngredient {
    fn base_weight_in_grams(&self) -> u32 {
        self.base_weight_in_grams
    }

    fn base_servings(&self) -> u32 {
        self.base_servings
    }

    fn base_macros(&self) -> Macros {
        self.macros
    }
}

/// Unrounded macro contribution. Calories are rounded only via [`ScaledMacros::rounded_calories`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScaledMacros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl ScaledMacros {
    #[must_use]
    pub fn rounded_calories(&self) -> i64 {
        self.calories.round() as i64
    }

    /// Collapse into stored macros, rounding calories once.
    #[must_use]
    pub fn to_macros(self) -> Macros {
        Macros::new(self.rounded_calories(), self.protein, self.carbs, self.fats)
    }
}

impl Add for ScaledMacros {
    type Output = ScaledMacros;

    fn add(self, rhs: ScaledMacros) -> ScaledMacros {
        ScaledMacros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

impl std::iter::Sum for ScaledMacros {
    fn sum<I: Iterator<Item = ScaledMacros>>(iter: I) -> Self {
        iter.fold(ScaledMacros::default(), Add::add)
    }
}

/// `quantity / base`, where base is the weight or serving count chosen by `mode`.
/// Zero when the base is zero or the quantity is not a positive number.
#[must_use]
pub fn ratio<B: NutritionBase + ?Sized>(base: &B, quantity: f64, mode: MeasurementMode) -> f64 {
    let divisor = match mode {
        MeasurementMode::Weight => base.base_weight_in_grams(),
        MeasurementMode::Serving => base.base_servings(),
    };
    if divisor == 0 || !quantity.is_finite() || quantity <= 0.0 {
        return 0.0;
    }
    quantity / f64::from(divisor)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn scale_by_ratio(macros: Macros, ratio: f64) -> ScaledMacros {
    ScaledMacros {
        calories: macros.calories as f64 * ratio,
        protein: macros.protein * ratio,
        carbs: macros.carbs * ratio,
        fats: macros.fats * ratio,
    }
}

#[must_use]
pub fn scale<B: NutritionBase + ?Sized>(
    base: &B,
    quantity: f64,
    mode: MeasurementMode,
) -> ScaledMacros {
    scale_by_ratio(base.base_macros(), ratio(base, quantity, mode))
}

/// Grams contributed to a composite: the quantity itself in weight mode, or
/// the per-serving weight times the quantity in serving mode.
#[must_use]
pub fn weight_contribution<B: NutritionBase + ?Sized>(
    base: &B,
    quantity: f64,
    mode: MeasurementMode,
) -> f64 {
    if !quantity.is_finite() || quantity <= 0.0 {
        return 0.0;
    }
    match mode {
        MeasurementMode::Weight => quantity,
        MeasurementMode::Serving => {
            let servings = base.base_servings();
            if servings == 0 {
                return 0.0;
            }
            f64::from(base.base_weight_in_grams()) / f64::from(servings) * quantity
        }
    }
}
