use anyhow::{Result, bail};
use serde::Serialize;

use macrolog_core::composer::{MealComposer, MealTotals, meal_totals};
use macrolog_core::models::{FoodItem, MealIngredient, MeasurementMode};

use super::helpers::{
    format_quantity, no_neg_zero, not_found, parse_item_spec, parse_quantity, parse_servings,
    position,
};
use super::{Service, find_exact, resolve_food};

#[derive(Serialize)]
struct MealView<'a> {
    meal: &'a FoodItem,
    totals: MealTotals,
}

fn find_meal(svc: &Service, name: &str, json: bool) -> Result<FoodItem> {
    let meal = find_exact(svc, name, json);
    if !meal.is_meal {
        bail!("'{}' is not a meal", meal.name);
    }
    Ok(meal)
}

fn ingredient_at(meal: &FoodItem, n: usize, json: bool) -> MealIngredient {
    match position(n, meal.ingredients.len()) {
        Some(idx) => meal.ingredients[idx].clone(),
        None => not_found(
            &format!("Ingredient {n} not found in '{}'", meal.name),
            json,
        ),
    }
}

fn print_meal(meal: &FoodItem, json: bool) -> Result<()> {
    let totals = meal_totals(&meal.ingredients);
    if json {
        let view = MealView { meal, totals };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let name = &meal.name;
    let weight = no_neg_zero(totals.weight_in_grams);
    println!("=== {name} ===");
    println!("  Total weight: {weight:.0}g\n");

    println!("  INGREDIENTS:");
    for (i, ing) in meal.ingredients.iter().enumerate() {
        let n = i + 1;
        let iname = &ing.name;
        let qty = format_quantity(ing.quantity, ing.mode, ing.serving_unit);
        let grams = ing.weight_contribution();
        let cal = ing.scaled().rounded_calories();
        println!("    [{n}] {iname}, {qty} ({grams:.0}g): {cal} kcal");
    }

    let m = totals.macros;
    let cal = m.calories;
    println!("\n  TOTAL:");
    println!(
        "    {cal} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        m.protein, m.carbs, m.fats
    );
    Ok(())
}

pub(crate) fn cmd_meal_create(
    svc: &mut Service,
    name: &str,
    items: &[String],
    json: bool,
) -> Result<()> {
    if items.is_empty() {
        bail!("A meal needs at least one --item");
    }
    let mut composer = MealComposer::new(name);
    for spec in items {
        let (food_name, quantity, mode) = parse_item_spec(spec)?;
        let food = resolve_food(svc, &food_name, json)?;
        composer.add_component(&food, quantity, mode);
    }

    let meal = svc.save_meal(&composer)?;
    if !json {
        println!("Saved meal: {}\n", meal.name);
    }
    print_meal(&meal, json)
}

pub(crate) fn cmd_meal_show(svc: &Service, name: &str, json: bool) -> Result<()> {
    let meal = find_meal(svc, name, json)?;
    print_meal(&meal, json)
}

pub(crate) fn cmd_meal_set_quantity(
    svc: &mut Service,
    name: &str,
    n: usize,
    quantity: &str,
    json: bool,
) -> Result<()> {
    let meal = find_meal(svc, name, json)?;
    let ingredient = ingredient_at(&meal, n, json);
    let quantity = match ingredient.mode {
        MeasurementMode::Weight => parse_quantity(quantity)?,
        MeasurementMode::Serving => parse_servings(quantity)?,
    };

    let Some(updated) = svc.set_meal_ingredient_quantity(meal.id, ingredient.id, quantity)? else {
        not_found(&format!("Ingredient {n} not found in '{name}'"), json);
    };
    print_meal(&updated, json)
}

pub(crate) fn cmd_meal_remove_ingredient(
    svc: &mut Service,
    name: &str,
    n: usize,
    json: bool,
) -> Result<()> {
    let meal = find_meal(svc, name, json)?;
    let ingredient = ingredient_at(&meal, n, json);

    let Some(updated) = svc.remove_meal_ingredient(meal.id, ingredient.id)? else {
        not_found(&format!("Ingredient {n} not found in '{name}'"), json);
    };
    if !json {
        println!("Removed {} from {}\n", ingredient.name, updated.name);
    }
    print_meal(&updated, json)
}

pub(crate) fn cmd_meal_set_weight(
    svc: &mut Service,
    name: &str,
    grams: &str,
    json: bool,
) -> Result<()> {
    let meal = find_meal(svc, name, json)?;
    let grams = parse_quantity(grams)?;

    let Some(updated) = svc.rescale_meal(meal.id, grams)? else {
        not_found(&format!("Meal '{name}' not found"), json);
    };
    print_meal(&updated, json)
}
