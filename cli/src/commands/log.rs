use anyhow::Result;
use chrono::Utc;

use macrolog_core::models::{LoggedFoodEntry, MeasurementMode};

use super::helpers::{
    format_quantity, not_found, parse_amount, parse_quantity, parse_servings, position,
};
use super::{Service, resolve_food};

fn describe(entry: &LoggedFoodEntry) -> String {
    let name = &entry.food.name;
    let qty = format_quantity(entry.quantity, entry.mode, entry.serving_unit);
    let cal = entry.scaled().rounded_calories();
    format!("{name} {qty}: {cal} kcal")
}

fn entry_at(svc: &Service, n: usize, json: bool) -> LoggedFoodEntry {
    match position(n, svc.food_log().len()) {
        Some(idx) => svc.food_log()[idx].clone(),
        None => not_found(&format!("Entry {n} not found in today's log"), json),
    }
}

pub(crate) fn cmd_log(
    svc: &mut Service,
    food_query: &str,
    quantity: &str,
    serving: bool,
    json: bool,
) -> Result<()> {
    let (quantity, mode) = parse_amount(quantity, serving)?;
    let food = resolve_food(svc, food_query, json)?;

    let entry = svc.log_food(&food, quantity, mode, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let total = svc.totals().calories;
        println!("Logged: {} ({total} kcal today)", describe(&entry));
    }
    Ok(())
}

pub(crate) fn cmd_edit(svc: &mut Service, n: usize, quantity: &str, json: bool) -> Result<()> {
    let entry = entry_at(svc, n, json);
    let quantity = match entry.mode {
        MeasurementMode::Weight => parse_quantity(quantity)?,
        MeasurementMode::Serving => parse_servings(quantity)?,
    };

    let Some(updated) = svc.update_quantity(entry.id, quantity)? else {
        not_found(&format!("Entry {n} not found in today's log"), json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("Updated [{n}] {}", describe(&updated));
    }
    Ok(())
}

pub(crate) fn cmd_delete(svc: &mut Service, n: usize, json: bool) -> Result<()> {
    let entry = entry_at(svc, n, json);
    let Some(removed) = svc.delete_entry(entry.id) else {
        not_found(&format!("Entry {n} not found in today's log"), json);
    };

    if json {
        println!("{}", serde_json::json!({ "deleted": removed.id }));
    } else {
        println!("Deleted [{n}] {}", describe(&removed));
    }
    Ok(())
}
