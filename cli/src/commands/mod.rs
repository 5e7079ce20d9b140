mod food;
mod goals;
mod helpers;
mod history;
mod log;
mod meal;
mod today;

use macrolog_core::db::Database;
use macrolog_core::models::FoodItem;
use macrolog_core::service::MacroService;

use anyhow::Result;

use helpers::{not_found, print_food_table, prompt_choice};

pub(crate) use food::{
    FoodArgs, cmd_food_add, cmd_food_barcode, cmd_food_delete, cmd_food_edit, cmd_food_favorite,
    cmd_food_list,
};
pub(crate) use goals::{cmd_goals_set, cmd_goals_show, cmd_goals_split, cmd_goals_wizard};
pub(crate) use history::{
    cmd_history_average, cmd_history_clear, cmd_history_delete, cmd_history_list,
    cmd_history_show,
};
pub(crate) use log::{cmd_delete, cmd_edit, cmd_log};
pub(crate) use meal::{
    cmd_meal_create, cmd_meal_remove_ingredient, cmd_meal_set_quantity, cmd_meal_set_weight,
    cmd_meal_show,
};
pub(crate) use today::{cmd_reset, cmd_today};

pub(crate) type Service = MacroService<Database>;

/// Resolve a name to a catalog item: an exact (case-insensitive) match wins,
/// otherwise a single substring match, otherwise the user picks from a table.
pub(super) fn resolve_food(svc: &Service, query: &str, json: bool) -> Result<FoodItem> {
    let catalog = svc.catalog();
    if let Some(exact) = catalog.find_by_name(query) {
        return Ok(exact.clone());
    }

    let matches = catalog.search(query);
    match matches.as_slice() {
        [] => not_found(&format!("No food found for '{query}'"), json),
        [only] => Ok((*only).clone()),
        _ => {
            print_food_table(&matches);
            let idx = prompt_choice(matches.len())?;
            Ok(matches[idx].clone())
        }
    }
}

/// Resolve a name that must match exactly. Used for edits and deletes.
pub(super) fn find_exact(svc: &Service, name: &str, json: bool) -> FoodItem {
    match svc.catalog().find_by_name(name) {
        Some(food) => food.clone(),
        None => not_found(&format!("Food '{name}' not found"), json),
    }
}
