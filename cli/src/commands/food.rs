use anyhow::{Context, Result, bail};
use std::process;

use macrolog_core::catalog::{FoodUpdate, SortOrder, sort_items};
use macrolog_core::models::{FoodItem, Macros};

use crate::openfoodfacts::OpenFoodFactsClient;

use super::helpers::{not_found, parse_unit, print_food_table};
use super::{Service, find_exact};

pub(crate) fn cmd_food_list(
    svc: &Service,
    search: Option<&str>,
    sort: Option<&str>,
    favorites: bool,
    json: bool,
) -> Result<()> {
    let order = sort.map(SortOrder::parse).transpose()?.unwrap_or_default();
    let mut foods = svc.catalog().search(search.unwrap_or(""));
    if favorites {
        foods.retain(|f| f.is_favorite);
    }
    sort_items(&mut foods, order);

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
    }
    Ok(())
}

/// Nutrition arguments shared by `food add` and `food edit`.
pub(crate) struct FoodArgs {
    pub weight: Option<u32>,
    pub servings: Option<u32>,
    pub unit: Option<String>,
    pub calories: Option<i64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

pub(crate) fn cmd_food_add(svc: &mut Service, name: &str, args: &FoodArgs, json: bool) -> Result<()> {
    let Some(calories) = args.calories else {
        bail!("--calories is required");
    };
    let unit = args.unit.as_deref().map(parse_unit).transpose()?.unwrap_or_default();
    let food = FoodItem::new(
        name,
        args.weight.unwrap_or(100),
        args.servings.unwrap_or(1),
        unit,
        Macros::new(
            calories,
            args.protein.unwrap_or(0.0),
            args.carbs.unwrap_or(0.0),
            args.fat.unwrap_or(0.0),
        ),
    );

    let Some(added) = svc.add_food(food)? else {
        bail!("A food named '{}' already exists", name.trim());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&added)?);
    } else {
        let name = &added.name;
        println!("Added food: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_food_edit(
    svc: &mut Service,
    name: &str,
    rename: Option<String>,
    args: &FoodArgs,
    json: bool,
) -> Result<()> {
    let food = find_exact(svc, name, json);
    let update = FoodUpdate {
        name: rename,
        weight_in_grams: args.weight,
        servings: args.servings,
        serving_unit: args.unit.as_deref().map(parse_unit).transpose()?,
        calories: args.calories,
        protein: args.protein,
        carbs: args.carbs,
        fats: args.fat,
    };
    let edited = svc.edit_food(food.id, &update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&edited)?);
    } else {
        let name = &edited.name;
        println!("Updated food: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &mut Service, name: &str, json: bool) -> Result<()> {
    let food = find_exact(svc, name, json);
    let Some(removed) = svc.delete_food(food.id) else {
        not_found(&format!("Food '{name}' not found"), json);
    };

    if json {
        println!("{}", serde_json::json!({ "deleted": removed.name }));
    } else {
        let name = &removed.name;
        println!("Deleted food: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_food_favorite(svc: &mut Service, name: &str, json: bool) -> Result<()> {
    let food = find_exact(svc, name, json);
    let Some(favorite) = svc.toggle_favorite(food.id) else {
        not_found(&format!("Food '{name}' not found"), json);
    };

    if json {
        println!("{}", serde_json::json!({ "name": food.name, "favorite": favorite }));
    } else if favorite {
        println!("Marked {} as favorite", food.name);
    } else {
        println!("Removed {} from favorites", food.name);
    }
    Ok(())
}

pub(crate) fn cmd_food_barcode(svc: &mut Service, code: &str, json: bool) -> Result<()> {
    let off = OpenFoodFactsClient::new()?;
    let food = tokio::task::block_in_place(|| svc.import_barcode(&off, code))
        .with_context(|| format!("Barcode lookup failed for '{code}'"))?;
    let Some(food) = food else {
        not_found(&format!("No product found for barcode '{code}'"), json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let cal = food.macros.calories;
        println!("Imported: {name} ({cal} kcal per 100g)");
    }
    Ok(())
}
