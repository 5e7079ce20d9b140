use anyhow::Result;
use chrono::NaiveDate;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::models::MacroHistoryEntry;

use super::Service;
use super::helpers::{format_quantity, no_neg_zero, not_found, position};

fn entry_at(svc: &Service, n: usize, json: bool) -> MacroHistoryEntry {
    let history = svc.history();
    match position(n, history.len()) {
        Some(idx) => history[idx].clone(),
        None => not_found(&format!("History entry {n} not found"), json),
    }
}

pub(crate) fn cmd_history_list(svc: &Service, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Foods")]
        foods: usize,
    }

    let history = svc.history();
    if history.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No history yet");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    let rows: Vec<HistoryRow> = history
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let p = no_neg_zero(e.totals.protein);
            let c = no_neg_zero(e.totals.carbs);
            let f = no_neg_zero(e.totals.fats);
            HistoryRow {
                idx: i + 1,
                date: e.date.to_string(),
                calories: e.totals.calories.to_string(),
                protein: format!("{p:.0}g"),
                carbs: format!("{c:.0}g"),
                fat: format!("{f:.0}g"),
                foods: e.foods_eaten.len(),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_history_show(svc: &Service, n: usize, json: bool) -> Result<()> {
    let entry = entry_at(svc, n, json);

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let date = entry.date;
    println!("=== {date} ===\n");
    for food in &entry.foods_eaten {
        let name = &food.food.name;
        let qty = format_quantity(food.quantity, food.mode, food.serving_unit);
        let cal = food.scaled().rounded_calories();
        println!("  {name}, {qty}: {cal} kcal");
    }
    if !entry.foods_eaten.is_empty() {
        println!();
    }
    let t = entry.totals;
    println!(
        "  TOTAL: {} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        t.calories, t.protein, t.carbs, t.fats
    );
    Ok(())
}

pub(crate) fn cmd_history_delete(svc: &mut Service, n: usize, json: bool) -> Result<()> {
    let entry = entry_at(svc, n, json);
    let Some(removed) = svc.delete_history_entry(entry.id) else {
        not_found(&format!("History entry {n} not found"), json);
    };

    if json {
        println!("{}", serde_json::json!({ "deleted": removed.date }));
    } else {
        println!("Deleted history for {}", removed.date);
    }
    Ok(())
}

pub(crate) fn cmd_history_clear(svc: &mut Service, today: NaiveDate, json: bool) -> Result<()> {
    let cleared = svc.history().len();
    svc.clear_history(today);

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else {
        println!("Cleared {cleared} history entries");
    }
    Ok(())
}

pub(crate) fn cmd_history_average(svc: &Service, json: bool) -> Result<()> {
    let avg = svc.average_macros();

    if json {
        println!("{}", serde_json::to_string_pretty(&avg)?);
        return Ok(());
    }

    if avg.days == 0 {
        eprintln!("No history yet");
        process::exit(2);
    }

    let days = avg.days;
    println!(
        "Average over {days} days: {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        avg.calories, avg.protein, avg.carbs, avg.fats
    );
    Ok(())
}
