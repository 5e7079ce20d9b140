use anyhow::Result;
use serde::Serialize;

use macrolog_core::goals::{GoalProgress, MacroProgress};
use macrolog_core::models::{Goals, LoggedFoodEntry, Macros};

use super::Service;
use super::helpers::{format_quantity, no_neg_zero};

#[derive(Serialize)]
struct TodayView<'a> {
    date: chrono::NaiveDate,
    totals: Macros,
    goals: Goals,
    progress: GoalProgress,
    food_log: &'a [LoggedFoodEntry],
}

fn progress_line(label: &str, unit: &str, p: &MacroProgress) -> String {
    let consumed = no_neg_zero(p.consumed);
    if p.goal > 0.0 {
        let goal = p.goal;
        let remaining = no_neg_zero(p.remaining);
        let pct = p.fraction * 100.0;
        format!(
            "  {label:<8} {consumed:>7.0}{unit} / {goal:.0}{unit}  ({pct:.0}%, {remaining:.0}{unit} left)"
        )
    } else {
        format!("  {label:<8} {consumed:>7.0}{unit}")
    }
}

pub(crate) fn cmd_today(svc: &Service, json: bool) -> Result<()> {
    let progress = svc.progress();

    if json {
        let view = TodayView {
            date: svc.active_day(),
            totals: svc.totals(),
            goals: svc.goals(),
            progress,
            food_log: svc.food_log(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let date = svc.active_day();
    println!("=== {date} ===\n");

    if svc.food_log().is_empty() {
        println!("  Nothing logged yet.\n");
    } else {
        for (i, entry) in svc.food_log().iter().enumerate() {
            let n = i + 1;
            let name = &entry.food.name;
            let qty = format_quantity(entry.quantity, entry.mode, entry.serving_unit);
            let scaled = entry.scaled();
            let cal = scaled.rounded_calories();
            let p = scaled.protein;
            let c = scaled.carbs;
            let f = scaled.fats;
            println!("  [{n}] {name}, {qty}: {cal} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g");
        }
        println!();
    }

    println!("{}", progress_line("Calories", "", &progress.calories));
    println!("{}", progress_line("Protein", "g", &progress.protein));
    println!("{}", progress_line("Carbs", "g", &progress.carbs));
    println!("{}", progress_line("Fat", "g", &progress.fats));

    if svc.goals().is_unset() {
        println!("\nNo goals set. Use `macrolog goals set` or `macrolog goals wizard`.");
    }

    Ok(())
}

pub(crate) fn cmd_reset(svc: &mut Service, json: bool) -> Result<()> {
    let cleared = svc.food_log().len();
    svc.reset_day();

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else {
        println!("Cleared {cleared} entries from today");
    }
    Ok(())
}
