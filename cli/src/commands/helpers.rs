use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use macrolog_core::models::{FoodItem, MeasurementMode, ServingUnit, validate_quantity};

/// Parse a weight-mode quantity: "150", "150g", "150ml", "150 g".
pub(crate) fn parse_quantity(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let number = trimmed
        .strip_suffix("ml")
        .or_else(|| trimmed.strip_suffix('g'))
        .unwrap_or(trimmed)
        .trim();
    let value: f64 = number
        .parse()
        .with_context(|| format!("Invalid quantity: '{s}'. Use a number like '150' or '150g'"))?;
    validate_quantity(value)
}

/// Parse a serving count: "2", "1.5", "2s".
pub(crate) fn parse_servings(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('s').unwrap_or(trimmed).trim();
    let value: f64 = number
        .parse()
        .with_context(|| format!("Invalid serving count: '{s}'"))?;
    validate_quantity(value)
}

/// Parse a quantity given the `--serving` flag.
pub(crate) fn parse_amount(s: &str, serving: bool) -> Result<(f64, MeasurementMode)> {
    if serving {
        Ok((parse_servings(s)?, MeasurementMode::Serving))
    } else {
        Ok((parse_quantity(s)?, MeasurementMode::Weight))
    }
}

/// Parse a meal item spec "food=150" (grams) or "food=2s" (servings).
pub(crate) fn parse_item_spec(s: &str) -> Result<(String, f64, MeasurementMode)> {
    let Some((name, qty)) = s.rsplit_once('=') else {
        bail!("Invalid item '{s}'. Use 'food=150' for grams or 'food=2s' for servings");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid item '{s}': missing food name");
    }
    let qty = qty.trim();
    if qty.ends_with('s') {
        Ok((name.to_string(), parse_servings(qty)?, MeasurementMode::Serving))
    } else {
        Ok((name.to_string(), parse_quantity(qty)?, MeasurementMode::Weight))
    }
}

pub(crate) fn parse_unit(s: &str) -> Result<ServingUnit> {
    match s.trim().to_lowercase().as_str() {
        "g" | "grams" => Ok(ServingUnit::Grams),
        "ml" | "milliliters" => Ok(ServingUnit::Milliliters),
        _ => bail!("Invalid unit '{s}'. Use g or ml"),
    }
}

/// Convert a 1-based position from the command line into an index.
pub(crate) fn position(n: usize, len: usize) -> Option<usize> {
    (1..=len).contains(&n).then(|| n - 1)
}

pub(crate) fn format_quantity(quantity: f64, mode: MeasurementMode, unit: ServingUnit) -> String {
    let qty = if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity:.1}")
    };
    match mode {
        MeasurementMode::Weight => format!("{qty}{unit}"),
        MeasurementMode::Serving if (quantity - 1.0).abs() < f64::EPSILON => {
            format!("{qty} serving")
        }
        MeasurementMode::Serving => format!("{qty} servings"),
    }
}

pub(crate) fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("\nSelect a food (1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let n: usize = line.trim().parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

pub(crate) fn print_food_table(foods: &[&FoodItem]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Per")]
        base: String,
        #[tabled(rename = "Cal")]
        calories: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "C")]
        carbs: String,
        #[tabled(rename = "F")]
        fat: String,
        #[tabled(rename = "")]
        flags: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .enumerate()
        .map(|(i, f)| FoodRow {
            idx: i + 1,
            name: truncate(&f.name, 35),
            base: {
                let w = f.weight_in_grams;
                let unit = f.serving_unit;
                match f.servings {
                    1 => format!("{w}{unit}"),
                    s => format!("{w}{unit} / {s} sv"),
                }
            },
            calories: f.macros.calories.to_string(),
            protein: format!("{:.1}", f.macros.protein),
            carbs: format!("{:.1}", f.macros.carbs),
            fat: format!("{:.1}", f.macros.fats),
            flags: {
                let mut flags = String::new();
                if f.is_favorite {
                    flags.push('*');
                }
                if f.is_meal {
                    flags.push_str("meal");
                }
                flags
            },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Report a missing record and exit with status 2.
pub(crate) fn not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert!((parse_quantity("150").unwrap() - 150.0).abs() < f64::EPSILON);
        assert!((parse_quantity("150g").unwrap() - 150.0).abs() < f64::EPSILON);
        assert!((parse_quantity("250ml").unwrap() - 250.0).abs() < f64::EPSILON);
        assert!((parse_quantity("12.5 g").unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_quantity_invalid() {
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("-50g").is_err());
        assert!(parse_quantity("NaN").is_err());
        assert!(parse_quantity("inf").is_err());
    }

    #[test]
    fn test_parse_amount() {
        let (q, mode) = parse_amount("2", true).unwrap();
        assert!((q - 2.0).abs() < f64::EPSILON);
        assert_eq!(mode, MeasurementMode::Serving);

        let (q, mode) = parse_amount("80g", false).unwrap();
        assert!((q - 80.0).abs() < f64::EPSILON);
        assert_eq!(mode, MeasurementMode::Weight);
    }

    #[test]
    fn test_parse_item_spec() {
        let (name, q, mode) = parse_item_spec("Rice, white=150").unwrap();
        assert_eq!(name, "Rice, white");
        assert!((q - 150.0).abs() < f64::EPSILON);
        assert_eq!(mode, MeasurementMode::Weight);

        let (name, q, mode) = parse_item_spec("Sauce = 2s").unwrap();
        assert_eq!(name, "Sauce");
        assert!((q - 2.0).abs() < f64::EPSILON);
        assert_eq!(mode, MeasurementMode::Serving);
    }

    #[test]
    fn test_parse_item_spec_invalid() {
        assert!(parse_item_spec("rice").is_err());
        assert!(parse_item_spec("=100").is_err());
        assert!(parse_item_spec("rice=0").is_err());
        assert!(parse_item_spec("rice=lots").is_err());
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(parse_unit("ML").unwrap(), ServingUnit::Milliliters);
        assert_eq!(parse_unit("g").unwrap(), ServingUnit::Grams);
        assert!(parse_unit("oz").is_err());
    }

    #[test]
    fn test_position() {
        assert_eq!(position(1, 3), Some(0));
        assert_eq!(position(3, 3), Some(2));
        assert_eq!(position(0, 3), None);
        assert_eq!(position(4, 3), None);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(
            format_quantity(150.0, MeasurementMode::Weight, ServingUnit::Grams),
            "150g"
        );
        assert_eq!(
            format_quantity(1.0, MeasurementMode::Serving, ServingUnit::Grams),
            "1 serving"
        );
        assert_eq!(
            format_quantity(2.5, MeasurementMode::Serving, ServingUnit::Milliliters),
            "2.5 servings"
        );
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Entry 3 not found"), r#"{"error":"Entry 3 not found"}"#);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
    }
}
