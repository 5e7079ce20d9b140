mod commands;
mod config;
mod openfoodfacts;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    FoodArgs, Service, cmd_delete, cmd_edit, cmd_food_add, cmd_food_barcode, cmd_food_delete,
    cmd_food_edit, cmd_food_favorite, cmd_food_list, cmd_goals_set, cmd_goals_show,
    cmd_goals_split, cmd_goals_wizard, cmd_history_average, cmd_history_clear,
    cmd_history_delete, cmd_history_list, cmd_history_show, cmd_log, cmd_meal_create,
    cmd_meal_remove_ingredient, cmd_meal_set_quantity, cmd_meal_set_weight, cmd_meal_show,
    cmd_reset, cmd_today,
};
use crate::config::Config;
use macrolog_core::db::Database;

/// Log filter, e.g. `MACROLOG_LOG=debug` or `MACROLOG_LOG=macrolog_core=debug`.
const LOG_ENV: &str = "MACROLOG_LOG";

#[derive(Parser)]
#[command(
    name = "macrolog",
    version,
    about = "Track daily calories and macros against your goals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's totals, goals, and food log
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food from the catalog
    Log {
        /// Food name to search for
        food: String,
        /// Amount in grams/ml (e.g. "150", "150g", "250ml"), or servings with --serving
        quantity: String,
        /// Treat the quantity as a number of servings
        #[arg(short, long)]
        serving: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the quantity of a logged entry
    Edit {
        /// Entry number as shown by `macrolog today`
        n: usize,
        /// New amount, in the entry's own unit
        quantity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a logged entry
    Delete {
        /// Entry number as shown by `macrolog today`
        n: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear today's totals and food log
    Reset {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage daily calorie/macro goals
    Goals {
        #[command(subcommand)]
        command: GoalsCommands,
    },
    /// Manage the food catalog
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Manage meals (foods composed of other foods)
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Browse archived days
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum GoalsCommands {
    /// Show current goals
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set goals directly (unspecified goals keep their value)
    Set {
        /// Daily calories
        #[arg(long)]
        calories: Option<i64>,
        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat in grams
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set goals from calories and a percentage split summing to 100
    Split {
        /// Daily calories
        calories: i64,
        /// Protein percentage
        #[arg(long)]
        protein: i64,
        /// Carbs percentage
        #[arg(long)]
        carbs: i64,
        /// Fat percentage
        #[arg(long)]
        fat: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate maintenance goals from body measurements
    Wizard {
        /// male or female
        #[arg(long)]
        sex: String,
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// sedentary, light, moderate, active, very-active
        #[arg(long, default_value = "moderate")]
        activity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// List/search the catalog
    List {
        /// Search query to filter foods
        #[arg(short, long)]
        search: Option<String>,
        /// Sort by: name, calories, protein, carbs, fats
        #[arg(long)]
        sort: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a food; nutrition is per --weight grams (default 100) and --servings (default 1)
    Add {
        /// Food name
        name: String,
        /// Base weight in grams the nutrition refers to
        #[arg(long)]
        weight: Option<u32>,
        /// Number of servings in the base weight
        #[arg(long)]
        servings: Option<u32>,
        /// Unit label: g or ml
        #[arg(long)]
        unit: Option<String>,
        /// Calories per base
        #[arg(long)]
        calories: i64,
        /// Protein per base
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs per base
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat per base
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a food (meals can only be renamed)
    Edit {
        /// Current food name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        weight: Option<u32>,
        #[arg(long)]
        servings: Option<u32>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        calories: Option<i64>,
        #[arg(long)]
        protein: Option<f64>,
        #[arg(long)]
        carbs: Option<f64>,
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food
    Delete {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a food's favorite flag
    Favorite {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a barcode on `OpenFoodFacts` and add it to the catalog
    Barcode {
        /// Barcode number
        code: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Create a meal from catalog foods
    Create {
        /// Meal name
        name: String,
        /// Ingredient as "food=150" (grams) or "food=2s" (servings); repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a meal's ingredients and totals
    Show {
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one ingredient's quantity
    SetQuantity {
        /// Meal name
        meal: String,
        /// Ingredient number as shown by `macrolog meal show`
        n: usize,
        /// New amount, in the ingredient's own unit
        quantity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove one ingredient
    RemoveIngredient {
        /// Meal name
        meal: String,
        /// Ingredient number as shown by `macrolog meal show`
        n: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scale all ingredients so the meal weighs the given total
    SetWeight {
        /// Meal name
        meal: String,
        /// New total weight in grams
        grams: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List archived days, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one archived day
    Show {
        /// Entry number as shown by `macrolog history list`
        n: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one archived day
    Delete {
        /// Entry number as shown by `macrolog history list`
        n: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all archived days
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Average macros across archived days
    Average {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&config.db_path)?;
    let today = Local::now().date_naive();
    let mut svc: Service = Service::open(db, today)
        .with_context(|| format!("Failed to load data from {}", config.data_dir.display()))?;
    let svc = &mut svc;

    match cli.command {
        Commands::Today { json } => cmd_today(svc, json),
        Commands::Log {
            food,
            quantity,
            serving,
            json,
        } => cmd_log(svc, &food, &quantity, serving, json),
        Commands::Edit { n, quantity, json } => cmd_edit(svc, n, &quantity, json),
        Commands::Delete { n, json } => cmd_delete(svc, n, json),
        Commands::Reset { json } => cmd_reset(svc, json),
        Commands::Goals { command } => match command {
            GoalsCommands::Show { json } => cmd_goals_show(svc, json),
            GoalsCommands::Set {
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_goals_set(svc, calories, protein, carbs, fat, json),
            GoalsCommands::Split {
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_goals_split(svc, calories, protein, carbs, fat, json),
            GoalsCommands::Wizard {
                sex,
                age,
                height,
                weight,
                activity,
                json,
            } => cmd_goals_wizard(svc, &sex, age, height, weight, &activity, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::List {
                search,
                sort,
                favorites,
                json,
            } => cmd_food_list(svc, search.as_deref(), sort.as_deref(), favorites, json),
            FoodCommands::Add {
                name,
                weight,
                servings,
                unit,
                calories,
                protein,
                carbs,
                fat,
                json,
            } => {
                let args = FoodArgs {
                    weight,
                    servings,
                    unit,
                    calories: Some(calories),
                    protein,
                    carbs,
                    fat,
                };
                cmd_food_add(svc, &name, &args, json)
            }
            FoodCommands::Edit {
                name,
                rename,
                weight,
                servings,
                unit,
                calories,
                protein,
                carbs,
                fat,
                json,
            } => {
                let args = FoodArgs {
                    weight,
                    servings,
                    unit,
                    calories,
                    protein,
                    carbs,
                    fat,
                };
                cmd_food_edit(svc, &name, rename, &args, json)
            }
            FoodCommands::Delete { name, json } => cmd_food_delete(svc, &name, json),
            FoodCommands::Favorite { name, json } => cmd_food_favorite(svc, &name, json),
            FoodCommands::Barcode { code, json } => cmd_food_barcode(svc, &code, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Create { name, items, json } => cmd_meal_create(svc, &name, &items, json),
            MealCommands::Show { name, json } => cmd_meal_show(svc, &name, json),
            MealCommands::SetQuantity {
                meal,
                n,
                quantity,
                json,
            } => cmd_meal_set_quantity(svc, &meal, n, &quantity, json),
            MealCommands::RemoveIngredient { meal, n, json } => {
                cmd_meal_remove_ingredient(svc, &meal, n, json)
            }
            MealCommands::SetWeight { meal, grams, json } => {
                cmd_meal_set_weight(svc, &meal, &grams, json)
            }
        },
        Commands::History { command } => match command {
            HistoryCommands::List { json } => cmd_history_list(svc, json),
            HistoryCommands::Show { n, json } => cmd_history_show(svc, n, json),
            HistoryCommands::Delete { n, json } => cmd_history_delete(svc, n, json),
            HistoryCommands::Clear { json } => cmd_history_clear(svc, today, json),
            HistoryCommands::Average { json } => cmd_history_average(svc, json),
        },
    }
}
