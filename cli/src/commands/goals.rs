use anyhow::{Result, bail};

use macrolog_core::goals::{ActivityLevel, BodyProfile, Sex};
use macrolog_core::models::Goals;

use super::Service;

fn print_goals(goals: &Goals) {
    let cal = goals.calorie_goal;
    let p = goals.protein_goal;
    let c = goals.carb_goal;
    let f = goals.fat_goal;
    println!("Goals: {cal} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g");
}

fn apply(svc: &mut Service, goals: Goals, json: bool) -> Result<()> {
    svc.set_goals(goals)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&svc.goals())?);
    } else {
        print_goals(&svc.goals());
    }
    Ok(())
}

pub(crate) fn cmd_goals_show(svc: &Service, json: bool) -> Result<()> {
    let goals = svc.goals();
    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else if goals.is_unset() {
        eprintln!("No goals set. Use `macrolog goals set` or `macrolog goals wizard`.");
    } else {
        print_goals(&goals);
    }
    Ok(())
}

/// Overwrite only the goals that were given.
pub(crate) fn cmd_goals_set(
    svc: &mut Service,
    calories: Option<i64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    json: bool,
) -> Result<()> {
    if calories.is_none() && protein.is_none() && carbs.is_none() && fat.is_none() {
        bail!("Nothing to set. Provide at least one of --calories, --protein, --carbs, or --fat");
    }
    let current = svc.goals();
    let goals = Goals {
        calorie_goal: calories.unwrap_or(current.calorie_goal),
        protein_goal: protein.unwrap_or(current.protein_goal),
        carb_goal: carbs.unwrap_or(current.carb_goal),
        fat_goal: fat.unwrap_or(current.fat_goal),
    };
    apply(svc, goals, json)
}

pub(crate) fn cmd_goals_split(
    svc: &mut Service,
    calories: i64,
    protein_pct: i64,
    carbs_pct: i64,
    fat_pct: i64,
    json: bool,
) -> Result<()> {
    let goals = Goals::from_calorie_split(calories, protein_pct, carbs_pct, fat_pct)?;
    apply(svc, goals, json)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_goals_wizard(
    svc: &mut Service,
    sex: &str,
    age: u32,
    height_cm: f64,
    weight_kg: f64,
    activity: &str,
    json: bool,
) -> Result<()> {
    let profile = BodyProfile {
        sex: Sex::parse(sex)?,
        age_years: age,
        height_cm,
        weight_kg,
        activity: ActivityLevel::parse(activity)?,
    };
    let goals = Goals::from_profile(&profile)?;
    if !json {
        let bmr = profile.bmr();
        let tdee = profile.maintenance_calories();
        println!("BMR: {bmr:.0} kcal  |  Maintenance: {tdee:.0} kcal");
    }
    apply(svc, goals, json)
}
