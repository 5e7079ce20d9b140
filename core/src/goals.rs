use anyhow::{Result, bail};
use serde::Serialize;

use crate::models::{Goals, Macros, validate_macro_split};

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const PROTEIN_G_PER_KG: f64 = 2.0;
const FAT_SHARE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => bail!("Invalid sex '{s}'. Use male or female"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly active" => Ok(ActivityLevel::Light),
            "moderate" | "moderately active" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very active" | "veryactive" => Ok(ActivityLevel::VeryActive),
            _ => bail!(
                "Invalid activity level '{s}'. Use sedentary, light, moderate, active, or very-active"
            ),
        }
    }

    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProfile {
    pub sex: Sex,
    pub age_years: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
}

impl BodyProfile {
    /// Mifflin-St Jeor basal metabolic rate in kcal/day.
    #[must_use]
    pub fn bmr(&self) -> f64 {
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age_years);
        match self.sex {
            Sex::Male => base + 5.0,
            Sex::Female => base - 161.0,
        }
    }

    #[must_use]
    pub fn maintenance_calories(&self) -> f64 {
        self.bmr() * self.activity.factor()
    }
}

impl Goals {
    /// Gram targets from a calorie goal and a percentage split summing to 100.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_calorie_split(
        calories: i64,
        protein_pct: i64,
        carbs_pct: i64,
        fat_pct: i64,
    ) -> Result<Goals> {
        if calories <= 0 {
            bail!("Calorie goal must be greater than 0");
        }
        validate_macro_split(protein_pct, carbs_pct, fat_pct)?;
        let kcal = calories as f64;
        Ok(Goals {
            calorie_goal: calories,
            protein_goal: kcal * protein_pct as f64 / 100.0 / KCAL_PER_G_PROTEIN,
            carb_goal: kcal * carbs_pct as f64 / 100.0 / KCAL_PER_G_CARBS,
            fat_goal: kcal * fat_pct as f64 / 100.0 / KCAL_PER_G_FAT,
        })
    }

    /// Maintenance estimate: 2 g protein per kg, a quarter of calories from fat,
    /// the rest from carbs.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_profile(profile: &BodyProfile) -> Result<Goals> {
        if !(profile.weight_kg.is_finite() && profile.weight_kg > 0.0) {
            bail!("Weight must be greater than 0");
        }
        if !(profile.height_cm.is_finite() && profile.height_cm > 0.0) {
            bail!("Height must be greater than 0");
        }
        if profile.age_years == 0 {
            bail!("Age must be greater than 0");
        }
        let calories = profile.maintenance_calories().trunc().max(0.0) as i64;
        let kcal = calories as f64;
        let protein = PROTEIN_G_PER_KG * profile.weight_kg;
        let fat = kcal * FAT_SHARE / KCAL_PER_G_FAT;
        let carbs =
            ((kcal - protein * KCAL_PER_G_PROTEIN - fat * KCAL_PER_G_FAT) / KCAL_PER_G_CARBS).max(0.0);
        Ok(Goals {
            calorie_goal: calories,
            protein_goal: protein,
            carb_goal: carbs,
            fat_goal: fat,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacroProgress {
    pub consumed: f64,
    pub goal: f64,
    /// Negative once the goal is exceeded.
    pub remaining: f64,
    /// `consumed / goal`, or 0 when no goal is set.
    pub fraction: f64,
}

impl MacroProgress {
    #[must_use]
    pub fn new(consumed: f64, goal: f64) -> Self {
        Self {
            consumed,
            goal,
            remaining: goal - consumed,
            fraction: if goal > 0.0 { consumed / goal } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GoalProgress {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fats: MacroProgress,
}

impl GoalProgress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(totals: &Macros, goals: &Goals) -> Self {
        Self {
            calories: MacroProgress::new(totals.calories as f64, goals.calorie_goal as f64),
            protein: MacroProgress::new(totals.protein, goals.protein_goal),
            carbs: MacroProgress::new(totals.carbs, goals.carb_goal),
            fats: MacroProgress::new(totals.fats, goals.fat_goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(sex: Sex) -> BodyProfile {
        BodyProfile {
            sex,
            age_years: 30,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity: ActivityLevel::Moderate,
        }
    }

    #[test]
    fn test_bmr_mifflin_st_jeor() {
        // 800 + 1125 - 150 = 1775, then +5 or -161
        assert!((profile(Sex::Male).bmr() - 1780.0).abs() < 0.01);
        assert!((profile(Sex::Female).bmr() - 1614.0).abs() < 0.01);
    }

    #[test]
    fn test_from_profile() {
        let goals = Goals::from_profile(&profile(Sex::Male)).unwrap();
        // 1780 * 1.55 = 2759
        assert_eq!(goals.calorie_goal, 2759);
        assert!((goals.protein_goal - 160.0).abs() < 0.01);
        assert!((goals.fat_goal - 2759.0 * 0.25 / 9.0).abs() < 0.01);
        let carb_kcal = 2759.0 - 160.0 * 4.0 - goals.fat_goal * 9.0;
        assert!((goals.carb_goal - carb_kcal / 4.0).abs() < 0.01);
    }

    #[test]
    fn test_from_profile_rejects_bad_input() {
        let mut p = profile(Sex::Female);
        p.weight_kg = 0.0;
        assert!(Goals::from_profile(&p).is_err());
        let mut p = profile(Sex::Female);
        p.age_years = 0;
        assert!(Goals::from_profile(&p).is_err());
    }

    #[test]
    fn test_carbs_floor_at_zero() {
        let p = BodyProfile {
            sex: Sex::Female,
            age_years: 80,
            height_cm: 150.0,
            weight_kg: 150.0,
            activity: ActivityLevel::Sedentary,
        };
        let goals = Goals::from_profile(&p).unwrap();
        assert!(goals.carb_goal >= 0.0);
    }

    #[test]
    fn test_from_calorie_split() {
        let goals = Goals::from_calorie_split(2000, 30, 40, 30).unwrap();
        assert_eq!(goals.calorie_goal, 2000);
        assert!((goals.protein_goal - 150.0).abs() < 0.01);
        assert!((goals.carb_goal - 200.0).abs() < 0.01);
        assert!((goals.fat_goal - 66.67).abs() < 0.01);

        assert!(Goals::from_calorie_split(2000, 30, 40, 20).is_err());
        assert!(Goals::from_calorie_split(0, 30, 40, 30).is_err());
    }

    #[test]
    fn test_progress() {
        let goals = Goals {
            calorie_goal: 2000,
            protein_goal: 100.0,
            carb_goal: 0.0,
            fat_goal: 50.0,
        };
        let totals = Macros::new(500, 120.0, 30.0, 25.0);
        let progress = GoalProgress::compute(&totals, &goals);

        assert!((progress.calories.fraction - 0.25).abs() < 0.01);
        assert!((progress.calories.remaining - 1500.0).abs() < 0.01);
        assert!((progress.protein.remaining + 20.0).abs() < 0.01);
        assert_eq!(progress.carbs.fraction, 0.0);
        assert!((progress.fats.fraction - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(ActivityLevel::parse("very-active").unwrap(), ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::parse("Light").unwrap(), ActivityLevel::Light);
        assert!(ActivityLevel::parse("couch").is_err());
        assert_eq!(Sex::parse("F").unwrap(), Sex::Female);
    }
}
