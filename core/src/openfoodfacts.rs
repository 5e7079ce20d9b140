use serde::Deserialize;

use crate::models::{FoodItem, Macros, ServingUnit};

#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub status: i32,
    pub product: Option<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub nutriments: Option<Nutriments>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Nutriments {
    #[serde(rename = "energy-kcal_100g")]
    pub energy_kcal_100g: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub fat_100g: Option<f64>,
}

/// Per-100 g catalog item from a product document. `None` without a name or calories.
#[must_use]
pub fn product_to_food(p: ProductData) -> Option<FoodItem> {
    let name = p.product_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
    let nutriments = p.nutriments?;
    let calories = nutriments.energy_kcal_100g.filter(|c| c.is_finite() && *c >= 0.0)?;

    // "Acme, Acme Foods" lists several brands; the first is enough
    let brand = p
        .brands
        .as_deref()
        .and_then(|b| b.split(',').next())
        .map(str::trim)
        .filter(|b| !b.is_empty());
    let name = match brand {
        Some(brand) => format!("{name} ({brand})"),
        None => name,
    };

    let grams = |v: Option<f64>| v.filter(|g| g.is_finite() && *g >= 0.0).unwrap_or(0.0);
    Some(FoodItem::new(
        &name,
        100,
        1,
        ServingUnit::Grams,
        Macros::new(
            calories.round() as i64,
            grams(nutriments.proteins_100g),
            grams(nutriments.carbohydrates_100g),
            grams(nutriments.fat_100g),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_product() -> ProductData {
        ProductData {
            product_name: Some("Hazelnut Spread".to_string()),
            brands: Some("Ferrero, Nutella".to_string()),
            nutriments: Some(Nutriments {
                energy_kcal_100g: Some(539.4),
                proteins_100g: Some(6.3),
                carbohydrates_100g: Some(57.5),
                fat_100g: Some(30.9),
            }),
        }
    }

    #[test]
    fn test_product_to_food_complete() {
        let food = product_to_food(full_product()).unwrap();
        assert_eq!(food.name, "Hazelnut Spread (Ferrero)");
        assert_eq!(food.weight_in_grams, 100);
        assert_eq!(food.servings, 1);
        assert_eq!(food.macros.calories, 539);
        assert!((food.macros.protein - 6.3).abs() < 0.01);
        assert!((food.macros.carbs - 57.5).abs() < 0.01);
        assert!((food.macros.fats - 30.9).abs() < 0.01);
        assert!(!food.is_meal);
    }

    #[test]
    fn test_product_to_food_missing_name() {
        let mut p = full_product();
        p.product_name = None;
        assert!(product_to_food(p).is_none());

        let mut p2 = full_product();
        p2.product_name = Some("  ".to_string());
        assert!(product_to_food(p2).is_none());
    }

    #[test]
    fn test_product_to_food_missing_calories() {
        let mut p = full_product();
        p.nutriments.as_mut().unwrap().energy_kcal_100g = None;
        assert!(product_to_food(p).is_none());

        let mut p2 = full_product();
        p2.nutriments = None;
        assert!(product_to_food(p2).is_none());
    }

    #[test]
    fn test_product_to_food_minimal() {
        let p = ProductData {
            product_name: Some("Plain Oats".to_string()),
            brands: Some(String::new()),
            nutriments: Some(Nutriments {
                energy_kcal_100g: Some(389.0),
                proteins_100g: None,
                carbohydrates_100g: None,
                fat_100g: None,
            }),
        };
        let food = product_to_food(p).unwrap();
        assert_eq!(food.name, "Plain Oats");
        assert_eq!(food.macros, Macros::new(389, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_decode_product_response() {
        let json = r#"{"status":1,"product":{"product_name":"Skyr","brands":"Siggi's",
            "nutriments":{"energy-kcal_100g":63,"proteins_100g":11}}}"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, 1);
        let food = product_to_food(resp.product.unwrap()).unwrap();
        assert_eq!(food.name, "Skyr (Siggi's)");
        assert_eq!(food.macros.calories, 63);
    }
}
