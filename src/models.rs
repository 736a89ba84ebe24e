//! # Recipe Data Model
//!
//! Documents as they are stored in the recipe collection. The bot never writes
//! recipes; these types are only deserialized from the store and rendered.
//!
//! ```rust
//! use recipe_bot::models::{Nutrition, Recipe};
//!
//! let omelette = Recipe::new("Omelette")
//!     .with_base_ingredients(["eggs", "milk"])
//!     .with_extra_ingredients(["salt"])
//!     .with_nutrition(Nutrition::new(154, 10.6, 11.7, 1.9));
//!
//! assert!(omelette.contains_all(["eggs"]));
//! ```

use mongodb::bson::oid::ObjectId;
use mongodb::bson::Bson;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Nutrition facts per serving
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub calories: i32,
    /// Grams of protein
    pub proteins: f64,
    /// Grams of fat
    pub fats: f64,
    /// Grams of carbohydrate
    pub carbs: f64,
}

impl Nutrition {
    pub fn new(calories: i32, proteins: f64, fats: f64, carbs: f64) -> Self {
        Self {
            calories,
            proteins,
            fats,
            carbs,
        }
    }
}

/// Accept any whole number the store may hold: Int32, Int64 or a Double with no fractional part
fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::Int32(value) => Ok(value),
        Bson::Int64(value) => i32::try_from(value)
            .map_err(|_| D::Error::custom(format!("{value} does not fit in i32"))),
        Bson::Double(value)
            if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) =>
        {
            Ok(value as i32)
        }
        other => Err(D::Error::custom(format!("expected a whole number, found {other}"))),
    }
}

/// One dish in the recipe collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,

    /// Ingredients the picker can filter on
    #[serde(default)]
    pub base_ingredients: Vec<String>,

    /// Ingredients shown in the detail view only
    #[serde(default)]
    pub extra_ingredients: Vec<String>,

    #[serde(rename = "cooking_procedure", default)]
    pub procedure: String,

    #[serde(default)]
    pub nutrition: Nutrition,
}

impl Recipe {
    /// Create a recipe with a fresh id and no ingredients
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            base_ingredients: Vec::new(),
            extra_ingredients: Vec::new(),
            procedure: String::new(),
            nutrition: Nutrition::default(),
        }
    }

    pub fn with_base_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = procedure.into();
        self
    }

    pub fn with_nutrition(mut self, nutrition: Nutrition) -> Self {
        self.nutrition = nutrition;
        self
    }

    /// Hex form of the id, as carried in callback tokens
    pub fn id_hex(&self) -> String {
        self.id.to_hex()
    }

    /// True when every requested name is one of the base ingredients (case-sensitive)
    pub fn contains_all<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .all(|name| self.base_ingredients.iter().any(|b| b == name.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document};

    #[test]
    fn test_deserialize_stored_document() {
        let id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "name": "Гречка с грибами",
            "base_ingredients": ["гречка", "грибы"],
            "extra_ingredients": ["лук"],
            "cooking_procedure": "Отварить гречку, обжарить грибы с луком, смешать.",
            "nutrition": { "calories": 320, "proteins": 11.5, "fats": 7.2, "carbs": 52.0 },
        };

        let recipe: Recipe = from_document(document).unwrap();
        assert_eq!(recipe.id, id);
        assert_eq!(recipe.base_ingredients, vec!["гречка", "грибы"]);
        assert_eq!(recipe.procedure, "Отварить гречку, обжарить грибы с луком, смешать.");
        assert_eq!(recipe.nutrition, Nutrition::new(320, 11.5, 7.2, 52.0));
    }

    #[test]
    fn test_whole_number_calories_in_any_numeric_type() {
        for calories in [Bson::Int32(320), Bson::Int64(320), Bson::Double(320.0)] {
            let document = doc! {
                "_id": ObjectId::new(),
                "name": "Сырники",
                "nutrition": { "calories": calories.clone(), "proteins": 11, "fats": 7.2, "carbs": 52.0 },
            };
            let recipe: Recipe = from_document(document).unwrap();
            assert_eq!(recipe.nutrition, Nutrition::new(320, 11.0, 7.2, 52.0), "{calories:?}");
        }
    }

    #[test]
    fn test_fractional_calories_rejected() {
        for calories in [Bson::Double(320.5), Bson::Int64(i64::MAX), Bson::String("320".into())] {
            let document = doc! {
                "_id": ObjectId::new(),
                "name": "Сырники",
                "nutrition": { "calories": calories.clone(), "proteins": 11.0, "fats": 7.2, "carbs": 52.0 },
            };
            assert!(from_document::<Recipe>(document).is_err(), "{calories:?}");
        }
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let document = doc! { "_id": ObjectId::new(), "name": "Water" };
        let recipe: Recipe = from_document(document).unwrap();
        assert!(recipe.base_ingredients.is_empty());
        assert!(recipe.extra_ingredients.is_empty());
        assert_eq!(recipe.nutrition, Nutrition::default());
    }

    #[test]
    fn test_contains_all_is_superset_check() {
        let recipe = Recipe::new("Pancakes").with_base_ingredients(["eggs", "milk", "flour"]);
        assert!(recipe.contains_all(["eggs", "milk"]));
        assert!(recipe.contains_all(Vec::<String>::new()));
        assert!(!recipe.contains_all(["eggs", "butter"]));
        assert!(!recipe.contains_all(["Eggs"]));
    }
}
