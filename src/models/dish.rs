use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UnknownVariant;

/// Placeholder image used when a dish is created without an upload.
pub const DEFAULT_IMAGE_URL: &str = "/images/default-dish.jpg";

#[derive(Debug, Clone)]
pub struct Dish {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: DishCategory,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed set of menu categories. The wire and storage form of
/// `MainCourse` is the two-word `"Main Course"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DishCategory {
    Appetizer,
    #[serde(rename = "Main Course")]
    MainCourse,
    Dessert,
    Beverage,
}

impl DishCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishCategory::Appetizer => "Appetizer",
            DishCategory::MainCourse => "Main Course",
            DishCategory::Dessert => "Dessert",
            DishCategory::Beverage => "Beverage",
        }
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DishCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Appetizer" => Ok(DishCategory::Appetizer),
            "Main Course" => Ok(DishCategory::MainCourse),
            "Dessert" => Ok(DishCategory::Dessert),
            "Beverage" => Ok(DishCategory::Beverage),
            other => Err(UnknownVariant {
                field: "category",
                value: other.to_owned(),
            }),
        }
    }
}

/// A fully validated dish record, ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: DishCategory,
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_round_trip_through_their_storage_form() {
        for category in [
            DishCategory::Appetizer,
            DishCategory::MainCourse,
            DishCategory::Dessert,
            DishCategory::Beverage,
        ] {
            assert_eq!(category.as_str().parse::<DishCategory>().unwrap(), category);
        }
    }

    #[test]
    fn main_course_uses_the_two_word_form() {
        assert_eq!(DishCategory::MainCourse.as_str(), "Main Course");
        assert!("MainCourse".parse::<DishCategory>().is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("Side".parse::<DishCategory>().is_err());
    }
}
