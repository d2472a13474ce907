use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::dish::DEFAULT_IMAGE_URL;
use crate::models::{Dish, DishCategory, NewDish};

/// Raw dish fields as they arrive from the multipart form. Everything is
/// optional here; `validate` collects every constraint violation so the
/// client sees all of them at once.
#[derive(Debug, Default, Clone, ToSchema)]
pub struct DishPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

impl DishPayload {
    /// Builds a payload from the text fields of a multipart form. Values
    /// that fail to parse are treated as absent and picked up by
    /// `validate` (price) or the schema default (isAvailable).
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            name: fields
                .get("name")
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            description: fields.get("description").cloned(),
            price: fields.get("price").and_then(|s| s.trim().parse().ok()),
            category: fields.get("category").cloned(),
            is_available: fields
                .get("isAvailable")
                .and_then(|s| s.trim().parse().ok()),
            image_url: None,
        }
    }

    /// Fills every absent field from an existing record, so partial
    /// updates re-run the full set of validators over the merged result.
    pub fn or_existing(mut self, dish: &Dish) -> Self {
        self.name = self.name.or_else(|| Some(dish.name.clone()));
        self.description = self.description.or_else(|| dish.description.clone());
        self.price = self.price.or(Some(dish.price));
        self.category = self
            .category
            .or_else(|| Some(dish.category.as_str().to_owned()));
        self.is_available = self.is_available.or(Some(dish.is_available));
        self.image_url = self.image_url.or_else(|| Some(dish.image_url.clone()));
        self
    }

    pub fn validate(self) -> Result<NewDish, Vec<String>> {
        let mut messages = Vec::new();

        let name = match self.name {
            Some(name) => Some(name),
            None => {
                messages.push("Dish name is required.".to_owned());
                None
            }
        };
        let price = match self.price {
            Some(price) if price >= 0.0 => Some(price),
            _ => {
                messages.push("Price must be a positive number.".to_owned());
                None
            }
        };
        let category = match self.category.as_deref().map(str::parse::<DishCategory>) {
            Some(Ok(category)) => Some(category),
            _ => {
                messages.push("Invalid dish category.".to_owned());
                None
            }
        };

        match (name, price, category) {
            (Some(name), Some(price), Some(category)) if messages.is_empty() => Ok(NewDish {
                name,
                image_url: self
                    .image_url
                    .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_owned()),
                description: self.description,
                price,
                category,
                is_available: self.is_available.unwrap_or(true),
            }),
            _ => Err(messages),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: DishCategory,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            image_url: dish.image_url,
            description: dish.description,
            price: dish.price,
            category: dish.category,
            is_available: dish.is_available,
            created_at: dish.created_at.to_rfc3339(),
            updated_at: dish.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn valid_payload_gets_schema_defaults() {
        let payload = DishPayload::from_fields(&fields(&[
            ("name", "Bruschetta"),
            ("price", "7.5"),
            ("category", "Appetizer"),
        ]));
        let dish = payload.validate().unwrap();
        assert_eq!(dish.name, "Bruschetta");
        assert_eq!(dish.image_url, DEFAULT_IMAGE_URL);
        assert!(dish.is_available);
        assert_eq!(dish.description, None);
    }

    #[test]
    fn derived_image_url_overrides_the_default() {
        let mut payload = DishPayload::from_fields(&fields(&[
            ("name", "Tiramisu"),
            ("price", "6"),
            ("category", "Dessert"),
        ]));
        payload.image_url = Some("/uploads/123-tiramisu.jpg".to_owned());
        let dish = payload.validate().unwrap();
        assert_eq!(dish.image_url, "/uploads/123-tiramisu.jpg");
    }

    #[test]
    fn negative_price_and_missing_category_collect_both_messages() {
        let payload =
            DishPayload::from_fields(&fields(&[("name", "Espresso"), ("price", "-1")]));
        let messages = payload.validate().unwrap_err();
        assert_eq!(
            messages,
            vec![
                "Price must be a positive number.".to_owned(),
                "Invalid dish category.".to_owned(),
            ]
        );
    }

    #[test]
    fn missing_name_is_reported() {
        let payload =
            DishPayload::from_fields(&fields(&[("price", "3"), ("category", "Beverage")]));
        let messages = payload.validate().unwrap_err();
        assert_eq!(messages, vec!["Dish name is required.".to_owned()]);
    }

    #[test]
    fn unparseable_price_counts_as_missing() {
        let payload = DishPayload::from_fields(&fields(&[
            ("name", "Soup"),
            ("price", "cheap"),
            ("category", "Appetizer"),
        ]));
        let messages = payload.validate().unwrap_err();
        assert_eq!(messages, vec!["Price must be a positive number.".to_owned()]);
    }

    #[test]
    fn merge_with_existing_keeps_unchanged_fields() {
        let existing = Dish {
            id: 1,
            name: "Lasagna".to_owned(),
            image_url: "/uploads/1-lasagna.jpg".to_owned(),
            description: Some("House classic".to_owned()),
            price: 14.0,
            category: DishCategory::MainCourse,
            is_available: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let payload = DishPayload::from_fields(&fields(&[("price", "15.5")]));
        let merged = payload.or_existing(&existing).validate().unwrap();
        assert_eq!(merged.name, "Lasagna");
        assert_eq!(merged.price, 15.5);
        assert_eq!(merged.category, DishCategory::MainCourse);
        assert!(!merged.is_available);
        assert_eq!(merged.image_url, "/uploads/1-lasagna.jpg");
    }
}
