//! Product entity model with create and update validation

use crate::core::entity::{Entity, new_id};
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::query::Projection;
use crate::core::validation::validators::{non_blank, non_negative, number, string};
use crate::core::validation::{PatchRules, rule};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// A product offered for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Path reference of the uploaded image
    #[serde(rename = "productImage")]
    pub product_image: String,
}

impl Product {
    pub fn new(name: &str, price: f64, product_image: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            price,
            product_image: product_image.to_string(),
        }
    }

    /// Fields returned by reads
    pub fn projection() -> Projection {
        Projection::fields(&["name", "price", "productImage"])
    }

    /// Properties a `PATCH` may change
    pub fn patch_rules() -> PatchRules {
        PatchRules::new()
            .allow("name", vec![rule(string()), rule(non_blank())])
            .allow("price", vec![rule(number()), rule(non_negative())])
    }
}

impl Entity for Product {
    fn resource_name() -> &'static str {
        "products"
    }

    fn resource_name_singular() -> &'static str {
        "product"
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Text fields of the multipart create form
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreateProductForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

impl CreateProductForm {
    /// Parse and validate the form's text fields
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();

        let name = fields
            .get("name")
            .map(|n| n.trim().to_string())
            .unwrap_or_default();

        let price = match fields.get("price").map(|p| p.trim()) {
            None | Some("") => {
                errors.push(FieldValidationError {
                    field: "price".to_string(),
                    message: "price is required".to_string(),
                });
                0.0
            }
            Some(raw) => match raw.parse::<f64>() {
                Ok(price) if price.is_finite() => price,
                _ => {
                    errors.push(FieldValidationError {
                        field: "price".to_string(),
                        message: format!("price must be a number (got: {})", raw),
                    });
                    0.0
                }
            },
        };

        let form = Self { name, price };
        if let Err(invalid) = form.validate() {
            match ValidationError::from(invalid) {
                ValidationError::FieldErrors(rule_errors) => errors.extend(rule_errors),
                other => return Err(other),
            }
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            errors.dedup_by(|a, b| a.field == b.field);
            Err(ValidationError::FieldErrors(errors))
        }
    }
}
