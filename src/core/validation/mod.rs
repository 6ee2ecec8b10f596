//! Validation of partial updates
//!
//! A `PATCH` body is a list of `{ "propName": …, "value": … }` operations.
//! [`PatchRules`] declares which properties may be changed and which
//! validators each value must pass, then folds the operations into the
//! field map handed to the store. When a property is listed twice the
//! last operation wins.

pub mod validators;

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::query::Document;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// One `{ propName, value }` entry of a partial update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchOperation {
    #[serde(rename = "propName")]
    pub prop_name: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn new(prop_name: &str, value: Value) -> Self {
        Self {
            prop_name: prop_name.to_string(),
            value,
        }
    }
}

/// Type-erased field validator
pub type FieldValidator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Allow-list of updatable properties with their validators
#[derive(Clone, Default)]
pub struct PatchRules {
    fields: IndexMap<String, Vec<FieldValidator>>,
}

impl PatchRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `name` to be updated, subject to `validators`
    pub fn allow(mut self, name: &str, validators: Vec<FieldValidator>) -> Self {
        self.fields.insert(name.to_string(), validators);
        self
    }

    /// Properties that may be updated, in declaration order
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fold `operations` into a field map, rejecting anything off the list
    ///
    /// Every offending operation is reported, not only the first one.
    pub fn fold(&self, operations: Vec<PatchOperation>) -> Result<Document, ValidationError> {
        if operations.is_empty() {
            return Err(ValidationError::InvalidBody {
                message: "expected at least one update operation".to_string(),
            });
        }

        let mut fields = Document::new();
        let mut errors = Vec::new();

        for op in operations {
            let Some(validators) = self.fields.get(&op.prop_name) else {
                errors.push(FieldValidationError {
                    field: op.prop_name.clone(),
                    message: format!(
                        "'{}' cannot be updated (allowed: {})",
                        op.prop_name,
                        self.allowed().collect::<Vec<_>>().join(", ")
                    ),
                });
                continue;
            };

            match validators
                .iter()
                .try_for_each(|validate| validate(&op.prop_name, &op.value))
            {
                Ok(()) => {
                    fields.insert(op.prop_name, op.value);
                }
                Err(message) => errors.push(FieldValidationError {
                    field: op.prop_name,
                    message,
                }),
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}

/// Wrap a validator so it can be stored in [`PatchRules`]
pub fn rule<F>(validator: F) -> FieldValidator
where
    F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
{
    Arc::new(validator)
}
