use std::collections::HashMap;
use thiserror::Error;

use crate::config::{FieldSpec, ModelConfig, ResourceConfig, ResourceKind, RouteConfig, Settings};
use crate::config::{FakerFieldConfig, FakerFieldType};
use crate::persistence::DatabaseBackend;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(database) = &settings.database {
            if let Err(e) = DatabaseBackend::from_url(&database.url) {
                errors.push(ValidationError::InvalidValue {
                    field: "database.url".to_string(),
                    reason: e.to_string(),
                });
            }
        }

        if let Err(e) = Self::validate_models(&settings.models) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_resources(&settings.resources) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_routes(&settings.routes) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_models(models: &[ModelConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();

        for (idx, model) in models.iter().enumerate() {
            if model.name.is_empty() {
                errors.push(ValidationError::MissingField(format!("models[{}].name", idx)));
            }

            if let Some(prev_idx) = seen_names.insert(&model.name, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Model '{}' appears at indices {} and {}",
                    model.name, prev_idx, idx
                )));
            }

            if matches!(&model.table, Some(table) if table.is_empty()) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("models[{}].table", idx),
                    reason: "Table name must not be empty".to_string(),
                });
            }

            if let Some(factory) = &model.factory {
                for (field, spec) in &factory.fields {
                    Self::validate_field(
                        &format!("models[{}].factory.fields.{}", idx, field),
                        spec,
                        &mut errors,
                    );
                }
                for (state, fields) in &factory.states {
                    for (field, spec) in fields {
                        Self::validate_field(
                            &format!("models[{}].factory.states.{}.{}", idx, state, field),
                            spec,
                            &mut errors,
                        );
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_field(path: &str, spec: &FieldSpec, errors: &mut Vec<ValidationError>) {
        let FieldSpec::Faker(config) = spec else {
            return;
        };
        let FakerFieldConfig { faker_type, min, max, pattern, enum_values, .. } = config;

        match faker_type {
            FakerFieldType::Integer | FakerFieldType::Float => {
                let (low, high) = (min.unwrap_or(0.0), max.unwrap_or(100.0));
                if !low.is_finite() || !high.is_finite() || !(high - low).is_finite() {
                    errors.push(ValidationError::InvalidValue {
                        field: path.to_string(),
                        reason: format!("range {}..={} is not finite", low, high),
                    });
                } else if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        errors.push(ValidationError::InvalidValue {
                            field: path.to_string(),
                            reason: format!("min ({}) is greater than max ({})", min, max),
                        });
                    }
                }
            }
            FakerFieldType::Pattern if pattern.is_none() => {
                errors.push(ValidationError::MissingField(format!("{}.pattern", path)));
            }
            FakerFieldType::Enum if enum_values.as_ref().map_or(true, |v| v.is_empty()) => {
                errors.push(ValidationError::MissingField(format!("{}.values", path)));
            }
            _ => {}
        }
    }

    fn validate_resources(resources: &[ResourceConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();

        for (idx, resource) in resources.iter().enumerate() {
            if resource.name.is_empty() {
                errors.push(ValidationError::MissingField(format!("resources[{}].name", idx)));
            }

            if let Some(prev_idx) = seen_names.insert(&resource.name, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Resource '{}' appears at indices {} and {}",
                    resource.name, prev_idx, idx
                )));
            }

            if !(100..=599).contains(&resource.status) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("resources[{}].status", idx),
                    reason: format!("{} is not an HTTP status code", resource.status),
                });
            }

            if resource.collects.is_some() && resource.kind != ResourceKind::Collection {
                errors.push(ValidationError::InvalidValue {
                    field: format!("resources[{}].collects", idx),
                    reason: "Only collection resources can collect another resource".to_string(),
                });
            }
        }

        // Cross-reference: `collects` must name an item resource
        for resource in resources {
            if let Some(collects) = &resource.collects {
                match resources.iter().find(|r| &r.name == collects) {
                    Some(target) if target.kind == ResourceKind::Item => {}
                    Some(_) => errors.push(ValidationError::CrossReference(format!(
                        "Resource '{}' collects '{}', which is not an item resource",
                        resource.name, collects
                    ))),
                    None => errors.push(ValidationError::CrossReference(format!(
                        "Resource '{}' collects unknown resource '{}'",
                        resource.name, collects
                    ))),
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_routes(routes: &[RouteConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (idx, route) in routes.iter().enumerate() {
            if route.uri.is_empty() {
                errors.push(ValidationError::MissingField(format!("routes[{}].uri", idx)));
            }
            if route.methods.is_empty() {
                errors.push(ValidationError::MissingField(format!("routes[{}].methods", idx)));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
