use crate::config::{FakerFieldConfig, FakerFieldType, FieldSpec, ModelConfig};
use crate::domain::{ExampleError, ExampleResult, Factory, FixtureFactories, ModelInstance};
use fake::faker::address::en::{CityName, CountryName, PostCode, StateAbbr, StreetName};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

struct FactoryDefinition {
    model: String,
    defaults: Map<String, Value>,
    fields: BTreeMap<String, FieldSpec>,
    states: HashMap<String, BTreeMap<String, FieldSpec>>,
}

/// Registry of faker-backed fixture factories, keyed by model name.
#[derive(Default)]
pub struct FakerFactories {
    definitions: HashMap<String, Arc<FactoryDefinition>>,
}

impl FakerFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for every model that defines one.
    pub fn from_models(models: &[ModelConfig]) -> Self {
        let definitions = models
            .iter()
            .filter_map(|model| {
                let factory = model.factory.as_ref()?;
                let definition = FactoryDefinition {
                    model: model.name.clone(),
                    defaults: model.defaults.clone(),
                    fields: factory.fields.clone(),
                    states: factory.states.clone(),
                };
                Some((model.name.clone(), Arc::new(definition)))
            })
            .collect();
        Self { definitions }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FixtureFactories for FakerFactories {
    fn factory(&self, type_ref: &str) -> ExampleResult<Box<dyn Factory>> {
        let definition = self
            .definitions
            .get(type_ref)
            .ok_or_else(|| ExampleError::UnknownFactory(type_ref.to_string()))?;
        Ok(Box::new(FakerFactory {
            definition: definition.clone(),
            states: Vec::new(),
        }))
    }
}

/// One model's factory with the states applied so far.
pub struct FakerFactory {
    definition: Arc<FactoryDefinition>,
    states: Vec<String>,
}

impl Factory for FakerFactory {
    fn with_states(mut self: Box<Self>, states: &[String]) -> ExampleResult<Box<dyn Factory>> {
        for state in states {
            if !self.definition.states.contains_key(state) {
                return Err(ExampleError::UnknownState {
                    model: self.definition.model.clone(),
                    state: state.clone(),
                });
            }
            self.states.push(state.clone());
        }
        Ok(self)
    }

    fn make(&self) -> ExampleResult<ModelInstance> {
        let definition = &self.definition;
        let mut attributes = definition.defaults.clone();

        for (field, spec) in &definition.fields {
            attributes.insert(field.clone(), generate_field(spec)?);
        }

        // States apply in the order they were requested; later ones win.
        for state in &self.states {
            if let Some(overrides) = definition.states.get(state) {
                for (field, spec) in overrides {
                    attributes.insert(field.clone(), generate_field(spec)?);
                }
            }
        }

        Ok(ModelInstance::new(definition.model.clone(), attributes))
    }
}

fn generate_field(spec: &FieldSpec) -> ExampleResult<Value> {
    match spec {
        FieldSpec::Literal(value) => Ok(value.clone()),
        FieldSpec::Faker(config) => generate_faker_value(config),
    }
}

/// Generate a single faker value based on field configuration
pub fn generate_faker_value(config: &FakerFieldConfig) -> ExampleResult<Value> {
    match config.faker_type {
        // Personal
        FakerFieldType::FirstName => Ok(json!(FirstName().fake::<String>())),
        FakerFieldType::LastName => Ok(json!(LastName().fake::<String>())),
        FakerFieldType::FullName => Ok(json!(Name().fake::<String>())),
        FakerFieldType::Username => Ok(json!(Username().fake::<String>())),

        // Contact
        FakerFieldType::Email => Ok(json!(SafeEmail().fake::<String>())),
        FakerFieldType::Phone => Ok(json!(PhoneNumber().fake::<String>())),

        // Address
        FakerFieldType::StreetAddress => Ok(json!(StreetName().fake::<String>())),
        FakerFieldType::City => Ok(json!(CityName().fake::<String>())),
        FakerFieldType::State => Ok(json!(StateAbbr().fake::<String>())),
        FakerFieldType::Country => Ok(json!(CountryName().fake::<String>())),
        FakerFieldType::PostalCode => Ok(json!(PostCode().fake::<String>())),

        // Text
        FakerFieldType::Word => Ok(json!(Word().fake::<String>())),
        FakerFieldType::Sentence => Ok(json!(Sentence(1..10).fake::<String>())),
        FakerFieldType::Paragraph => Ok(json!(Paragraph(1..3).fake::<String>())),
        FakerFieldType::Lorem => Ok(json!(Sentence(1..5).fake::<String>())),

        // Numbers
        FakerFieldType::Integer => {
            let (min, max) = bounds(config, "integer")?;
            Ok(json!(rand::thread_rng().gen_range(min as i64..=max as i64)))
        }
        FakerFieldType::Float => {
            let (min, max) = bounds(config, "float")?;
            Ok(json!(rand::thread_rng().gen_range(min..=max)))
        }
        FakerFieldType::Boolean => Ok(json!(rand::thread_rng().gen_bool(0.5))),

        // Identifiers and time
        FakerFieldType::Uuid => Ok(json!(uuid::Uuid::new_v4().to_string())),
        FakerFieldType::DateTime => {
            let days_ago = rand::thread_rng().gen_range(0..365);
            let at = chrono::Utc::now() - chrono::Duration::days(days_ago);
            Ok(json!(at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)))
        }

        // Special
        FakerFieldType::Pattern => {
            let pattern = config
                .pattern
                .as_deref()
                .ok_or_else(|| ExampleError::Factory("pattern field has no pattern".to_string()))?;
            Ok(json!(generate_from_pattern(pattern)))
        }
        FakerFieldType::Enum => {
            let values = config
                .enum_values
                .as_deref()
                .filter(|values| !values.is_empty())
                .ok_or_else(|| ExampleError::Factory("enum field has no values".to_string()))?;
            let idx = rand::thread_rng().gen_range(0..values.len());
            Ok(values[idx].clone())
        }
        FakerFieldType::Constant => Ok(config.constant.clone().unwrap_or(Value::Null)),
    }
}

/// Range of a numeric field, defaulting to `0..=100`.
///
/// Bounds must be finite with a finite span, or sampling panics.
fn bounds(config: &FakerFieldConfig, kind: &str) -> ExampleResult<(f64, f64)> {
    let min = config.min.unwrap_or(0.0);
    let max = config.max.unwrap_or(100.0);
    if !min.is_finite() || !max.is_finite() || !(max - min).is_finite() {
        return Err(ExampleError::Factory(format!(
            "{} range {}..={} is not finite",
            kind, min, max
        )));
    }
    if min > max {
        return Err(ExampleError::Factory(format!(
            "{} range {}..={} is empty",
            kind, min, max
        )));
    }
    Ok((min, max))
}

/// `#` becomes a digit, `?` a lowercase letter, `*` either; other characters are kept.
fn generate_from_pattern(pattern: &str) -> String {
    let mut result = String::new();
    let mut rng = rand::thread_rng();

    for c in pattern.chars() {
        match c {
            '#' => result.push_str(&rng.gen_range(0..10).to_string()),
            '?' => result.push(rng.gen_range(b'a'..=b'z') as char),
            '*' => {
                if rng.gen_bool(0.5) {
                    result.push_str(&rng.gen_range(0..10).to_string())
                } else {
                    result.push(rng.gen_range(b'a'..=b'z') as char)
                }
            }
            _ => result.push(c),
        }
    }
    result
}
