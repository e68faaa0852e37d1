use config::{Config, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

pub mod validator;

use crate::cli::Cli;
use crate::domain::{AnnotationTag, ModelType, Route};
use crate::persistence::PersistenceConfig;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub strategy: StrategySettings,
    /// Database holding persisted model records, if any
    #[serde(default)]
    pub database: Option<PersistenceConfig>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Options read once at start-up and never changed during a run.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct StrategySettings {
    /// Emit full error detail instead of a one-line hint
    #[serde(default)]
    pub verbose: bool,
}

/// A model type, its bare defaults and its optional fixture factory
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    pub name: String,
    /// Table backing the model; omit for models that are never stored
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub defaults: Map<String, Value>,
    #[serde(default)]
    pub factory: Option<FactoryConfig>,
}

impl ModelConfig {
    pub fn model_type(&self) -> ModelType {
        ModelType {
            name: self.name.clone(),
            table: self.table.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

/// Faker-driven fixture factory definition
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct FactoryConfig {
    /// Generated attributes, applied over the model defaults
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
    /// Named variations, each overriding a subset of fields
    #[serde(default)]
    pub states: HashMap<String, BTreeMap<String, FieldSpec>>,
}

/// A factory field: either a faker generator or a literal value
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Faker(FakerFieldConfig),
    Literal(Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FakerFieldConfig {
    #[serde(rename = "faker")]
    pub faker_type: FakerFieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// `#` digit, `?` letter, `*` either
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, rename = "values", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FakerFieldType {
    // Personal
    FirstName,
    LastName,
    FullName,
    Username,
    // Contact
    Email,
    Phone,
    // Address
    StreetAddress,
    City,
    State,
    Country,
    PostalCode,
    // Text
    Word,
    Sentence,
    Paragraph,
    Lorem,
    // Numbers
    Integer,
    Float,
    Boolean,
    // Identifiers and time
    Uuid,
    DateTime,
    // Special
    Pattern,
    Enum,
    Constant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Item,
    Collection,
}

/// A transformer class, addressed by `name` from `@apiResource` directives
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ResourceKind,
    /// Attributes to expose; all of them when omitted
    #[serde(default)]
    pub fields: Option<Vec<FieldMapping>>,
    /// Key the payload is wrapped in; `null` disables wrapping
    #[serde(default = "default_wrap")]
    pub wrap: Option<String>,
    #[serde(default = "default_status")]
    pub status: u16,
    /// Item resource used to render each element of a collection
    #[serde(default)]
    pub collects: Option<String>,
    /// Extra top-level members merged into wrapped payloads
    #[serde(default)]
    pub additional: Map<String, Value>,
}

fn default_wrap() -> Option<String> {
    Some("data".to_string())
}

fn default_status() -> u16 {
    200
}

/// Either `name` or `{ source, output }` for a renamed attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldMapping {
    Same(String),
    Renamed { source: String, output: String },
}

impl FieldMapping {
    pub fn source(&self) -> &str {
        match self {
            Self::Same(name) => name,
            Self::Renamed { source, .. } => source,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            Self::Same(name) => name,
            Self::Renamed { output, .. } => output,
        }
    }
}

/// A documented route and the tags parsed from its handler's doc block
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouteConfig {
    pub methods: Vec<String>,
    pub uri: String,
    #[serde(default)]
    pub tags: Vec<AnnotationTag>,
}

impl RouteConfig {
    pub fn route(&self) -> Route {
        Route {
            methods: self.methods.clone(),
            uri: self.uri.clone(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(".");

        let s = Config::builder()
            .add_source(File::from(config_path.clone()).required(false))
            .set_default("strategy.verbose", false)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.load_external_configs(root)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.verbose {
            self.strategy.verbose = true;
        }
        if let Some(url) = &cli.database_url {
            let database = self.database.get_or_insert_with(PersistenceConfig::default);
            database.url = url.clone();
        }
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("exemplar");
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("strategy.verbose", false)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        settings.load_external_configs(root)?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn load_external_configs(&mut self, root: &str) -> Result<(), anyhow::Error> {
        self.models
            .extend(load_from_dir::<ModelConfig>(&format!("{}/config/models", root))?);
        self.resources
            .extend(load_from_dir::<ResourceConfig>(&format!("{}/config/resources", root))?);
        self.routes
            .extend(load_from_dir::<RouteConfig>(&format!("{}/config/routes", root))?);
        Ok(())
    }

    /// Model catalog entries for every configured model
    pub fn model_types(&self) -> Vec<ModelType> {
        self.models.iter().map(ModelConfig::model_type).collect()
    }

    /// Find a configured route by URI
    pub fn route(&self, uri: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|r| r.uri == uri)
    }
}

/// Read every JSON, YAML or TOML file in `path` as one `T`.
fn load_from_dir<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, anyhow::Error> {
    let pattern = format!("{}/*", path);
    let mut items = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => {
                if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    if matches!(ext, "json" | "yaml" | "yml" | "toml") {
                        let content = std::fs::read_to_string(&path)?;
                        let item: T = match ext {
                            "json" => serde_json::from_str(&content)?,
                            "toml" => toml::from_str(&content)?,
                            _ => serde_yaml::from_str(&content)?,
                        };
                        items.push(item);
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
        }
    }
    Ok(items)
}
