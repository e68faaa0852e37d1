use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub mod error;

pub use error::{ExampleError, ExampleResult};

/// One `@name content` pair lifted out of a handler's doc block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTag {
    pub name: String,
    #[serde(alias = "content", default)]
    pub raw_content: String,
}

impl AnnotationTag {
    pub fn new(name: impl Into<String>, raw_content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_content: raw_content.into(),
        }
    }

    /// Tag names are matched case-insensitively.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The route being documented. Only used to label diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub methods: Vec<String>,
    pub uri: String,
}

impl Route {
    pub fn new(methods: &[&str], uri: impl Into<String>) -> Self {
        Self {
            methods: methods.iter().map(|m| m.to_string()).collect(),
            uri: uri.into(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.methods.join(","), self.uri)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Single,
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDirective {
    pub kind: DirectiveKind,
    pub explicit_status: Option<u16>,
    pub class_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDirective {
    pub type_ref: String,
    pub variation_states: Vec<String>,
}

/// A concrete model instance: the model's name plus its attribute values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInstance {
    pub model: String,
    pub attributes: Map<String, Value>,
}

impl ModelInstance {
    pub fn new(model: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            model: model.into(),
            attributes,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}

/// A model type known to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelType {
    pub name: String,
    /// Backing table. Models without one are never looked up in the store.
    #[serde(default)]
    pub table: Option<String>,
    /// Attribute values of a bare, argument-less instance.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

impl ModelType {
    pub fn is_persisted(&self) -> bool {
        self.table.is_some()
    }

    /// Construct the type with no arguments.
    pub fn instantiate(&self) -> ModelInstance {
        ModelInstance::new(self.name.clone(), self.defaults.clone())
    }
}

/// Which fallback tier produced a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Factory,
    Persisted,
    BareDefault,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Factory => "factory",
            Self::Persisted => "persisted",
            Self::BareDefault => "bare default",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub instance: ModelInstance,
    pub tier: ResolutionTier,
}

/// Status code and serialized body of a synthesized example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticResponse {
    status: u16,
    body: Bytes,
}

impl SyntheticResponse {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Wire shape handed back to the documentation generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub status: u16,
    pub content: String,
}

impl From<SyntheticResponse> for ExampleResponse {
    fn from(response: SyntheticResponse) -> Self {
        Self {
            status: response.status,
            content: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }
}

/// The request a transformer renders against. Examples are always rendered
/// for a plain framework-default request asking for JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub headers: BTreeMap<String, String>,
}

impl RequestContext {
    /// Whether the `accept` header admits a JSON body. A missing header
    /// accepts anything.
    pub fn accepts_json(&self) -> bool {
        let Some(accept) = self.headers.get("accept") else {
            return true;
        };
        accept.split(',').any(|range| {
            let media = range.split(';').next().unwrap_or("").trim();
            matches!(media, "*/*" | "application/*" | "application/json")
                || media.ends_with("+json")
        })
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        Self { headers }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Constructor argument shapes a transformer class may be given.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformerInput {
    One(ModelInstance),
    Many(Vec<ModelInstance>),
}

pub trait Render: Send + Sync {
    fn to_response(&self, request: &RequestContext) -> ExampleResult<RenderedResponse>;
}

/// A constructed transformer, tagged with the shape it was built as.
pub enum Transformer {
    Item(Box<dyn Render>),
    Collection(Box<dyn Render>),
}

impl Transformer {
    pub fn to_response(&self, request: &RequestContext) -> ExampleResult<RenderedResponse> {
        match self {
            Self::Item(render) | Self::Collection(render) => render.to_response(request),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(_) => f.write_str("Transformer::Item"),
            Self::Collection(_) => f.write_str("Transformer::Collection"),
        }
    }
}

/// A transformer type that can be constructed by name.
pub trait TransformerClass: Send + Sync {
    fn name(&self) -> &str;

    fn construct(&self, input: TransformerInput) -> ExampleResult<Transformer>;

    /// Static "wrap many" constructor. Only item-shaped classes offer one.
    fn wrap_many(&self, _items: Vec<ModelInstance>) -> Option<ExampleResult<Transformer>> {
        None
    }
}

/// A fixture factory for one model type.
pub trait Factory: Send {
    fn with_states(self: Box<Self>, states: &[String]) -> ExampleResult<Box<dyn Factory>>;

    /// Materialize one instance without persisting it.
    fn make(&self) -> ExampleResult<ModelInstance>;
}

pub trait FixtureFactories: Send + Sync {
    fn factory(&self, type_ref: &str) -> ExampleResult<Box<dyn Factory>>;
}

#[async_trait]
pub trait ModelStore: Send + Sync {
    /// First stored record of the given type, if any.
    async fn first(&self, model: &ModelType) -> ExampleResult<Option<ModelInstance>>;
}

/// Where the strategy reports warnings.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, message: &str);
}
