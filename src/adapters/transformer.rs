//! Configurable resource transformers.
//!
//! Two class shapes exist, mirroring the two ways JSON APIs usually expose
//! lists:
//!
//! - an *item* resource ([`JsonResource`]) accepts exactly one model and offers a
//!   static `wrap_many` constructor producing an anonymous collection;
//! - a *collection* resource ([`ResourceCollection`]) only accepts a list of
//!   models and renders each element through its `collects` item resource.

use crate::config::{ResourceConfig, ResourceKind};
use crate::domain::{
    ExampleError, ExampleResult, ModelInstance, RenderedResponse, Render, RequestContext,
    Transformer, TransformerClass, TransformerInput,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Transformer classes addressable by name.
#[derive(Default, Clone)]
pub struct TransformerRegistry {
    classes: HashMap<String, Arc<dyn TransformerClass>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a class for every configured resource.
    pub fn from_resources(resources: &[ResourceConfig]) -> ExampleResult<Self> {
        let definitions: HashMap<&str, Arc<ResourceConfig>> = resources
            .iter()
            .map(|r| (r.name.as_str(), Arc::new(r.clone())))
            .collect();

        let mut registry = Self::new();
        for resource in resources {
            let definition = definitions[resource.name.as_str()].clone();
            match resource.kind {
                ResourceKind::Item => registry.register(Arc::new(JsonResource::new(definition))),
                ResourceKind::Collection => {
                    let collects = match &resource.collects {
                        Some(name) => Some(
                            definitions
                                .get(name.as_str())
                                .cloned()
                                .ok_or_else(|| ExampleError::UnresolvedType(name.clone()))?,
                        ),
                        None => None,
                    };
                    registry.register(Arc::new(ResourceCollection::new(definition, collects)));
                }
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, class: Arc<dyn TransformerClass>) {
        self.classes.insert(class.name().to_string(), class);
    }

    /// Look up a class by reference; a leading `\` is ignored.
    pub fn resolve(&self, class_ref: &str) -> ExampleResult<Arc<dyn TransformerClass>> {
        let name = class_ref.strip_prefix('\\').unwrap_or(class_ref);
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| ExampleError::UnresolvedType(class_ref.to_string()))
    }
}

/// Single-model resource.
pub struct JsonResource {
    definition: Arc<ResourceConfig>,
}

impl JsonResource {
    pub fn new(definition: Arc<ResourceConfig>) -> Self {
        Self { definition }
    }
}

impl TransformerClass for JsonResource {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn construct(&self, input: TransformerInput) -> ExampleResult<Transformer> {
        match input {
            TransformerInput::One(instance) => Ok(Transformer::Item(Box::new(ItemResponse {
                definition: self.definition.clone(),
                instance,
            }))),
            TransformerInput::Many(_) => Err(ExampleError::construction(
                self.name(),
                "expects a single model, got a collection",
            )),
        }
    }

    fn wrap_many(&self, items: Vec<ModelInstance>) -> Option<ExampleResult<Transformer>> {
        Some(Ok(Transformer::Collection(Box::new(CollectionResponse {
            wrap: self.definition.wrap.clone(),
            status: self.definition.status,
            additional: Map::new(),
            item: self.definition.clone(),
            items,
        }))))
    }
}

/// Multi-model resource.
pub struct ResourceCollection {
    definition: Arc<ResourceConfig>,
    collects: Option<Arc<ResourceConfig>>,
}

impl ResourceCollection {
    pub fn new(definition: Arc<ResourceConfig>, collects: Option<Arc<ResourceConfig>>) -> Self {
        Self {
            definition,
            collects,
        }
    }
}

impl TransformerClass for ResourceCollection {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn construct(&self, input: TransformerInput) -> ExampleResult<Transformer> {
        match input {
            TransformerInput::Many(items) => {
                Ok(Transformer::Collection(Box::new(CollectionResponse {
                    wrap: self.definition.wrap.clone(),
                    status: self.definition.status,
                    additional: self.definition.additional.clone(),
                    item: self
                        .collects
                        .clone()
                        .unwrap_or_else(|| self.definition.clone()),
                    items,
                })))
            }
            TransformerInput::One(_) => Err(ExampleError::construction(
                self.name(),
                "expects a collection of models",
            )),
        }
    }
}

struct ItemResponse {
    definition: Arc<ResourceConfig>,
    instance: ModelInstance,
}

impl Render for ItemResponse {
    fn to_response(&self, request: &RequestContext) -> ExampleResult<RenderedResponse> {
        let data = project(&self.definition, &self.instance);
        let payload = wrap(
            data,
            self.definition.wrap.as_deref(),
            &self.definition.additional,
        );
        respond(request, self.definition.status, &payload)
    }
}

struct CollectionResponse {
    wrap: Option<String>,
    status: u16,
    additional: Map<String, Value>,
    /// Definition used to render each element
    item: Arc<ResourceConfig>,
    items: Vec<ModelInstance>,
}

impl Render for CollectionResponse {
    fn to_response(&self, request: &RequestContext) -> ExampleResult<RenderedResponse> {
        let data = Value::Array(
            self.items
                .iter()
                .map(|instance| project(&self.item, instance))
                .collect(),
        );
        let payload = wrap(data, self.wrap.as_deref(), &self.additional);
        respond(request, self.status, &payload)
    }
}

/// Select and rename the exposed attributes of `instance`.
fn project(definition: &ResourceConfig, instance: &ModelInstance) -> Value {
    let Some(fields) = &definition.fields else {
        return instance.to_value();
    };

    let mut out = Map::new();
    for field in fields {
        let value = instance.get(field.source()).cloned().unwrap_or(Value::Null);
        out.insert(field.output().to_string(), value);
    }
    Value::Object(out)
}

fn wrap(data: Value, key: Option<&str>, additional: &Map<String, Value>) -> Value {
    match key {
        Some(key) => {
            let mut out = Map::new();
            out.insert(key.to_string(), data);
            for (k, v) in additional {
                out.insert(k.clone(), v.clone());
            }
            Value::Object(out)
        }
        None => data,
    }
}

/// Serialize `payload` as JSON, the only representation resources offer.
fn respond(
    request: &RequestContext,
    status: u16,
    payload: &Value,
) -> ExampleResult<RenderedResponse> {
    if !request.accepts_json() {
        let accept = request.headers.get("accept").map_or("", String::as_str);
        return Err(ExampleError::Render(format!(
            "resources render JSON, request accepts '{}'",
            accept
        )));
    }
    let body = serde_json::to_vec(payload)?;
    Ok(RenderedResponse {
        status,
        body: Bytes::from(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(value: Value) -> ResourceConfig {
        serde_json::from_value(value).unwrap()
    }

    fn user(id: i64, name: &str) -> ModelInstance {
        let attributes = json!({ "id": id, "name": name, "password": "secret" });
        ModelInstance::new("App\\Models\\User", attributes.as_object().unwrap().clone())
    }

    fn render(transformer: &Transformer) -> (u16, Value) {
        let rendered = transformer.to_response(&RequestContext::default()).unwrap();
        (rendered.status, serde_json::from_slice(&rendered.body).unwrap())
    }

    #[test]
    fn test_item_projection_and_wrap() {
        let class = JsonResource::new(Arc::new(resource(json!({
            "name": "UserResource",
            "fields": ["id", { "source": "name", "output": "full_name" }]
        }))));

        let transformer = class.construct(TransformerInput::One(user(1, "Ada"))).unwrap();
        assert!(!transformer.is_collection());
        let (status, body) = render(&transformer);
        assert_eq!(status, 200);
        assert_eq!(body, json!({ "data": { "id": 1, "full_name": "Ada" } }));
    }

    #[test]
    fn test_item_without_wrapping() {
        let class = JsonResource::new(Arc::new(resource(json!({
            "name": "UserResource",
            "fields": ["id"],
            "wrap": null,
            "status": 201
        }))));

        let transformer = class.construct(TransformerInput::One(user(7, "Ada"))).unwrap();
        let (status, body) = render(&transformer);
        assert_eq!(status, 201);
        assert_eq!(body, json!({ "id": 7 }));
    }

    #[test]
    fn test_item_rejects_collection_input() {
        let class = JsonResource::new(Arc::new(resource(json!({ "name": "UserResource" }))));
        let result = class.construct(TransformerInput::Many(vec![user(1, "Ada")]));
        assert!(matches!(result, Err(ExampleError::Construction { .. })));
    }

    #[test]
    fn test_item_wrap_many_uses_item_projection() {
        let class = JsonResource::new(Arc::new(resource(json!({
            "name": "UserResource",
            "fields": ["name"]
        }))));

        let transformer = class
            .wrap_many(vec![user(1, "Ada"), user(2, "Grace")])
            .unwrap()
            .unwrap();
        assert!(transformer.is_collection());
        let (_, body) = render(&transformer);
        assert_eq!(body, json!({ "data": [{ "name": "Ada" }, { "name": "Grace" }] }));
    }

    #[test]
    fn test_collection_rejects_single_input() {
        let class = ResourceCollection::new(
            Arc::new(resource(json!({ "name": "UserCollection", "kind": "collection" }))),
            None,
        );
        assert!(class.construct(TransformerInput::One(user(1, "Ada"))).is_err());
        assert!(class.wrap_many(vec![]).is_none());
    }

    #[test]
    fn test_collection_renders_through_collected_resource() {
        let item = Arc::new(resource(json!({ "name": "UserResource", "fields": ["id"] })));
        let class = ResourceCollection::new(
            Arc::new(resource(json!({
                "name": "UserCollection",
                "kind": "collection",
                "collects": "UserResource",
                "additional": { "meta": { "total": 2 } }
            }))),
            Some(item),
        );

        let transformer = class
            .construct(TransformerInput::Many(vec![user(1, "Ada"), user(2, "Grace")]))
            .unwrap();
        let (status, body) = render(&transformer);
        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({ "data": [{ "id": 1 }, { "id": 2 }], "meta": { "total": 2 } })
        );
    }

    #[test]
    fn test_registry_resolution() {
        let registry = TransformerRegistry::from_resources(&[
            resource(json!({ "name": "App\\Http\\Resources\\UserResource" })),
            resource(json!({
                "name": "App\\Http\\Resources\\UserCollection",
                "kind": "collection",
                "collects": "App\\Http\\Resources\\UserResource"
            })),
        ])
        .unwrap();

        assert!(registry.resolve("App\\Http\\Resources\\UserResource").is_ok());
        assert!(registry.resolve("\\App\\Http\\Resources\\UserCollection").is_ok());
        assert!(matches!(
            registry.resolve("App\\Http\\Resources\\Missing"),
            Err(ExampleError::UnresolvedType(_))
        ));
    }

    #[test]
    fn test_registry_rejects_unknown_collects() {
        let result = TransformerRegistry::from_resources(&[resource(json!({
            "name": "UserCollection",
            "kind": "collection",
            "collects": "Nope"
        }))]);
        assert!(matches!(result, Err(ExampleError::UnresolvedType(_))));
    }

    #[test]
    fn test_render_requires_json_acceptable_request() {
        let class = JsonResource::new(Arc::new(resource(json!({ "name": "UserResource" }))));
        let transformer = class.construct(TransformerInput::One(user(1, "Ada"))).unwrap();

        let mut request = RequestContext::default();
        request
            .headers
            .insert("accept".to_string(), "text/html".to_string());
        let result = transformer.to_response(&request);
        assert!(matches!(
            result,
            Err(ExampleError::Render(ref msg)) if msg.contains("text/html")
        ));

        request
            .headers
            .insert("accept".to_string(), "application/vnd.api+json".to_string());
        assert!(transformer.to_response(&request).is_ok());
    }
}
