use super::diagnostics::RecordingDiagnostics;
use super::model_catalog::ModelCatalog;
use super::model_resolver::ModelResolver;
use super::response_synthesizer::ResponseSynthesizer;
use super::strategy::ApiResourceStrategy;
use super::transformer::TransformerRegistry;
use crate::config::{Settings, StrategySettings};
use crate::domain::{
    AnnotationTag, Diagnostics, ExampleError, ExampleResult, Factory, FixtureFactories,
    ModelInstance, Route,
};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

fn settings(verbose: bool) -> Settings {
    serde_json::from_value(json!({
        "strategy": { "verbose": verbose },
        "models": [
            {
                "name": "App\\Models\\User",
                "defaults": { "role": "member" },
                "factory": {
                    "fields": { "id": { "faker": "integer", "min": 1, "max": 1000000 } },
                    "states": { "admin": { "role": "admin" } }
                }
            },
            { "name": "App\\Models\\Tag", "defaults": { "label": "untitled" } }
        ],
        "resources": [
            { "name": "App\\Http\\Resources\\UserResource", "fields": ["id", "role"] },
            {
                "name": "App\\Http\\Resources\\UserCollection",
                "kind": "collection",
                "collects": "App\\Http\\Resources\\UserResource"
            },
            { "name": "App\\Http\\Resources\\TagResource", "wrap": null }
        ]
    }))
    .unwrap()
}

fn strategy(verbose: bool) -> (ApiResourceStrategy, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let sink: Arc<dyn Diagnostics> = diagnostics.clone();
    let strategy =
        ApiResourceStrategy::from_settings(&settings(verbose), None, Some(sink)).unwrap();
    (strategy, diagnostics)
}

fn route() -> Route {
    Route::new(&["GET", "HEAD"], "api/users/{id}")
}

fn content(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn test_single_resource_with_states() {
    let (strategy, diagnostics) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\User states=admin"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].status, 200);

    let body = content(&responses[0].content);
    assert_eq!(body["data"]["role"], json!("admin"));
    assert!(body["data"]["id"].is_i64());
    assert!(diagnostics.messages().is_empty());
}

#[tokio::test]
async fn test_explicit_status_wins() {
    let (strategy, _) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResource", "202 App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(responses[0].status, 202);
}

#[tokio::test]
async fn test_collection_contains_two_items() {
    let (strategy, _) = strategy(false);
    for class in [
        "App\\Http\\Resources\\UserCollection",
        "App\\Http\\Resources\\UserResource",
    ] {
        let tags = vec![
            AnnotationTag::new("ApiResourceCollection", class),
            AnnotationTag::new("apiresourcemodel", "\\App\\Models\\User"),
        ];

        let responses = strategy.run(&route(), &tags).await.unwrap();
        let body = content(&responses[0].content);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2), "{}", class);
    }
}

#[tokio::test]
async fn test_bare_default_model_without_factory() {
    let (strategy, _) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\TagResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\Tag"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(content(&responses[0].content), json!({ "label": "untitled" }));
}

#[tokio::test]
async fn test_no_resource_directive_is_silent() {
    let (strategy, diagnostics) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
        AnnotationTag::new("response", "{}"),
    ];

    assert!(strategy.run(&route(), &tags).await.is_none());
    assert!(strategy.example_response(&tags).await.unwrap().is_none());
    assert!(diagnostics.messages().is_empty());
}

#[tokio::test]
async fn test_missing_model_directive() {
    let (strategy, diagnostics) = strategy(false);
    let tags = vec![AnnotationTag::new(
        "apiResource",
        "App\\Http\\Resources\\UserResource",
    )];

    let result = strategy.example_response(&tags).await;
    assert!(matches!(result, Err(ExampleError::MissingModelDirective)));

    assert!(strategy.run(&route(), &tags).await.is_none());
    let messages = diagnostics.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("[GET,HEAD] api/users/{id}"));
    assert!(messages[0].contains("--verbose"));
}

#[tokio::test]
async fn test_empty_model_reference_is_missing_directive() {
    let (strategy, _) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "states=admin"),
    ];

    let result = strategy.example_response(&tags).await;
    assert!(matches!(result, Err(ExampleError::MissingModelDirective)));
}

#[tokio::test]
async fn test_failure_emits_exactly_one_warning() {
    let (strategy, diagnostics) = strategy(false);
    let failing = [
        vec![
            AnnotationTag::new("apiResource", "App\\Http\\Resources\\Missing"),
            AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
        ],
        vec![
            AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
            AnnotationTag::new("apiResourceModel", "App\\Models\\Ghost"),
        ],
        vec![
            AnnotationTag::new("apiResource", "999 App\\Http\\Resources\\UserResource"),
            AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
        ],
    ];

    for (i, tags) in failing.iter().enumerate() {
        assert!(strategy.run(&route(), tags).await.is_none());
        assert_eq!(diagnostics.messages().len(), i + 1);
    }
}

#[tokio::test]
async fn test_unknown_state_falls_back_to_bare_default() {
    let (strategy, diagnostics) = strategy(true);
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\User states=banned"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(
        content(&responses[0].content),
        json!({ "data": { "id": null, "role": "member" } })
    );
    assert!(diagnostics.messages().is_empty());
}

#[tokio::test]
async fn test_verbose_warning_includes_error_detail() {
    let (strategy, diagnostics) = strategy(true);
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\Ghost"),
    ];

    assert!(strategy.run(&route(), &tags).await.is_none());
    let messages = diagnostics.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("App\\Models\\Ghost"));
    assert!(!messages[0].contains("--verbose"));
}

#[tokio::test]
async fn test_first_directive_wins() {
    let (strategy, _) = strategy(false);
    let tags = vec![
        AnnotationTag::new("apiResource", "201 App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceCollection", "App\\Http\\Resources\\UserCollection"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\Ghost"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(responses[0].status, 201);
    assert!(content(&responses[0].content)["data"].is_object());
}

/// Factory stub numbering every instance it makes.
#[derive(Default)]
struct CountingFactories {
    lookups: AtomicUsize,
    made: Arc<AtomicU64>,
}

struct CountingFactory {
    made: Arc<AtomicU64>,
}

impl FixtureFactories for CountingFactories {
    fn factory(&self, _type_ref: &str) -> ExampleResult<Box<dyn Factory>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingFactory {
            made: self.made.clone(),
        }))
    }
}

impl Factory for CountingFactory {
    fn with_states(self: Box<Self>, _states: &[String]) -> ExampleResult<Box<dyn Factory>> {
        Ok(self)
    }

    fn make(&self) -> ExampleResult<ModelInstance> {
        let id = self.made.fetch_add(1, Ordering::SeqCst) + 1;
        let mut attributes = Map::new();
        attributes.insert("id".to_string(), json!(id));
        Ok(ModelInstance::new("App\\Models\\User", attributes))
    }
}

fn counting_strategy() -> (ApiResourceStrategy, Arc<CountingFactories>) {
    let settings = settings(false);
    let factories = Arc::new(CountingFactories::default());
    let resolver = ModelResolver::new(
        Arc::new(ModelCatalog::new(settings.model_types())),
        factories.clone(),
        None,
        false,
    );
    let transformers = TransformerRegistry::from_resources(&settings.resources).unwrap();
    let strategy = ApiResourceStrategy::new(
        resolver,
        ResponseSynthesizer::new(Arc::new(transformers)),
        Arc::new(RecordingDiagnostics::new()),
        StrategySettings::default(),
    );
    (strategy, factories)
}

#[tokio::test]
async fn test_collection_resolves_model_twice() {
    for class in [
        "App\\Http\\Resources\\UserCollection",
        "App\\Http\\Resources\\UserResource",
    ] {
        let (strategy, factories) = counting_strategy();
        let tags = vec![
            AnnotationTag::new("apiResourceCollection", class),
            AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
        ];

        let responses = strategy.run(&route(), &tags).await.unwrap();
        assert_eq!(factories.lookups.load(Ordering::SeqCst), 2, "{}", class);
        assert_eq!(factories.made.load(Ordering::SeqCst), 2, "{}", class);

        let body = content(&responses[0].content);
        let ids: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!(1), json!(2)], "{}", class);
    }
}

#[tokio::test]
async fn test_single_resource_resolves_model_once() {
    let (strategy, factories) = counting_strategy();
    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\UserResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\User"),
    ];

    let responses = strategy.run(&route(), &tags).await.unwrap();
    assert_eq!(factories.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(factories.made.load(Ordering::SeqCst), 1);
    assert_eq!(content(&responses[0].content)["data"]["id"], json!(1));
}

#[tokio::test]
async fn test_unusable_float_range_falls_back_without_panicking() {
    let settings: Settings = serde_json::from_value(json!({
        "models": [{
            "name": "App\\Models\\Product",
            "defaults": { "price": 0.0 },
            "factory": {
                "fields": { "price": { "faker": "float", "min": -1.0e308, "max": 1.0e308 } }
            }
        }],
        "resources": [{ "name": "App\\Http\\Resources\\ProductResource" }]
    }))
    .unwrap();
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let sink: Arc<dyn Diagnostics> = diagnostics.clone();
    let strategy = ApiResourceStrategy::from_settings(&settings, None, Some(sink)).unwrap();

    let tags = vec![
        AnnotationTag::new("apiResource", "App\\Http\\Resources\\ProductResource"),
        AnnotationTag::new("apiResourceModel", "App\\Models\\Product"),
    ];
    let responses = strategy.run(&route(), &tags).await.unwrap();

    assert_eq!(content(&responses[0].content), json!({ "data": { "price": 0.0 } }));
    assert!(diagnostics.messages().is_empty());
}
