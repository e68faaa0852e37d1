//! Entry point: one route's tags in, zero or one example response out.

use crate::adapters::diagnostics::TracingDiagnostics;
use crate::adapters::directives::{model_directive, resource_directive};
use crate::adapters::factory::FakerFactories;
use crate::adapters::model_catalog::ModelCatalog;
use crate::adapters::model_resolver::ModelResolver;
use crate::adapters::response_synthesizer::ResponseSynthesizer;
use crate::adapters::transformer::TransformerRegistry;
use crate::config::{Settings, StrategySettings};
use crate::domain::{
    AnnotationTag, Diagnostics, DirectiveKind, ExampleResponse, ExampleResult, ModelStore, Route,
    SyntheticResponse,
};
use std::sync::Arc;
use tracing::{debug, info};

const VERBOSE_HINT: &str = "Run this again with the --verbose flag to see the error.";

pub struct ApiResourceStrategy {
    resolver: ModelResolver,
    synthesizer: ResponseSynthesizer,
    diagnostics: Arc<dyn Diagnostics>,
    settings: StrategySettings,
}

impl ApiResourceStrategy {
    pub fn new(
        resolver: ModelResolver,
        synthesizer: ResponseSynthesizer,
        diagnostics: Arc<dyn Diagnostics>,
        settings: StrategySettings,
    ) -> Self {
        Self {
            resolver,
            synthesizer,
            diagnostics,
            settings,
        }
    }

    /// Wire the catalog, factories and transformers declared in `settings`.
    pub fn from_settings(
        settings: &Settings,
        store: Option<Arc<dyn ModelStore>>,
        diagnostics: Option<Arc<dyn Diagnostics>>,
    ) -> ExampleResult<Self> {
        let catalog = Arc::new(ModelCatalog::new(settings.model_types()));
        let factories = Arc::new(FakerFactories::from_models(&settings.models));
        let transformers = Arc::new(TransformerRegistry::from_resources(&settings.resources)?);

        info!(
            "Loaded {} models ({} with factories), {} resources",
            settings.models.len(),
            factories.len(),
            settings.resources.len()
        );

        let resolver = ModelResolver::new(catalog, factories, store, settings.strategy.verbose);
        let synthesizer = ResponseSynthesizer::new(transformers);
        let diagnostics = diagnostics.unwrap_or_else(|| Arc::new(TracingDiagnostics));

        Ok(Self::new(resolver, synthesizer, diagnostics, settings.strategy))
    }

    /// Build the example for one route. `Ok(None)` when the route carries no
    /// resource directive.
    pub async fn example_response(
        &self,
        tags: &[AnnotationTag],
    ) -> ExampleResult<Option<SyntheticResponse>> {
        let Some(directive) = resource_directive(tags)? else {
            return Ok(None);
        };
        let model = model_directive(tags)?;

        let primary = self
            .resolver
            .resolve(&model.type_ref, &model.variation_states)
            .await?;
        let secondary = match directive.kind {
            DirectiveKind::Single => None,
            DirectiveKind::Collection => Some(
                self.resolver
                    .resolve(&model.type_ref, &model.variation_states)
                    .await?,
            ),
        };
        debug!(
            "Resolved {} via {} tier for {}",
            model.type_ref, primary.tier, directive.class_ref
        );

        let response = self.synthesizer.synthesize(
            &directive,
            primary.instance,
            secondary.map(|resolved| resolved.instance),
        )?;
        Ok(Some(response))
    }

    /// Like [`example_response`](Self::example_response), but never fails:
    /// errors become a single warning and no result.
    pub async fn run(&self, route: &Route, tags: &[AnnotationTag]) -> Option<Vec<ExampleResponse>> {
        match self.example_response(tags).await {
            Ok(Some(response)) => Some(vec![response.into()]),
            Ok(None) => None,
            Err(e) => {
                let message = if self.settings.verbose {
                    format!(
                        "Exception thrown when fetching API resource response for {}. {}",
                        route, e
                    )
                } else {
                    format!(
                        "Exception thrown when fetching API resource response for {}. {}",
                        route, VERBOSE_HINT
                    )
                };
                self.diagnostics.warn(&message);
                None
            }
        }
    }
}
