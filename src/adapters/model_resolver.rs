//! Model instantiation with a three-tier fallback.
//!
//! 1. **Factory**: the registered fixture factory, with any requested states.
//! 2. **Persisted**: the first stored record, for persistence-backed models only.
//! 3. **Bare default**: the model constructed with no arguments.
//!
//! The first tier that yields an instance wins. Failures in tiers 1 and 2 are
//! expected fallbacks and are only logged; a failure in tier 3 is returned.

use crate::adapters::model_catalog::ModelCatalog;
use crate::domain::{
    ExampleError, ExampleResult, FixtureFactories, ModelInstance, ModelStore, ResolutionTier,
    ResolvedModel,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of attempting one tier.
#[derive(Debug)]
pub enum TierOutcome {
    Resolved(ModelInstance),
    /// The tier does not apply to this model.
    Skipped(&'static str),
    Failed(ExampleError),
}

impl From<ExampleResult<ModelInstance>> for TierOutcome {
    fn from(result: ExampleResult<ModelInstance>) -> Self {
        match result {
            Ok(instance) => Self::Resolved(instance),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Strip one leading namespace separator, so `\App\Models\User` and
/// `App\Models\User` name the same type.
pub fn normalize_type_ref(type_ref: &str) -> &str {
    type_ref.strip_prefix('\\').unwrap_or(type_ref)
}

pub struct ModelResolver {
    catalog: Arc<ModelCatalog>,
    factories: Arc<dyn FixtureFactories>,
    store: Option<Arc<dyn ModelStore>>,
    verbose: bool,
}

impl ModelResolver {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        factories: Arc<dyn FixtureFactories>,
        store: Option<Arc<dyn ModelStore>>,
        verbose: bool,
    ) -> Self {
        Self {
            catalog,
            factories,
            store,
            verbose,
        }
    }

    /// Produce one instance of `type_ref`. Only the bare-default tier can fail.
    pub async fn resolve(&self, type_ref: &str, states: &[String]) -> ExampleResult<ResolvedModel> {
        let type_ref = normalize_type_ref(type_ref);

        let outcome = self.from_factory(type_ref, states);
        if let Some(resolved) = self.settle(ResolutionTier::Factory, type_ref, outcome) {
            return Ok(resolved);
        }

        let outcome = self.from_store(type_ref).await;
        if let Some(resolved) = self.settle(ResolutionTier::Persisted, type_ref, outcome) {
            return Ok(resolved);
        }

        let instance = self.catalog.resolve_type(type_ref)?.instantiate();
        debug!("Resolved {} via {} tier", type_ref, ResolutionTier::BareDefault);
        Ok(ResolvedModel {
            instance,
            tier: ResolutionTier::BareDefault,
        })
    }

    fn from_factory(&self, type_ref: &str, states: &[String]) -> TierOutcome {
        let result = self.factories.factory(type_ref).and_then(|factory| {
            let factory = if states.is_empty() {
                factory
            } else {
                factory.with_states(states)?
            };
            factory.make()
        });
        result.into()
    }

    async fn from_store(&self, type_ref: &str) -> TierOutcome {
        let Ok(model) = self.catalog.resolve_type(type_ref) else {
            return TierOutcome::Skipped("type is not in the model catalog");
        };
        if !model.is_persisted() {
            return TierOutcome::Skipped("model has no backing table");
        }
        let Some(store) = &self.store else {
            return TierOutcome::Skipped("no database configured");
        };

        match store.first(model).await {
            Ok(Some(instance)) => TierOutcome::Resolved(instance),
            Ok(None) => TierOutcome::Skipped("no stored records"),
            Err(e) => TierOutcome::Failed(e),
        }
    }

    /// Turn a tier outcome into a resolved model, or log why it fell through.
    fn settle(
        &self,
        tier: ResolutionTier,
        type_ref: &str,
        outcome: TierOutcome,
    ) -> Option<ResolvedModel> {
        match outcome {
            TierOutcome::Resolved(instance) => {
                debug!("Resolved {} via {} tier", type_ref, tier);
                Some(ResolvedModel { instance, tier })
            }
            TierOutcome::Skipped(reason) => {
                debug!("Skipping {} tier for {}: {}", tier, type_ref, reason);
                None
            }
            TierOutcome::Failed(e) => {
                if self.verbose {
                    match tier {
                        ResolutionTier::Factory => warn!(
                            "Model factory failed to instantiate {}; trying to fetch from database. ({})",
                            type_ref, e
                        ),
                        _ => warn!(
                            "Failed to fetch first {} from database; using bare default. ({})",
                            type_ref, e
                        ),
                    }
                } else {
                    debug!("{} tier failed for {}: {}", tier, type_ref, e);
                }
                None
            }
        }
    }
}
