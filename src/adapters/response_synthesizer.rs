use crate::adapters::transformer::TransformerRegistry;
use crate::domain::{
    DirectiveKind, ExampleError, ExampleResult, ModelInstance, RequestContext, ResourceDirective,
    SyntheticResponse, Transformer, TransformerClass, TransformerInput,
};
use std::sync::Arc;
use tracing::debug;

/// Drives a transformer class over resolved models and renders the result.
#[derive(Clone)]
pub struct ResponseSynthesizer {
    transformers: Arc<TransformerRegistry>,
}

impl ResponseSynthesizer {
    pub fn new(transformers: Arc<TransformerRegistry>) -> Self {
        Self { transformers }
    }

    /// Render `directive` over `primary`, plus `secondary` for collections.
    ///
    /// An explicit status on the directive replaces whatever the transformer renders.
    pub fn synthesize(
        &self,
        directive: &ResourceDirective,
        primary: ModelInstance,
        secondary: Option<ModelInstance>,
    ) -> ExampleResult<SyntheticResponse> {
        let class = self.transformers.resolve(&directive.class_ref)?;

        let transformer = match directive.kind {
            DirectiveKind::Single => construct_single(class.as_ref(), primary)?,
            DirectiveKind::Collection => {
                let secondary = secondary.ok_or_else(|| {
                    ExampleError::construction(
                        class.name(),
                        "collection responses need two model instances",
                    )
                })?;
                construct_collection(class.as_ref(), primary, secondary)?
            }
        };

        let rendered = transformer.to_response(&RequestContext::default())?;
        let status = directive.explicit_status.unwrap_or(rendered.status);
        Ok(SyntheticResponse::new(status, rendered.body))
    }
}

/// Construct with one model, retrying with a one-element list for classes
/// that only accept plural input.
fn construct_single(
    class: &dyn TransformerClass,
    instance: ModelInstance,
) -> ExampleResult<Transformer> {
    match class.construct(TransformerInput::One(instance.clone())) {
        Ok(transformer) => Ok(transformer),
        Err(e) => {
            debug!("{} rejected a single model ({}); retrying with a list", class.name(), e);
            class.construct(TransformerInput::Many(vec![instance]))
        }
    }
}

fn construct_collection(
    class: &dyn TransformerClass,
    primary: ModelInstance,
    secondary: ModelInstance,
) -> ExampleResult<Transformer> {
    let shape = construct_single(class, primary.clone())?;
    let items = vec![primary, secondary];

    if shape.is_collection() {
        class.construct(TransformerInput::Many(items))
    } else {
        class.wrap_many(items).unwrap_or_else(|| {
            Err(ExampleError::construction(
                class.name(),
                "item resource has no collection constructor",
            ))
        })
    }
}
