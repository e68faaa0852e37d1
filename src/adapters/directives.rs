//! Locating and decoding the resource and model directives of a route.
//!
//! Supported tags (names are case-insensitive):
//!
//! ```text
//! @apiResource 201 App\Http\Resources\UserResource
//! @apiResourceCollection App\Http\Resources\UserCollection
//! @apiResourceModel App\Models\User states=admin,verified
//! ```
//!
//! Only the first tag of each family is honored; later duplicates are ignored.

use crate::adapters::annotation_parser::AttributeGrammar;
use crate::domain::{
    AnnotationTag, DirectiveKind, ExampleError, ExampleResult, ModelDirective, ResourceDirective,
};
use once_cell::sync::Lazy;
use regex::Regex;

pub const RESOURCE_TAG: &str = "apiResource";
pub const RESOURCE_COLLECTION_TAG: &str = "apiResourceCollection";
pub const MODEL_TAG: &str = "apiResourceModel";

const STATES_ATTRIBUTE: &str = "states";

static STATUS_AND_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]{3})?\s?(.*)$").expect("valid resource directive regex"));

static MODEL_ATTRIBUTES: Lazy<AttributeGrammar> = Lazy::new(|| {
    AttributeGrammar::new(&[STATES_ATTRIBUTE]).expect("valid model attribute grammar")
});

/// First resource directive tag in `tags`, with the variant it names.
pub fn extract_resource_directive(
    tags: &[AnnotationTag],
) -> Option<(DirectiveKind, &AnnotationTag)> {
    tags.iter().find_map(|tag| {
        if tag.is_named(RESOURCE_TAG) {
            Some((DirectiveKind::Single, tag))
        } else if tag.is_named(RESOURCE_COLLECTION_TAG) {
            Some((DirectiveKind::Collection, tag))
        } else {
            None
        }
    })
}

/// First model directive tag in `tags`.
pub fn extract_model_directive(tags: &[AnnotationTag]) -> Option<&AnnotationTag> {
    tags.iter().find(|tag| tag.is_named(MODEL_TAG))
}

/// Split a resource directive into its optional status code and class reference.
pub fn decode_resource_directive(raw: &str) -> ExampleResult<(Option<u16>, String)> {
    let caps = STATUS_AND_CLASS
        .captures(raw)
        .ok_or_else(|| ExampleError::Directive(raw.to_string()))?;

    let status = match caps.get(1) {
        Some(digits) => {
            let code: u16 = digits
                .as_str()
                .parse()
                .map_err(|_| ExampleError::Directive(raw.to_string()))?;
            if !(100..=599).contains(&code) {
                return Err(ExampleError::InvalidStatusCode(code));
            }
            Some(code)
        }
        None => None,
    };
    let class_ref = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

    Ok((status, class_ref))
}

/// Decode a model directive into the model reference and its factory states.
pub fn decode_model_directive(raw: &str) -> ExampleResult<ModelDirective> {
    let parsed = MODEL_ATTRIBUTES.parse(raw);
    if parsed.content.is_empty() {
        return Err(ExampleError::MissingModelDirective);
    }

    let variation_states = parsed
        .attribute(STATES_ATTRIBUTE)
        .map(|states| {
            states
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelDirective {
        type_ref: parsed.content,
        variation_states,
    })
}

/// Extract and decode the resource directive in one step.
pub fn resource_directive(tags: &[AnnotationTag]) -> ExampleResult<Option<ResourceDirective>> {
    let Some((kind, tag)) = extract_resource_directive(tags) else {
        return Ok(None);
    };
    let (explicit_status, class_ref) = decode_resource_directive(&tag.raw_content)?;
    Ok(Some(ResourceDirective {
        kind,
        explicit_status,
        class_ref,
    }))
}

/// Extract and decode the model directive; a missing one is a usage error.
pub fn model_directive(tags: &[AnnotationTag]) -> ExampleResult<ModelDirective> {
    let tag = extract_model_directive(tags).ok_or(ExampleError::MissingModelDirective)?;
    decode_model_directive(&tag.raw_content)
}
