pub mod annotation_parser;
pub mod diagnostics;
pub mod directives;
pub mod factory;
pub mod model_catalog;
pub mod model_resolver;
pub mod response_synthesizer;
pub mod strategy;
pub mod transformer;

#[cfg(test)]
mod strategy_test;
