//! # Exemplar - example responses from resource annotations
//!
//! Exemplar builds realistic example HTTP responses for API documentation
//! without calling the endpoint. A route's handler is annotated with the
//! transformer that renders it and the model it renders:
//!
//! ```text
//! @apiResourceCollection 200 App\Http\Resources\UserCollection
//! @apiResourceModel App\Models\User states=admin,verified
//! ```
//!
//! The model is instantiated through a fixture factory, the first stored
//! record, or its bare defaults (in that order), then fed through the named
//! transformer to produce a status code and body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exemplar::adapters::strategy::ApiResourceStrategy;
//! use exemplar::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let strategy = ApiResourceStrategy::from_settings(&settings, None, None)?;
//!
//!     for route in &settings.routes {
//!         let examples = strategy.run(&route.route(), &route.tags).await;
//!         println!("{}: {:?}", route.uri, examples);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: tags, directives, models, transformers and the ports they use
//! - **Adapters**: directive decoding, model resolution, response synthesis
//! - **Persistence**: SQLx-backed lookup of stored model records
//! - **Config**: model, resource and route definitions

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod persistence;
