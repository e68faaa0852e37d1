use clap::Parser;
use exemplar::adapters::strategy::ApiResourceStrategy;
use exemplar::cli::Cli;
use exemplar::config::Settings;
use exemplar::domain::{ExampleResponse, ModelStore};
use exemplar::persistence::SqlxModelStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// One documented route and the examples produced for it
#[derive(Serialize)]
struct RouteExamples<'a> {
    methods: &'a [String],
    uri: &'a str,
    responses: Vec<ExampleResponse>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new_with_cli(&cli)?;

    let store: Option<Arc<dyn ModelStore>> = match &settings.database {
        Some(database) => match SqlxModelStore::connect(database).await {
            Ok(store) => {
                info!("Connected to {}", store.pool().backend().name());
                Some(Arc::new(store) as Arc<dyn ModelStore>)
            }
            Err(e) => {
                warn!("Database unavailable, stored records will not be used: {}", e);
                None
            }
        },
        None => None,
    };

    let strategy = ApiResourceStrategy::from_settings(&settings, store, None)?;

    let routes: Vec<_> = match &cli.route {
        Some(uri) => match settings.route(uri) {
            Some(route) => vec![route],
            None => anyhow::bail!("No route configured for URI '{}'", uri),
        },
        None => settings.routes.iter().collect(),
    };

    let mut output = Vec::with_capacity(routes.len());
    for route in routes {
        let responses = strategy
            .run(&route.route(), &route.tags)
            .await
            .unwrap_or_default();
        output.push(RouteExamples {
            methods: &route.methods,
            uri: &route.uri,
            responses,
        });
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
