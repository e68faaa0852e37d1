use clap::Parser;
use std::path::PathBuf;

/// Exemplar - synthesize example API responses from resource annotations
#[derive(Parser, Debug, Clone)]
#[command(name = "exemplar", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "EXEMPLAR_CONFIG", default_value = "exemplar.toml")]
    pub config: PathBuf,

    /// Include full error detail in warnings
    #[arg(short, long)]
    pub verbose: bool,

    /// Database holding persisted model records
    #[arg(long, env = "EXEMPLAR_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Only process the route with this URI
    #[arg(long)]
    pub route: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
