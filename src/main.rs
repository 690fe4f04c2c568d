//! URL Shield entrypoint: load config, set up logging, dispatch the subcommand.

use clap::Parser;
use url_shield::{
    cli::{self, Cli},
    config::ServiceConfig,
    logging::StructuredLogger,
};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Cli::parse();
    let config = ServiceConfig::load(&args.config)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        config = %args.config.display(),
        heuristics = config.heuristics.enabled,
        "url-shield starting"
    );

    cli::run(args, &config)
}
