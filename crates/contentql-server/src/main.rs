use std::path::PathBuf;

use clap::Parser;
use contentql_graphql::{AccessToken, GraphQLService};
use contentql_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};
use contentql_server::{AppConfig, ServerBuilder, load_store, observability};

#[derive(Parser)]
#[command(
    name = "contentql-server",
    about = "GraphQL API over a runtime-defined content model",
    version
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "CONTENTQL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print the public schema as SDL and exit
    #[arg(long)]
    print_schema: bool,
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let cli = Cli::parse();
    let config_path = cli.config.to_string_lossy().to_string();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(path = %config_path, "Configuration loaded");
    observability::apply_logging_level(&cfg.logging.level);

    if let Err(e) = run(cli, cfg).await {
        tracing::error!(error = %e, "Server failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cfg: AppConfig) -> anyhow::Result<()> {
    if cli.print_schema {
        let store = load_store(&cfg)?;
        let service = GraphQLService::bootstrap(store, &cfg.graphql).await?;
        let schema = service.schema(&AccessToken::public())?;
        println!("{}", schema.sdl());
        return Ok(());
    }

    ServerBuilder::new().with_config(cfg).build().await?.run().await
}
