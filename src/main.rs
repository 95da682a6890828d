use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck::auth::SessionGateway;
use taskdeck::config::Config;
use taskdeck::shell::Shell;
use taskdeck::store::StoreClient;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Your tasks, in the terminal")]
struct Cli {
    /// Backend base URL (overrides TASKDECK_URL)
    #[arg(long)]
    url: Option<String>,

    /// Publishable API key (overrides TASKDECK_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

/// Initialize tracing to stderr so stdout stays clean for the shell.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskdeck=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().with_overrides(cli.url, cli.api_key);
    tracing::info!(base_url = %config.base_url, "starting taskdeck");

    let gateway = Arc::new(SessionGateway::new(
        config.base_url.clone(),
        config.api_key.clone(),
    ));
    let store = StoreClient::new(config.base_url);

    Shell::new(gateway, store).run().await
}
