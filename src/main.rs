use clap::Parser;
use schemaforge::adapters::notifications::NotificationHub;
use schemaforge::adapters::registry::InMemorySchemaRegistry;
use schemaforge::cli::Cli;
use schemaforge::config::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting SchemaForge on {}:{}", host, port);

    let notifications = NotificationHub::new(settings.notifications.capacity);
    let registry = InMemorySchemaRegistry::new(Arc::new(notifications.clone()));

    if let Some(seed_dir) = &settings.registry.seed_dir {
        registry.load_seed_dir(seed_dir).await?;
    }

    let app = schemaforge::create_app(Arc::new(registry), notifications);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
