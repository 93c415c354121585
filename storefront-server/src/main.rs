use storefront_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. dotenv, configuration, logging
    let config = setup_environment()?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Storefront server starting..."
    );

    // 2. Database, collaborators, catalog snapshot
    let state = ServerState::initialize(&config).await?;

    // 3. HTTP server until ctrl-c
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
