use anyhow::Context;
use conclave::{
    api::{create_router, with_middleware},
    cli::{self, ask, init, output::Output, Cli, Commands},
    utils::toml_config::{ConclaveConfig, ConfigManager},
    AppState, BulkCompletion, LLMClient, OpenAIClient,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let output = cli.output();

    match cli.command {
        Some(Commands::Init {
            ref path,
            force,
            ref host,
            port,
        }) => {
            let result = init::run(
                init::InitConfig {
                    path: path.clone(),
                    force,
                    host: host.clone(),
                    port,
                },
                &output,
            );
            if let init::InitResult::Error(e) = result {
                anyhow::bail!("init failed: {}", e);
            }
            Ok(())
        }
        Some(Commands::Roster) => {
            cli::print_roster(&output);
            Ok(())
        }
        Some(Commands::Ask { ref query, agents }) => {
            let config = cli::load_config(&cli.config, &output)?;
            init_tracing(&config, cli.verbose);
            let (client, bulk) = build_provider(&config).await;
            let orchestrator = conclave::Orchestrator::from_config(&config, client, bulk);

            if let Err(e) = ask::run(&orchestrator, query, agents, &output).await {
                output.error(&e.to_string());
                anyhow::bail!(e);
            }
            Ok(())
        }
        Some(Commands::Serve) | None => serve(&cli.config, cli.verbose, &output).await,
    }
}

fn init_tracing(config: &ConclaveConfig, verbose: bool) {
    let default_filter = if verbose {
        "conclave=debug,tower_http=debug".to_string()
    } else {
        format!("conclave={},tower_http=info", config.server.log_level)
    };

    let filter = if verbose {
        EnvFilter::new(default_filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the provider client and probe for the grouped-job API.
async fn build_provider(
    config: &ConclaveConfig,
) -> (Arc<dyn LLMClient>, Option<Arc<dyn BulkCompletion>>) {
    let api_key = match config.api_key() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!("{}. Collaboration requests will fail until it is set.", e);
            None
        }
    };

    let client = Arc::new(
        OpenAIClient::new(&config.provider.api_base, api_key)
            .with_request_timeout(Duration::from_secs(config.provider.request_timeout_secs))
            .with_batch_poll_interval(Duration::from_millis(
                config.collaboration.batch_poll_interval_ms,
            )),
    );

    let provider = client.provider_name().to_string();
    let bulk: Option<Arc<dyn BulkCompletion>> =
        if config.provider.batch_api && client.probe_bulk_support().await {
            tracing::info!(%provider, "Provider batch API available, large panels use bulk jobs");
            Some(client.clone())
        } else {
            tracing::info!(%provider, "Large panels use parallel calls");
            None
        };

    let llm: Arc<dyn LLMClient> = client;
    (llm, bulk)
}

async fn serve(config_path: &Path, verbose: bool, output: &Output) -> anyhow::Result<()> {
    let mut config_manager = if config_path.exists() {
        ConfigManager::new(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        output.warning(&format!(
            "{} not found, using defaults",
            config_path.display()
        ));
        output.hint("Run 'conclave-server init' to create one");
        ConfigManager::from_config(ConclaveConfig::default())
    };

    let config = config_manager.config();
    init_tracing(&config, verbose);

    if config_path.exists() {
        if let Err(e) = config_manager.start_watching() {
            tracing::warn!("Config hot reload disabled: {}", e);
        }
    }

    let config_manager = Arc::new(config_manager);
    let (llm, bulk) = build_provider(&config).await;
    let state = AppState {
        config_manager: config_manager.clone(),
        llm,
        bulk,
    };

    let app = create_router();

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/swagger.json", conclave::api::ApiDoc::openapi()),
        )
    };

    let app = with_middleware(app, &config.server.cors_origins).with_state(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    output.banner();
    output.success(&format!("Listening on http://{}", addr));
    tracing::info!(%addr, "Conclave server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    config_manager.stop_watching();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
