use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use nursenote_core::{
    CoreConfig, FileVisitRecordStore, GenerationService, OpenAiClient,
    config::{
        ai_config_from_env_values, allowed_origins_from_env_value, visit_data_dir_from_env_value,
    },
};

/// Main entry point for the NurseNote service
///
/// Resolves configuration from the environment (and `.env` when present), then serves the REST
/// API with Swagger UI at `/swagger-ui`.
///
/// # Environment Variables
/// - `NURSENOTE_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `VISIT_DATA_DIR`: Directory for visit record storage (default: "visit_data")
/// - `OPENAI_API_KEY`: API key; generation answers 503 while unset
/// - `OPENAI_MODEL`: Model name (default: "gpt-4.1-mini")
/// - `OPENAI_BASE_URL`: API base URL (default: "https://api.openai.com")
/// - `ALLOWED_ORIGINS`: Comma-separated CORS origins (default: any origin)
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - the AI settings are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nursenote=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("NURSENOTE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let ai = ai_config_from_env_values(
        std::env::var("OPENAI_API_KEY").ok(),
        std::env::var("OPENAI_MODEL").ok(),
        std::env::var("OPENAI_BASE_URL").ok(),
    )?;
    let cfg = CoreConfig::new(
        visit_data_dir_from_env_value(std::env::var("VISIT_DATA_DIR").ok()),
        ai,
    );
    let allowed_origins = allowed_origins_from_env_value(std::env::var("ALLOWED_ORIGINS").ok());

    let client = OpenAiClient::new(cfg.ai())?;
    if !client.is_configured() {
        tracing::warn!("OPENAI_API_KEY is not set; /generate will answer 503");
    }
    tracing::info!(
        "-- Visit records under {}, model {}",
        cfg.records_dir().display(),
        client.model()
    );

    let store = FileVisitRecordStore::from_config(&cfg);
    let service = GenerationService::new(Arc::new(client), Arc::new(store));
    let app = api_rest::router(AppState::new(service), allowed_origins);

    tracing::info!("++ Starting NurseNote REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
