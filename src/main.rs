use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use frontdesk::config::AppConfig;
use frontdesk::db::SqliteAppointmentStore;
use frontdesk::handlers;
use frontdesk::services::ai::ollama::OllamaProvider;
use frontdesk::services::ai::openai::OpenAiProvider;
use frontdesk::services::ai::LlmProvider;
use frontdesk::services::documents::LocalDocuments;
use frontdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let timeout = Duration::from_secs(config.oracle_timeout_secs);

    let llm: Arc<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {}, model: {})", config.ollama_url, config.ollama_model);
            Arc::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
                timeout,
            )?)
        }
        "openai" => {
            anyhow::ensure!(
                !config.openai_api_key.is_empty(),
                "OPENAI_API_KEY must be set when LLM_PROVIDER=openai"
            );
            tracing::info!("using OpenAI LLM provider (model: {})", config.openai_model);
            Arc::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
                timeout,
            )?)
        }
        other => anyhow::bail!("unknown LLM_PROVIDER: {other} (expected openai or ollama)"),
    };

    let store = SqliteAppointmentStore::open(&config.database_url)?;
    let documents = LocalDocuments::load(Path::new(&config.documents_dir), Arc::clone(&llm))?;
    tracing::info!("loaded {} document chunks from {}", documents.len(), config.documents_dir);

    let port = config.port;
    let state = Arc::new(AppState::new(
        config,
        llm,
        Box::new(documents),
        Box::new(store),
    ));

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
