use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webpilot::actions::builtin_space;
use webpilot::api::{routes::create_router, state::{AppState, RunnerFactory}};
use webpilot::config::{AgentConfig, LlmSettings, RemoteApiConfig, ServerConfig};
use webpilot::llm::GenaiChat;
use webpilot::prompts::TemplateStore;
use webpilot::session::{HttpSessionApi, RetryPolicy};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Configuration and credentials are checked up front; a missing key
    // fails the process here, before any run can start.
    let server = ServerConfig::from_env();
    let remote = match RemoteApiConfig::from_env() {
        Ok(remote) => remote,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    let llm = match LlmSettings::from_env() {
        Ok(llm) => llm,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    let templates = match TemplateStore::with_builtins() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    let session_api = match HttpSessionApi::new(&remote) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let factory = RunnerFactory {
        space: Arc::new(builtin_space()),
        templates,
        model: Arc::new(GenaiChat::new(llm.model.clone())),
        session_api,
        perception_variant: std::env::var("PERCEPTION_VARIANT")
            .unwrap_or_else(|_| "structured".to_string()),
        prompt_variant: std::env::var("PROMPT_VARIANT").unwrap_or_else(|_| "default".to_string()),
        agent: AgentConfig::default(),
        retry: RetryPolicy::default(),
    };

    // Create application state
    let state = Arc::new(AppState::new(factory));

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server.host.parse().unwrap_or([127, 0, 0, 1].into()),
        server.port,
    );
    tracing::info!("webpilot agent server starting on {} (model: {})", addr, llm.model);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
