use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::AppointmentBookingService;
use chat_cell::{
    ChatFunctionDispatcher, ConversationService, InMemorySessionStore, OpenAiClient,
    RedisSessionStore, SessionStore,
};
use shared_config::AppConfig;
use shared_database::{seed::seed_clinic, InMemoryStore, SharedStore, SupabaseStore};

use crate::router::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic Assistant API server");

    let config = AppConfig::from_env();
    let state = build_state(&config).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store: SharedStore = if config.is_configured() {
        info!("Using Supabase store at {}", config.supabase_url);
        Arc::new(SupabaseStore::new(config))
    } else {
        let store = InMemoryStore::new();
        seed_clinic(&store)
            .await
            .context("failed to seed the in-memory clinic")?;
        Arc::new(store)
    };

    let sessions = session_store(config).await;

    if config.is_llm_configured() {
        info!("Chat model {} at {}", config.openai_model, config.openai_base_url);
    } else {
        warn!("LLM not configured, /chat will answer with the fallback reply");
    }

    let model = OpenAiClient::new(config).context("failed to build the LLM client")?;
    let booking = Arc::new(AppointmentBookingService::new(store.clone()));
    let conversation = ConversationService::new(
        Arc::new(model),
        sessions,
        ChatFunctionDispatcher::new(store.clone(), booking.clone()),
        config.chat_history_limit,
    );

    Ok(AppState {
        store,
        booking,
        conversation: Arc::new(conversation),
    })
}

/// Redis when `REDIS_URL` is set and reachable, process memory otherwise.
async fn session_store(config: &AppConfig) -> Arc<dyn SessionStore> {
    let idle = Duration::from_secs(config.session_idle_timeout_secs);

    match &config.redis_url {
        Some(url) => match RedisSessionStore::new(url, idle).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                warn!("Redis unavailable ({}), keeping chat sessions in memory", e);
                Arc::new(InMemorySessionStore::new(idle))
            }
        },
        None => Arc::new(InMemorySessionStore::new(idle)),
    }
}
