use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use quill_api::middleware::TokenVerifier;
use quill_api::router::router;
use quill_api::state::AppStateInner;
use quill_identity::IdentityClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_key = std::env::var("QUILL_JWT_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("QUILL_DB_PATH").unwrap_or_else(|_| "quill.db".into());
    let host = std::env::var("QUILL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("QUILL_PORT")
        .unwrap_or_else(|_| "4000".into())
        .parse()?;
    let identity_url = std::env::var("QUILL_IDENTITY_API_URL").unwrap_or_default();
    let identity_key = std::env::var("QUILL_IDENTITY_API_KEY").unwrap_or_default();
    if identity_url.is_empty() {
        warn!("QUILL_IDENTITY_API_URL is not set; /api/users endpoints will fail upstream");
    }

    // Init database
    let db = quill_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let verifier = TokenVerifier::new(&jwt_key)?;
    let identity = IdentityClient::new(identity_url, identity_key);
    let state = Arc::new(AppStateInner {
        db,
        verifier,
        identity,
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Quill server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
