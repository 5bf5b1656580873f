use axum::{
    routing::{get, post},
    Router,
};
use certification_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let quiz_api = Router::new()
        .route("/api/quiz/start", post(routes::quiz::start_quiz))
        .route("/api/quiz/answer", post(routes::quiz::save_answer))
        .route("/api/quiz/submit", post(routes::quiz::submit_quiz))
        .route("/api/quiz/:session_id/analysis", get(routes::quiz::analysis))
        .layer(axum::middleware::from_fn_with_state(
            certification_backend::middleware::rate_limit::RateLimiter::per_second(
                config.public_rps,
            ),
            certification_backend::middleware::rate_limit::limit_requests,
        ));

    let app = base_routes
        .merge(quiz_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
