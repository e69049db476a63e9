use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingoleap::{app, config, db, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lingoleap=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_path = config::load_database_path();
  let pool = db::init_db(&db_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    db::seed::seed_catalog(&conn).expect("Failed to seed the language catalog");
    if let Err(e) = lingoleap::auth::db::cleanup_expired_sessions(&conn) {
      tracing::warn!("Failed to clean up expired sessions: {}", e);
    }
  }

  let app = app::build_router(AppState::new(pool));

  let addr = config::server_bind_addr();
  tracing::info!("Listening on {}", addr);
  let listener = tokio::net::TcpListener::bind(&addr)
    .await
    .expect("Failed to bind server address");
  axum::serve(listener, app).await.expect("Server error");
}
