//! Router assembly.

use axum::{Router, routing::get, routing::post, routing::put};
use tower_http::trace::TraceLayer;

use crate::{auth, handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/auth/register", post(auth::handlers::register))
    .route("/auth/login", post(auth::handlers::login))
    .route("/auth/logout", post(auth::handlers::logout))
    .route("/user/profile", get(handlers::users::get_profile))
    .route("/user/profile", put(handlers::users::update_profile))
    .route("/user/select-language", post(handlers::users::select_language))
    .route("/user/complete-lesson", post(handlers::users::complete_lesson))
    .route(
      "/user/update-global-score",
      post(handlers::users::update_global_score),
    )
    .route("/user/daily-status", get(handlers::users::daily_status))
    .route("/languages", get(handlers::languages::list))
    .route("/languages", post(handlers::languages::create))
    .route(
      "/lessons/by-language/{language_id}",
      get(handlers::lessons::by_language),
    )
    .route("/lessons", post(handlers::lessons::create))
    .route("/lessons/questions/random", get(handlers::quiz::random_question))
    .route(
      "/lessons/questions/daily/{language_id}",
      get(handlers::quiz::daily_question),
    )
    .route("/lessons/questions/quick-quiz", get(handlers::quiz::quick_quiz))
    .route("/lessons/questions/timed-quiz", get(handlers::quiz::timed_quiz))
    .route("/lessons/questions/check-answer", post(handlers::quiz::check_answer))
    .route(
      "/lessons/questions/daily/check-answer",
      post(handlers::quiz::check_daily_answer),
    )
    .route("/lessons/{id}", get(handlers::lessons::by_id))
    .route(
      "/progress/check-lesson-answer",
      post(handlers::progress::check_lesson_answer),
    )
    .route(
      "/progress/complete-lesson",
      post(handlers::users::complete_lesson),
    )
    .route("/leaderboard/current", get(handlers::leaderboard::current))
    .route("/leaderboard/past", get(handlers::leaderboard::past))
    .route("/leaderboard/update", post(handlers::leaderboard::update))
    .route(
      "/leaderboard/reset-monthly",
      post(handlers::leaderboard::reset_monthly),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
