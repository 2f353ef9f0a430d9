use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/license",
            get(handlers::verify_license_handler).post(handlers::create_license_handler),
        )
        .route("/license/link", post(handlers::link_account_handler))
        .route("/trainer/questions", get(handlers::questions_handler))
        .route(
            "/trainer/answer/{index}",
            get(handlers::get_answer_handler).post(handlers::set_answer_handler),
        )
        .route("/trainer/status", get(handlers::status_handler))
        .route("/trainer/commit", post(handlers::commit_handler))
        .route("/trainer/history", get(handlers::history_handler))
        .route(
            "/trainer/prefill",
            post(handlers::prefill_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/trainer/whisper",
            post(handlers::whisper_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/train/upload",
            post(handlers::upload_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/bot/chat", post(handlers::chat_handler))
        .route(
            "/bot/chat/history",
            get(handlers::chat_history_handler).delete(handlers::clear_chat_history_handler),
        )
        .route(
            "/projects",
            get(handlers::list_projects_handler).post(handlers::create_project_handler),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project_handler)
                .put(handlers::update_project_handler)
                .delete(handlers::delete_project_handler),
        )
        .route(
            "/transcripts",
            post(handlers::create_transcript_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/dashboard", get(handlers::dashboard_handler))
        .route(
            "/trends",
            get(handlers::get_trends_handler).post(handlers::post_trends_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
