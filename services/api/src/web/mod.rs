pub mod generation_task;
pub mod progress_task;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use rest::{
    carousel_next_handler, carousel_previous_handler, carousel_slide_handler,
    clear_module_handler, create_module_handler, flashcard_flip_handler,
    flashcard_reveal_handler, get_shell_handler, get_view_handler, scenario_next_handler,
    scenario_previous_handler, select_view_handler,
};
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Builds the API router over the shared state.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/shell", get(get_shell_handler))
        .route("/modules", post(create_module_handler))
        .route("/modules/current", axum::routing::delete(clear_module_handler))
        .route("/view", get(get_view_handler).put(select_view_handler))
        .route("/carousels/{index}/next", post(carousel_next_handler))
        .route("/carousels/{index}/previous", post(carousel_previous_handler))
        .route("/carousels/{index}/slides/{slide}", post(carousel_slide_handler))
        .route("/flashcards/{index}/flip", post(flashcard_flip_handler))
        .route("/flashcards/{index}/reveal", post(flashcard_reveal_handler))
        .route("/scenarios/{index}/next", post(scenario_next_handler))
        .route("/scenarios/{index}/previous", post(scenario_previous_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
