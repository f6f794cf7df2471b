//! services/api/src/web/generation_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for a
//! single generation request, from the accepted topic to the settled shell.

use crate::web::{
    progress_task::StatusTicker,
    protocol::ServerMessage,
    state::AppState,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tutor_core::{LearningModule, TopicQuery, GENERATION_FAILED_MESSAGE};

/// Spawns the worker for an accepted topic under a supervisor task.
///
/// If the worker dies before settling the shell (a panic in the generator,
/// for example), the supervisor settles it as a failed generation, so the
/// shell never stays in the loading state.
pub fn spawn_generation(app_state: Arc<AppState>, topic: TopicQuery) -> JoinHandle<Option<LearningModule>> {
    tokio::spawn(async move {
        let worker = tokio::spawn(generation_process(app_state.clone(), topic.clone()));
        match worker.await {
            Ok(module) => module,
            Err(e) => {
                error!("Generation worker for '{}' died: {:?}", topic, e);
                if app_state.shell.lock().await.abort() {
                    app_state.publish(ServerMessage::GenerationFailed {
                        message: GENERATION_FAILED_MESSAGE.to_string(),
                    });
                }
                None
            }
        }
    })
}

/// Runs the pipeline for an accepted topic and settles the shell.
///
/// The shell must already be in the loading state (`Shell::begin_request`).
/// Returns the stored module, or `None` on failure.
pub async fn generation_process(app_state: Arc<AppState>, topic: TopicQuery) -> Option<LearningModule> {
    let start_time = Instant::now();
    app_state.publish(ServerMessage::GenerationStarted {
        topic: topic.to_string(),
    });

    let ticker = StatusTicker::start(
        app_state.shell.clone(),
        app_state.events.clone(),
        app_state.config.status_interval,
    );
    let result = app_state.pipeline.generate(&topic).await;
    drop(ticker);

    let label = topic.to_string();
    let mut shell = app_state.shell.lock().await;
    let module = shell.complete(topic, result).cloned();
    match &module {
        Some(module) => app_state.publish(ServerMessage::GenerationFinished {
            module_id: module.id,
            project_name: module.document.project_name.clone(),
        }),
        None => app_state.publish(ServerMessage::GenerationFailed {
            message: GENERATION_FAILED_MESSAGE.to_string(),
        }),
    }
    info!("⏱️ Generation for '{}' took: {:?}", label, start_time.elapsed());
    module
}
