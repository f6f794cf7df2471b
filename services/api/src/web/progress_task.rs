//! services/api/src/web/progress_task.rs
//!
//! The cosmetic status ticker shown while a generation is pending. It cycles
//! through `LOADING_MESSAGES` on a fixed period and carries no meaning beyond
//! perceived progress.

use crate::web::protocol::ServerMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;
use tutor_core::{Shell, LOADING_MESSAGES};

/// Handle to a running ticker. Dropping it cancels the ticker, so it cannot
/// outlive the request it belongs to on any exit path.
pub struct StatusTicker {
    _guard: DropGuard,
}

impl StatusTicker {
    /// Spawns the ticker. The first message appears one `period` after start.
    pub fn start(
        shell: Arc<Mutex<Shell>>,
        events: broadcast::Sender<ServerMessage>,
        period: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        tokio::spawn(status_process(shell, events, period, token.clone()));
        Self {
            _guard: token.drop_guard(),
        }
    }
}

async fn status_process(
    shell: Arc<Mutex<Shell>>,
    events: broadcast::Sender<ServerMessage>,
    period: Duration,
    cancellation_token: CancellationToken,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    let mut index = 0usize;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = interval.tick() => {
                let message = LOADING_MESSAGES[index % LOADING_MESSAGES.len()];
                // Publish under the lock so a status line can never trail the
                // settle event sent by the generation task.
                let mut shell = shell.lock().await;
                if cancellation_token.is_cancelled() || !shell.set_loading_message(message) {
                    break;
                }
                let _ = events.send(ServerMessage::Status {
                    message: message.to_string(),
                });
                index += 1;
            }
        }
    }
    info!("Status ticker stopped after {} updates.", index);
}
