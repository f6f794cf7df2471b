//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket messages the server pushes to the browser while a
//! learning module is generated. The socket is server-to-client only; any
//! text the client sends is ignored.

use serde::Serialize;
use tutor_core::ShellSnapshot;
use uuid::Uuid;

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect so the client can draw the current state.
    Snapshot { shell: ShellSnapshot },

    /// A generation request was accepted. The UI should switch to the loading screen.
    GenerationStarted { topic: String },

    /// Cosmetic progress line while a generation is pending.
    Status { message: String },

    /// The generation succeeded and the module is ready to be viewed.
    GenerationFinished { module_id: Uuid, project_name: String },

    /// The generation failed. `message` is the user-facing text.
    GenerationFailed { message: String },

    /// The user asked to analyze a new topic.
    ModuleCleared,
}
