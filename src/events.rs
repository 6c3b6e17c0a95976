// Events that flow from background tasks back to the controller
//
// Network work (fetches, the reply stream) runs in spawned tasks. Each task
// reports its outcome as a `ChatEvent` over an mpsc channel, and the event
// loop feeds them to the controller one at a time. The controller is the only
// thing that mutates conversation state, so there are no locks around it.

use crate::backend::BackendError;
use crate::chat::models::{ConversationSummary, LoadedConversation};
use crate::chat::session::SessionId;

/// Capacity of the event channel between tasks and the event loop
pub const EVENT_CHANNEL_CAPACITY: usize = 1000;

#[derive(Debug)]
pub enum ChatEvent {
    /// The reply stream for a session is connected
    StreamOpened { session: SessionId },

    /// One raw SSE data payload for a session
    StreamData { session: SessionId, data: String },

    /// The reply stream failed to open or broke mid-way
    StreamFailed { session: SessionId, error: String },

    /// The backend finished the reply
    StreamEnded { session: SessionId },

    /// Result of GET /chats
    ConversationsListed(Result<Vec<ConversationSummary>, BackendError>),

    /// Result of GET /load_chat/{id}
    ConversationLoaded {
        id: String,
        result: Result<LoadedConversation, BackendError>,
    },

    /// Result of DELETE /chat/{id}
    ConversationDeleted {
        id: String,
        result: Result<(), BackendError>,
    },
}

