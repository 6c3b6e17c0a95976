// Streaming session state machine
//
// One session per send. The controller owns at most one live session; a new
// send closes the previous one before opening its own.
//
// State Diagram:
//
//   [Idle] ──open──▶ [Opening] ──opened/fragment──▶ [Streaming]
//                        │                              │  ▲
//                        │                              │  │ fragment
//                        │                              └──┘
//                        │ error/close                  │ error/close/end
//                        ▼                              ▼
//                   [Closed(reason)] ◀──────────────────┘
//
// Closed is terminal. Events for a closed session are reported as rejected so
// the caller can drop them.

use std::fmt;

/// Identifies one streaming session
///
/// Monotonically increasing per controller, so a late event from an older
/// session can never be mistaken for the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A newer send took over
    Superseded,
    /// The push channel failed
    Error,
    /// Closed on purpose (conversation switched, deleted, or user request)
    Explicit,
    /// The backend finished the reply
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Opening,
    Streaming,
    Closed(CloseReason),
}

impl SessionState {
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Opening | SessionState::Streaming)
    }

    /// Short label for the status bar
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Opening => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Closed(CloseReason::Completed) => "done",
            SessionState::Closed(CloseReason::Error) => "failed",
            SessionState::Closed(CloseReason::Superseded) => "superseded",
            SessionState::Closed(CloseReason::Explicit) => "stopped",
        }
    }
}

/// A single send and the reply streaming back for it
#[derive(Debug, Clone)]
pub struct StreamingSession {
    id: SessionId,
    prompt: String,
    /// Conversation id at send time; `None` means the backend assigns one
    conversation_id: Option<String>,
    id_adopted: bool,
    state: SessionState,
    fragments: usize,
}

impl StreamingSession {
    pub fn new(id: SessionId, prompt: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            conversation_id,
            id_adopted: false,
            state: SessionState::Idle,
            fragments: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Idle → Opening
    pub fn open(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.state = SessionState::Opening;
        true
    }

    /// Channel established; Opening → Streaming
    pub fn on_opened(&mut self) -> bool {
        match self.state {
            SessionState::Opening => {
                self.state = SessionState::Streaming;
                true
            }
            SessionState::Streaming => true,
            _ => false,
        }
    }

    /// A fragment arrived; counts it and moves to Streaming
    pub fn on_fragment(&mut self) -> bool {
        if !self.state.is_live() {
            return false;
        }
        self.state = SessionState::Streaming;
        self.fragments += 1;
        true
    }

    /// Any live state → Closed(reason). No-op once closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if matches!(self.state, SessionState::Closed(_)) {
            return false;
        }
        self.state = SessionState::Closed(reason);
        true
    }

    /// Whether a backend-assigned id should be adopted from a fragment
    ///
    /// Only sessions that started without a conversation, and only once.
    pub fn wants_conversation_id(&self) -> bool {
        self.conversation_id.is_none() && !self.id_adopted
    }

    pub fn adopt_conversation_id(&mut self, id: String) {
        self.conversation_id = Some(id);
        self.id_adopted = true;
    }
}
