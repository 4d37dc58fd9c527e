use serde::Serialize;

/// Change notifications published by an [`EditSession`](super::EditSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Versions were added, removed, or the cursor moved.
    TimelineChanged { len: usize, cursor: Option<usize> },
    BusyChanged { busy: bool },
    ErrorChanged { message: Option<String> },
}

/// Point-in-time view of the session for polling callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub len: usize,
    /// Cursor position, -1 when the timeline is empty.
    pub position: isize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub busy: bool,
    pub error: Option<String>,
    pub has_background: bool,
}
