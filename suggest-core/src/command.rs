use crate::candidate::Candidate;
use serde::Serialize;
use std::sync::Arc;

/// Normalized commands consumed by the per-session state machine.
/// Raw keystrokes, timers and fetch replies are all reduced to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The debounced text edit settled
    TextChange,
    UpArrow,
    DownArrow,
    Tab,
    Enter,
    ShiftEnter,
    Escape,
    /// Toggle the full list (dropdown affordance)
    Dropdown,
    /// Mouse click on a visible row
    ListItemClick(usize),
    /// The candidate service timed out or the transport failed
    Timeout,
    /// Candidates arrived for `query` (network reply or cache replay)
    ListResult {
        query: String,
        items: Arc<Vec<Candidate>>,
    },
}

impl Command {
    /// Short name for logs; `ListResult` payloads can be large.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextChange => "TEXTCHANGE",
            Self::UpArrow => "UPARROW",
            Self::DownArrow => "DOWNARROW",
            Self::Tab => "TAB",
            Self::Enter => "ENTERKEY",
            Self::ShiftEnter => "ENTERKEY-SHIFT",
            Self::Escape => "ESCAPEKEY",
            Self::Dropdown => "DROPDOWN",
            Self::ListItemClick(_) => "LISTITEM_CLICK",
            Self::Timeout => "TIMEOUT",
            Self::ListResult { .. } => "LIST_RESULT",
        }
    }
}

/// Navigation and commit keys, as reported by the host input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Tab,
    Enter,
    ShiftEnter,
    Escape,
}

impl From<Key> for Command {
    fn from(key: Key) -> Self {
        match key {
            Key::Up => Self::UpArrow,
            Key::Down => Self::DownArrow,
            Key::Tab => Self::Tab,
            Key::Enter => Self::Enter,
            Key::ShiftEnter => Self::ShiftEnter,
            Key::Escape => Self::Escape,
        }
    }
}

/// Whether the host should go on with its default handling of the key
/// (e.g. submitting the surrounding form on Enter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Proceed,
    PreventDefault,
}

/// Events emitted to the host application on behalf of a bound input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    /// A candidate was committed
    Selected { item: Candidate },
    /// The user asked to create a new entry from the typed text
    NewItemRequested { text: String },
    /// A commit key was pressed with nothing highlighted
    NoSelection,
    /// Enter with a highlighted candidate while the list was not shown. The
    /// controller keeps the list on screen for as long as it is selecting, so
    /// it never emits this itself.
    SubmitWithoutList { item: Candidate },
}
