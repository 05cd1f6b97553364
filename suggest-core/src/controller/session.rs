use super::State;
use crate::{
    candidate::{Candidate, DisplayRow},
    flyout::DetailJoin,
    options::Options,
    selection::SelectionModel,
    timer::{Debouncer, TimerHandle},
};
use std::{fmt, sync::Arc};
use unicode_segmentation::UnicodeSegmentation;

/// Opaque handle for one bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-input controller state.
#[derive(Debug)]
pub(crate) struct Session {
    pub id: SessionId,
    pub options: Options,
    pub state: State,
    /// What the input currently shows
    pub text: String,
    /// What the user last typed; navigation previews overwrite `text`
    pub typed: String,
    /// Keyboard handling is active (the input has focus)
    pub managed: bool,
    /// A result list has been shown since the input was last managed
    pub fired: bool,
    /// A mouse press on the list is in progress; blur is ignored meanwhile
    pub list_pressed: bool,
    pub list_visible: bool,
    pub detail_visible: bool,
    /// Narrow the reply by the typed text; the dropdown toggles this off
    pub filtering: bool,
    /// Cache key of the list reply this session is waiting for
    pub awaiting: Option<String>,
    /// Last unfiltered reply
    pub reply: Arc<Vec<Candidate>>,
    pub rows: Vec<DisplayRow>,
    pub selection: SelectionModel,
    pub debounce: Debouncer,
    pub loading: Option<TimerHandle>,
    pub focus: Option<TimerHandle>,
    pub dropdown: Option<TimerHandle>,
    pub flyout: Option<TimerHandle>,
    pub join: Option<DetailJoin>,
}

impl Session {
    pub fn new(id: SessionId, options: Options) -> Self {
        Self {
            id,
            selection: SelectionModel::new(options.policy),
            managed: options.initialize,
            options,
            state: State::Start,
            text: String::new(),
            typed: String::new(),
            fired: false,
            list_pressed: false,
            list_visible: false,
            detail_visible: false,
            filtering: true,
            awaiting: None,
            reply: Arc::new(Vec::new()),
            rows: Vec::new(),
            debounce: Debouncer::default(),
            loading: None,
            focus: None,
            dropdown: None,
            flyout: None,
            join: None,
        }
    }

    /// Typed text as sent to the source. Navigation previews don't count.
    pub fn query(&self) -> &str {
        self.typed.trim()
    }

    /// Length in user-perceived characters, which is what `min_len` counts.
    pub fn query_len(&self) -> usize {
        self.query().graphemes(true).count()
    }
}
