use std::collections::HashMap;
use suggest_core::{DetailView, ListView, Presenter, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loading {
    Spinner,
    /// Timeout content shown in place of the list
    Message(String),
}

/// What is currently on screen for one bound input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    pub list: Option<ListView>,
    pub loading: Option<Loading>,
    pub detail: Option<DetailView>,
}

/// Presenter that keeps the latest view per session for the draw loop.
/// Text the controller writes back into the input is held until the host
/// picks it up with [`TerminalPresenter::take_input_text`].
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    screens: HashMap<SessionId, Screen>,
    input_text: HashMap<SessionId, String>,
}

impl TerminalPresenter {
    pub fn screen(&self, session: SessionId) -> Option<&Screen> {
        self.screens.get(&session)
    }

    pub fn take_input_text(&mut self, session: SessionId) -> Option<String> {
        self.input_text.remove(&session)
    }

    fn screen_mut(&mut self, session: SessionId) -> &mut Screen {
        self.screens.entry(session).or_default()
    }
}

impl Presenter for TerminalPresenter {
    fn render_list(&mut self, session: SessionId, view: &ListView) {
        let screen = self.screen_mut(session);
        screen.loading = None;
        screen.list = Some(view.clone());
    }

    fn hide_list(&mut self, session: SessionId) {
        let screen = self.screen_mut(session);
        screen.list = None;
        screen.loading = None;
    }

    fn show_loading(&mut self, session: SessionId, content: Option<&str>) {
        self.screen_mut(session).loading = Some(match content {
            Some(message) => Loading::Message(message.to_string()),
            None => Loading::Spinner,
        });
    }

    fn hide_loading(&mut self, session: SessionId) {
        self.screen_mut(session).loading = None;
    }

    fn show_detail(&mut self, session: SessionId, view: &DetailView) {
        self.screen_mut(session).detail = Some(view.clone());
    }

    fn hide_detail(&mut self, session: SessionId) {
        self.screen_mut(session).detail = None;
    }

    fn set_input_text(&mut self, session: SessionId, text: &str) {
        self.input_text.insert(session, text.to_string());
    }
}
