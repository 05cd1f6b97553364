//! Rendering boundary. The controller decides *what* is visible; a
//! [`Presenter`] decides how it looks.

pub mod mock;

use crate::{candidate::DisplayRow, controller::SessionId};
use serde::Serialize;

/// Everything needed to draw the candidate list of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub rows: Vec<DisplayRow>,
    /// Draw the "no matches" sentinel instead of rows
    pub no_matches: bool,
    pub selected: Option<usize>,
    /// Label of the "create new" affordance, when enabled
    pub suggest_new: Option<String>,
    /// Row to bring into view
    pub scroll_hint: Option<usize>,
}

/// Detail pane content for the highlighted candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub row: usize,
    pub label: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub domains: Vec<String>,
    pub blurb: String,
}

pub trait Presenter {
    fn render_list(&mut self, session: SessionId, view: &ListView);
    fn hide_list(&mut self, session: SessionId);
    /// `content` is the configured timeout text, or `None` for the spinner
    fn show_loading(&mut self, session: SessionId, content: Option<&str>);
    fn hide_loading(&mut self, session: SessionId);
    fn show_detail(&mut self, session: SessionId, view: &DetailView);
    fn hide_detail(&mut self, session: SessionId);
    fn set_input_text(&mut self, session: SessionId, text: &str);
}
