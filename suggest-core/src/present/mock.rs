use super::{DetailView, ListView, Presenter};
use crate::controller::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    RenderList(SessionId, ListView),
    HideList(SessionId),
    ShowLoading(SessionId, Option<String>),
    HideLoading(SessionId),
    ShowDetail(SessionId, DetailView),
    HideDetail(SessionId),
    SetInputText(SessionId, String),
}

/// Presenter that records every call, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
}

impl RecordingPresenter {
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn last_list(&self) -> Option<&ListView> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::RenderList(_, view) => Some(view),
            _ => None,
        })
    }

    pub fn last_detail(&self) -> Option<&DetailView> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::ShowDetail(_, view) => Some(view),
            _ => None,
        })
    }

    pub fn last_input_text(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            PresenterCall::SetInputText(_, text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&PresenterCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl Presenter for RecordingPresenter {
    fn render_list(&mut self, session: SessionId, view: &ListView) {
        self.calls
            .push(PresenterCall::RenderList(session, view.clone()));
    }

    fn hide_list(&mut self, session: SessionId) {
        self.calls.push(PresenterCall::HideList(session));
    }

    fn show_loading(&mut self, session: SessionId, content: Option<&str>) {
        self.calls
            .push(PresenterCall::ShowLoading(session, content.map(String::from)));
    }

    fn hide_loading(&mut self, session: SessionId) {
        self.calls.push(PresenterCall::HideLoading(session));
    }

    fn show_detail(&mut self, session: SessionId, view: &DetailView) {
        self.calls
            .push(PresenterCall::ShowDetail(session, view.clone()));
    }

    fn hide_detail(&mut self, session: SessionId) {
        self.calls.push(PresenterCall::HideDetail(session));
    }

    fn set_input_text(&mut self, session: SessionId, text: &str) {
        self.calls
            .push(PresenterCall::SetInputText(session, text.to_string()));
    }
}
