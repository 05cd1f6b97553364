use crate::{
    components::{
        self,
        candidate_list::{self, ListHit},
        detail,
        search_bar::{self, SearchBarStyle},
        status_bar,
    },
    input::InputField,
    keymap::{self, InputAction},
    presenter::{Loading, TerminalPresenter},
    theme::Theme,
};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Margin, Position, Rect},
    widgets::ListState,
};
use std::{
    io,
    time::{Duration, Instant},
};
use suggest_core::{Controller, Disposition, HostEvent, Key, SessionId, State};

const POLL_INTERVAL: Duration = Duration::from_millis(80);

/// How the picker ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    /// The controller emitted an event that ends the interaction
    Event(HostEvent),
    /// Enter went through with nothing committed; carries the typed text
    Submitted(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Front-end state for one bound input: the editable text, list scroll
/// position and the last drawn list area for mouse hit-testing.
pub struct Picker {
    session: SessionId,
    input: InputField,
    list_state: ListState,
    list_area: Option<Rect>,
    submit: bool,
}

impl Picker {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            input: InputField::default(),
            list_state: ListState::default(),
            list_area: None,
            submit: false,
        }
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    /// Pull controller output into the front end: text written back into the
    /// input, then any event that ends the interaction.
    fn sync(&mut self, controller: &mut Controller<TerminalPresenter>) -> Option<PickerOutcome> {
        if let Some(text) = controller.presenter_mut().take_input_text(self.session) {
            self.input.set_text(&text);
        }

        let mut outcome = None;
        for (id, event) in controller.drain_events() {
            if id != self.session {
                continue;
            }
            match event {
                HostEvent::NoSelection => log::debug!("{id} commit key with nothing highlighted"),
                event => {
                    outcome.get_or_insert(PickerOutcome::Event(event));
                }
            }
        }
        if outcome.is_none() && std::mem::take(&mut self.submit) {
            outcome = Some(PickerOutcome::Submitted(self.input.text().to_string()));
        }
        outcome
    }

    fn on_action(
        &mut self,
        controller: &mut Controller<TerminalPresenter>,
        action: InputAction,
        now: Instant,
    ) -> anyhow::Result<Flow> {
        let session = self.session;
        match action {
            InputAction::Quit => return Ok(Flow::Quit),
            InputAction::Nav(Key::Escape)
                if controller.state(session)? == State::Start
                    && !controller.is_list_visible(session)? =>
            {
                return Ok(Flow::Quit);
            }
            InputAction::Nav(key) => {
                let disposition = controller.key(session, key, now)?;
                if key == Key::Enter && disposition == Disposition::Proceed {
                    self.submit = true;
                }
            }
            InputAction::Dropdown => controller.dropdown(session, now)?,
            InputAction::Left => self.input.left(),
            InputAction::Right => self.input.right(),
            InputAction::Home => self.input.home(),
            InputAction::End => self.input.end(),
            InputAction::Insert(_)
            | InputAction::Backspace
            | InputAction::Delete
            | InputAction::DeleteWord
            | InputAction::Clear => {
                let changed = match action {
                    InputAction::Insert(c) => {
                        self.input.insert(c);
                        true
                    }
                    InputAction::Backspace => self.input.backspace(),
                    InputAction::Delete => self.input.delete(),
                    InputAction::DeleteWord => self.input.delete_word(),
                    _ => self.input.clear(),
                };
                if changed {
                    controller.text_changed(session, self.input.text(), now)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn hit(
        &self,
        controller: &Controller<TerminalPresenter>,
        column: u16,
        row: u16,
    ) -> Option<ListHit> {
        let area = self.list_area?;
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let view = controller.presenter().screen(self.session)?.list.as_ref()?;
        let line = self.list_state.offset() + usize::from(row - area.y);
        candidate_list::hit_test(view, line)
    }

    fn on_mouse(
        &mut self,
        controller: &mut Controller<TerminalPresenter>,
        mouse: MouseEvent,
        now: Instant,
    ) -> anyhow::Result<()> {
        let session = self.session;
        let hit = self.hit(controller, mouse.column, mouse.row);
        match (mouse.kind, hit) {
            (MouseEventKind::Moved, Some(ListHit::Row(row))) => {
                controller.hover_row(session, row, now)?;
            }
            (MouseEventKind::Moved, Some(ListHit::CreateNew)) => controller.hover_new(session, now)?,
            (MouseEventKind::Down(MouseButton::Left), Some(_)) => {
                controller.list_mouse_down(session)?;
            }
            (MouseEventKind::Up(MouseButton::Left), Some(ListHit::Row(row))) => {
                controller.click_row(session, row, now)?;
            }
            (MouseEventKind::Up(MouseButton::Left), Some(ListHit::CreateNew)) => {
                controller.create_new(session, now)?;
            }
            (MouseEventKind::Up(MouseButton::Left), None) => controller.list_mouse_up(session)?,
            _ => {}
        }
        Ok(())
    }

    fn draw(
        &mut self,
        f: &mut Frame,
        controller: &Controller<TerminalPresenter>,
        theme: &Theme,
        spinner: &str,
    ) {
        let [search_area, body, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(f.area());

        let style = SearchBarStyle {
            title: controller.flavor().name(),
            placeholder: "Type to search...",
            border_color: theme.accent,
            muted_color: theme.muted,
        };
        search_bar::draw(f, search_area, &style, self.input.text(), self.input.cursor());

        self.list_area = None;
        if let Some(screen) = controller.presenter().screen(self.session) {
            let (list_area, detail_area) = if screen.detail.is_some() {
                let [list, pane] =
                    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .areas(body);
                (list, Some(pane))
            } else {
                (body, None)
            };

            candidate_list::draw(f, list_area, screen, theme, spinner, &mut self.list_state);
            if screen.list.is_some() && !matches!(screen.loading, Some(Loading::Message(_))) {
                self.list_area = Some(list_area.inner(Margin::new(1, 1)));
            }
            if let (Some(view), Some(area)) = (&screen.detail, detail_area) {
                detail::draw(f, area, view, theme);
            }
        }

        let state = controller.state(self.session).unwrap_or_default();
        status_bar::draw(f, status_area, state, theme);
    }
}

/// Run the picker for `session` until a commit, a submit or a quit.
pub fn run(
    terminal: &mut DefaultTerminal,
    controller: &mut Controller<TerminalPresenter>,
    session: SessionId,
    theme: &Theme,
) -> anyhow::Result<PickerOutcome> {
    execute!(io::stdout(), EnableMouseCapture, EnableFocusChange)?;
    let result = event_loop(terminal, controller, session, theme);
    execute!(io::stdout(), DisableMouseCapture, DisableFocusChange)?;
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    controller: &mut Controller<TerminalPresenter>,
    session: SessionId,
    theme: &Theme,
) -> anyhow::Result<PickerOutcome> {
    let mut picker = Picker::new(session);
    let spinner_start = Instant::now();

    loop {
        controller.pump(Instant::now());
        if let Some(outcome) = picker.sync(controller) {
            return Ok(outcome);
        }

        let spinner = components::spinner_frame(spinner_start);
        terminal.draw(|f| picker.draw(f, controller, theme, spinner))?;

        // Wake up for the next controller timer, or redraw the spinner
        let timeout = controller.poll_timeout(Instant::now(), POLL_INTERVAL);
        if !event::poll(timeout)? {
            continue;
        }
        let now = Instant::now();
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(action) = keymap::resolve(key)
                    && picker.on_action(controller, action, now)? == Flow::Quit
                {
                    return Ok(PickerOutcome::Cancelled);
                }
            }
            Event::Mouse(mouse) => picker.on_mouse(controller, mouse, now)?,
            Event::FocusGained => controller.focus(session, now)?,
            Event::FocusLost => controller.blur(session, now)?,
            _ => {}
        }
    }
}
