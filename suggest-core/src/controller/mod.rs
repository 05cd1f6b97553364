//! The autocomplete controller: one object owning every bound input.
//!
//! Hosts feed raw input in (`text_changed`, `key`, `focus`, mouse calls),
//! then call [`Controller::pump`] from their event loop. Fetch replies are
//! posted by collaborators onto an internal channel and applied during
//! `pump`, as are due timers and replayed cache hits. Nothing mutates
//! controller state from another thread.

mod fsm;
mod session;

pub use session::SessionId;

use crate::{
    candidate::Candidate,
    command::{Command, Disposition, HostEvent, Key},
    error::{Result, SuggestError},
    flavor::Flavor,
    options::{Options, OptionsOverride},
    present::Presenter,
    source::{CandidateSource, Completion, DetailSource, Replier},
};
use fsm::{DROPDOWN_DELAY, Engine, MANAGE_DELAY, RELEASE_DELAY, TimerKind};
use session::Session;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Start,
    /// A fetch is out (or a cache hit is waiting for the next pump)
    Getting,
    /// A list is shown and navigable
    Selecting,
}

pub struct Controller<P> {
    sessions: HashMap<SessionId, Session>,
    engine: Engine<P>,
    completions: mpsc::Receiver<Completion>,
    cancel: Arc<AtomicBool>,
    next_session: u64,
}

impl<P: Presenter> Controller<P> {
    pub fn new(flavor: Arc<dyn Flavor>, source: Arc<dyn CandidateSource>, presenter: P) -> Self {
        let (tx, completions) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let replier = Replier::new(tx, Arc::clone(&cancel));
        Self {
            sessions: HashMap::new(),
            engine: Engine::new(flavor, source, presenter, replier),
            completions,
            cancel,
            next_session: 0,
        }
    }

    /// Enable the detail pane, resolving remote articles and images through
    /// `details`.
    #[must_use]
    pub fn with_details(mut self, details: Arc<dyn DetailSource>) -> Self {
        self.engine.details = Some(details);
        self
    }

    pub fn flavor(&self) -> &dyn Flavor {
        self.engine.flavor.as_ref()
    }

    pub fn bind(&mut self, overrides: &OptionsOverride) -> Result<SessionId> {
        let options = Options::resolve(self.engine.flavor.default_options(), overrides)?;
        self.next_session += 1;
        let id = SessionId::from_raw(self.next_session);
        log::debug!("bound {id} ({})", self.engine.flavor.name());
        self.sessions.insert(id, Session::new(id, options));
        Ok(id)
    }

    /// Replace a session's options. Its cached replies are dropped.
    pub fn rebind(&mut self, id: SessionId, overrides: &OptionsOverride) -> Result<()> {
        let options = Options::resolve(self.engine.flavor.default_options(), overrides)?;
        let (s, engine) = self.split(id)?;
        engine.reset(s);
        engine.lists.flush(id);
        engine.detail_cache.flush(id);
        engine.ready.retain(|(session, _, _)| *session != id);
        s.selection.set_policy(options.policy);
        if options.initialize {
            s.managed = true;
        }
        s.options = options;
        Ok(())
    }

    pub fn unbind(&mut self, id: SessionId) -> Result<()> {
        let mut s = self
            .sessions
            .remove(&id)
            .ok_or(SuggestError::UnknownSession(id))?;
        let engine = &mut self.engine;
        engine.hide_list(&mut s);
        engine.timers.cancel_where(|(session, _)| *session == id);
        engine.lists.flush(id);
        engine.detail_cache.flush(id);
        engine.ready.retain(|(session, _, _)| *session != id);
        log::debug!("unbound {id}");
        Ok(())
    }

    /// The input text changed. Ignored while the input is not managed.
    pub fn text_changed(&mut self, id: SessionId, text: &str, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        if !s.managed {
            log::debug!("{id} not managed; ignoring edit");
            return Ok(());
        }
        s.text = text.to_string();
        s.typed = s.text.clone();
        let len = s.query_len();
        s.debounce
            .schedule(&mut engine.timers, len, now, (id, TimerKind::Debounce));
        Ok(())
    }

    /// A navigation or commit key. The disposition tells the host whether to
    /// go on with the key's default action.
    pub fn key(&mut self, id: SessionId, key: Key, now: Instant) -> Result<Disposition> {
        let (s, engine) = self.split_at(id, now)?;
        if !s.managed {
            return Ok(Disposition::Proceed);
        }
        Ok(engine.handle(s, key.into()))
    }

    /// Feed a command straight to the state machine, bypassing focus gating.
    pub fn handle(&mut self, id: SessionId, command: Command, now: Instant) -> Result<Disposition> {
        let (s, engine) = self.split_at(id, now)?;
        Ok(engine.handle(s, command))
    }

    pub fn focus(&mut self, id: SessionId, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        engine.timers.cancel_slot(&mut s.focus);
        s.focus = Some(
            engine
                .timers
                .schedule(MANAGE_DELAY, now, (id, TimerKind::Manage)),
        );
        Ok(())
    }

    /// Focus left the input. Ignored while a list press is in progress.
    pub fn blur(&mut self, id: SessionId, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        if s.list_pressed {
            log::debug!("{id} blur during list press; ignoring");
            return Ok(());
        }
        engine.timers.cancel_slot(&mut s.focus);
        s.focus = Some(
            engine
                .timers
                .schedule(RELEASE_DELAY, now, (id, TimerKind::Release)),
        );
        Ok(())
    }

    pub fn list_mouse_down(&mut self, id: SessionId) -> Result<()> {
        self.split(id)?.0.list_pressed = true;
        Ok(())
    }

    pub fn list_mouse_up(&mut self, id: SessionId) -> Result<()> {
        self.split(id)?.0.list_pressed = false;
        Ok(())
    }

    pub fn click_row(&mut self, id: SessionId, row: usize, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        s.list_pressed = false;
        if s.list_visible {
            engine.handle(s, Command::ListItemClick(row));
        }
        Ok(())
    }

    /// Highlight `row` under the pointer without touching the input text.
    pub fn hover_row(&mut self, id: SessionId, row: usize, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        if s.state != State::Selecting
            || !s.list_visible
            || s.selection.selected() == Some(row)
            || !s.selection.select(Some(row))
        {
            return Ok(());
        }
        engine.render_list(s);
        engine.schedule_flyout(s);
        Ok(())
    }

    /// The pointer is over the "create new" affordance.
    pub fn hover_new(&mut self, id: SessionId, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        if s.state != State::Selecting || s.selection.selected().is_none() {
            return Ok(());
        }
        s.selection.clear();
        engine.close_detail(s);
        engine.render_list(s);
        Ok(())
    }

    /// The "create new" affordance was clicked.
    pub fn create_new(&mut self, id: SessionId, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        s.list_pressed = false;
        if s.options.suggest_new.is_none() {
            return Ok(());
        }
        engine.request_new(s);
        engine.reset(s);
        Ok(())
    }

    /// The dropdown affordance was activated.
    pub fn dropdown(&mut self, id: SessionId, now: Instant) -> Result<()> {
        let (s, engine) = self.split_at(id, now)?;
        engine.timers.cancel_slot(&mut s.dropdown);
        s.dropdown = Some(
            engine
                .timers
                .schedule(DROPDOWN_DELAY, now, (id, TimerKind::Dropdown)),
        );
        Ok(())
    }

    /// Apply everything that became ready: cache replays queued before this
    /// call, then posted completions, then due timers. Returns whether
    /// anything was processed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let engine = &mut self.engine;
        engine.now = now;
        let mut progressed = false;

        let replays = std::mem::take(&mut engine.ready);
        for (id, query, items) in replays {
            if let Some(s) = self.sessions.get_mut(&id) {
                progressed = true;
                log::debug!("{id} replaying cached {query:?}");
                engine.deliver(s, query, items);
            }
        }

        while let Ok(completion) = self.completions.try_recv() {
            progressed = true;
            match completion {
                Completion::List {
                    session,
                    request,
                    query,
                    outcome,
                } => match self.sessions.get_mut(&session) {
                    Some(s) => engine.on_list(s, request, query, outcome),
                    None => log::debug!("reply {request} for unbound {session}"),
                },
                Completion::Detail {
                    session,
                    request,
                    kind,
                    id,
                    outcome,
                } => match self.sessions.get_mut(&session) {
                    Some(s) => engine.on_detail(s, request, kind, id, outcome),
                    None => log::debug!("detail {request} for unbound {session}"),
                },
            }
        }

        for (handle, (id, kind)) in engine.timers.drain_due(now) {
            if let Some(s) = self.sessions.get_mut(&id) {
                progressed = true;
                engine.on_timer(s, handle, kind);
            }
        }
        progressed
    }

    /// Earliest moment `pump` has timer work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.timers.next_deadline()
    }

    /// How long the host may block waiting for input before calling `pump`.
    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        if self.engine.ready.is_empty() {
            self.engine.timers.poll_timeout(now, default_timeout)
        } else {
            Duration::ZERO
        }
    }

    pub fn drain_events(&mut self) -> Vec<(SessionId, HostEvent)> {
        std::mem::take(&mut self.engine.events)
    }

    pub fn state(&self, id: SessionId) -> Result<State> {
        Ok(self.session(id)?.state)
    }

    /// Text currently shown in the input.
    pub fn text(&self, id: SessionId) -> Result<&str> {
        Ok(&self.session(id)?.text)
    }

    pub fn selected(&self, id: SessionId) -> Result<Option<&Candidate>> {
        Ok(self.session(id)?.selection.selected_item())
    }

    /// Candidates currently listed for the session.
    pub fn items(&self, id: SessionId) -> Result<&[Candidate]> {
        Ok(self.session(id)?.selection.items())
    }

    pub fn is_list_visible(&self, id: SessionId) -> Result<bool> {
        Ok(self.session(id)?.list_visible)
    }

    pub fn is_fired(&self, id: SessionId) -> Result<bool> {
        Ok(self.session(id)?.fired)
    }

    pub fn is_managed(&self, id: SessionId) -> Result<bool> {
        Ok(self.session(id)?.managed)
    }

    pub fn options(&self, id: SessionId) -> Result<&Options> {
        Ok(&self.session(id)?.options)
    }

    pub fn presenter(&self) -> &P {
        &self.engine.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.engine.presenter
    }

    fn session(&self, id: SessionId) -> Result<&Session> {
        self.sessions
            .get(&id)
            .ok_or(SuggestError::UnknownSession(id))
    }

    fn split(&mut self, id: SessionId) -> Result<(&mut Session, &mut Engine<P>)> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(SuggestError::UnknownSession(id))?;
        Ok((session, &mut self.engine))
    }

    fn split_at(&mut self, id: SessionId, now: Instant) -> Result<(&mut Session, &mut Engine<P>)> {
        let (session, engine) = self.split(id)?;
        engine.now = now;
        Ok((session, engine))
    }
}

impl<P> Drop for Controller<P> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
