//! The per-session state machine and everything it drives.

use super::{SessionId, State, session::Session};
use crate::{
    cache::{Lookup, RequestCache, RequestId},
    candidate::{Candidate, ListReply, parse_reply},
    command::{Command, Disposition, HostEvent},
    error::Result,
    flavor::Flavor,
    flyout::{
        ARTICLE_ERROR_TEXT, DetailContent, DetailJoin, DetailKind, DetailValue, JoinId,
        ResourceRef, parse_article, parse_image, quote_id,
    },
    present::{DetailView, ListView, Presenter},
    selection::{Navigation, SelectionPolicy},
    source::{CandidateSource, DetailRequest, DetailSource, FetchRequest, Replier},
    timer::{TimerHandle, TimerQueue},
};
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

pub(super) const LOADING_DELAY: Duration = Duration::from_millis(50);
pub(super) const MANAGE_DELAY: Duration = Duration::from_millis(20);
pub(super) const RELEASE_DELAY: Duration = Duration::from_millis(10);
pub(super) const DROPDOWN_DELAY: Duration = Duration::from_millis(30);
pub(super) const FLYOUT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TimerKind {
    Debounce,
    Loading,
    Manage,
    Release,
    Dropdown,
    Flyout,
}

type DetailKey = (DetailKind, String);

/// Everything a session's transitions touch besides the session itself.
pub(super) struct Engine<P> {
    pub flavor: Arc<dyn Flavor>,
    pub source: Arc<dyn CandidateSource>,
    pub details: Option<Arc<dyn DetailSource>>,
    pub presenter: P,
    pub timers: TimerQueue<(SessionId, TimerKind)>,
    pub lists: RequestCache<String, Arc<Vec<Candidate>>>,
    pub detail_cache: RequestCache<DetailKey, DetailValue>,
    /// Cache hits waiting for the next pump
    pub ready: VecDeque<(SessionId, String, Arc<Vec<Candidate>>)>,
    pub events: Vec<(SessionId, HostEvent)>,
    pub replier: Replier,
    /// Time of the call currently being handled
    pub now: Instant,
    next_request: u64,
    next_join: u64,
}

impl<P: Presenter> Engine<P> {
    pub fn new(
        flavor: Arc<dyn Flavor>,
        source: Arc<dyn CandidateSource>,
        presenter: P,
        replier: Replier,
    ) -> Self {
        Self {
            flavor,
            source,
            details: None,
            presenter,
            timers: TimerQueue::new(),
            lists: RequestCache::new(),
            detail_cache: RequestCache::new(),
            ready: VecDeque::new(),
            events: Vec::new(),
            replier,
            now: Instant::now(),
            next_request: 0,
            next_join: 0,
        }
    }

    pub fn handle(&mut self, s: &mut Session, command: Command) -> Disposition {
        log::trace!("{} {:?} <- {}", s.id, s.state, command.name());
        match s.state {
            State::Start => self.on_start(s, command),
            State::Getting => self.on_getting(s, command),
            State::Selecting => self.on_selecting(s, command),
        }
    }

    fn on_start(&mut self, s: &mut Session, command: Command) -> Disposition {
        match command {
            Command::TextChange | Command::DownArrow => {
                if self.wants_fetch(s) {
                    self.transition(s, State::Getting);
                    self.fetch(s);
                } else {
                    self.hide_list(s);
                }
            }
            Command::Dropdown => {
                if self.flavor.requires_text() && s.query().is_empty() {
                    self.hide_list(s);
                } else {
                    s.filtering = false;
                    self.transition(s, State::Getting);
                    self.fetch(s);
                }
            }
            Command::Enter => s.debounce.cancel(&mut self.timers),
            _ => {}
        }
        Disposition::Proceed
    }

    fn on_getting(&mut self, s: &mut Session, command: Command) -> Disposition {
        match command {
            Command::TextChange => {
                self.transition(s, State::Start);
                return self.handle(s, Command::TextChange);
            }
            Command::Timeout => {
                if let Some(content) = s.options.timeout_content.clone() {
                    self.timers.cancel_slot(&mut s.loading);
                    s.awaiting = None;
                    self.presenter.show_loading(s.id, Some(&content));
                } else {
                    self.reset(s);
                }
            }
            Command::ListResult { items, .. } => {
                s.fired = true;
                s.reply = items;
                self.transition(s, State::Selecting);
            }
            Command::Enter => {
                self.emit(s.id, HostEvent::NoSelection);
                s.debounce.cancel(&mut self.timers);
                self.reset(s);
            }
            Command::ShiftEnter => return Disposition::PreventDefault,
            Command::Escape => self.reset(s),
            _ => {}
        }
        Disposition::Proceed
    }

    fn on_selecting(&mut self, s: &mut Session, command: Command) -> Disposition {
        match command {
            Command::TextChange => {
                s.filtering = true;
                self.transition(s, State::Start);
                return self.handle(s, Command::TextChange);
            }
            Command::DownArrow => {
                let step = s.selection.select_next();
                self.navigated(s, step);
                return Disposition::PreventDefault;
            }
            Command::UpArrow => {
                let step = s.selection.select_previous();
                self.navigated(s, step);
                return Disposition::PreventDefault;
            }
            Command::Dropdown => {
                if s.query().is_empty() {
                    self.reset(s);
                } else {
                    s.filtering = !s.filtering;
                    self.transition(s, State::Getting);
                    self.fetch(s);
                }
            }
            Command::Tab | Command::Enter => {
                if let Some(item) = s.selection.selected_item().cloned() {
                    self.commit(s, item);
                } else {
                    self.emit(s.id, HostEvent::NoSelection);
                }
                // The list is always on screen while selecting.
                if command == Command::Enter {
                    return Disposition::PreventDefault;
                }
            }
            Command::ShiftEnter => {
                self.request_new(s);
                self.reset(s);
                return Disposition::PreventDefault;
            }
            Command::ListItemClick(row) => {
                if let Some(item) = s.selection.item(row).cloned() {
                    self.commit(s, item);
                }
            }
            Command::Escape => {
                if s.selection.selected().is_some() {
                    self.restore_typed(s);
                }
                self.reset(s);
            }
            _ => {}
        }
        Disposition::Proceed
    }

    /// Exit hook, state change, enter hook.
    pub fn transition(&mut self, s: &mut Session, next: State) {
        log::debug!("{} {:?} -> {next:?}", s.id, s.state);
        match s.state {
            State::Start => {}
            State::Getting => {
                self.timers.cancel_slot(&mut s.loading);
                self.presenter.hide_loading(s.id);
                s.awaiting = None;
            }
            State::Selecting => {
                s.selection.clear();
                self.close_detail(s);
            }
        }
        s.state = next;
        match next {
            State::Start => {}
            State::Getting => {
                self.timers.cancel_slot(&mut s.loading);
                if s.fired || s.options.timeout_content.is_some() {
                    s.loading = Some(self.timers.schedule(
                        LOADING_DELAY,
                        self.now,
                        (s.id, TimerKind::Loading),
                    ));
                }
            }
            State::Selecting => {
                s.fired = true;
                self.show_results(s);
            }
        }
    }

    /// Back to Start with nothing on screen.
    pub fn reset(&mut self, s: &mut Session) {
        if s.state != State::Start {
            self.transition(s, State::Start);
        }
        self.hide_list(s);
    }

    fn wants_fetch(&self, s: &Session) -> bool {
        let len = s.query_len();
        !(self.flavor.requires_text() && len == 0) && len >= s.options.min_len
    }

    fn fetch(&mut self, s: &mut Session) {
        let key = self.flavor.cache_key(s.query());
        s.awaiting = Some(key.clone());
        match self.lists.lookup(s.id, &key) {
            Lookup::Hit(items) => {
                log::debug!("{} cache hit for {key:?}", s.id);
                self.ready.push_back((s.id, key, items));
            }
            Lookup::InFlight(request) => {
                log::debug!("{} {key:?} already in flight as {request}", s.id);
            }
            Lookup::Miss => {
                let request = self.next_request_id();
                self.lists.begin(s.id, key.clone(), request);
                self.source.fetch(
                    FetchRequest {
                        session: s.id,
                        request,
                        query: key,
                        limit: s.options.limit,
                    },
                    self.replier.clone(),
                );
            }
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId::from_raw(self.next_request)
    }

    /// Whether a reply for `key` is the one this session is waiting on.
    fn is_current(&self, s: &Session, key: &str) -> bool {
        s.state == State::Getting
            && s.awaiting.as_deref() == Some(key)
            && self.flavor.cache_key(s.query()) == key
    }

    /// Hand a list to the state machine unless it went stale.
    pub fn deliver(&mut self, s: &mut Session, query: String, items: Arc<Vec<Candidate>>) {
        if !self.is_current(s, &query) {
            log::debug!("{} discarding stale reply for {query:?}", s.id);
            return;
        }
        self.handle(s, Command::ListResult { query, items });
    }

    pub fn on_list(
        &mut self,
        s: &mut Session,
        request: RequestId,
        query: String,
        outcome: Result<Value>,
    ) {
        match outcome.and_then(parse_reply) {
            Ok(ListReply::Items(items)) => {
                let items = Arc::new(items);
                if self.settle_list(s, &query, request, Some(Arc::clone(&items))) {
                    self.deliver(s, query, items);
                }
            }
            Ok(ListReply::TimedOut) => {
                log::warn!("{} service timed out for {query:?}", s.id);
                if self.settle_list(s, &query, request, None) && self.is_current(s, &query) {
                    self.handle(s, Command::Timeout);
                }
            }
            Err(e) if e.is_transport() => {
                log::warn!("{} fetch for {query:?} failed: {e}", s.id);
                if self.settle_list(s, &query, request, None) && self.is_current(s, &query) {
                    self.handle(s, Command::Timeout);
                }
            }
            Err(e) => {
                log::error!("{} bad reply for {query:?}: {e}", s.id);
                if self.settle_list(s, &query, request, None) && self.is_current(s, &query) {
                    self.reset(s);
                }
            }
        }
    }

    /// Clear the in-flight marker for `request`. False when the request was
    /// superseded (a rebind flushed the cache and a newer one went out).
    fn settle_list(
        &mut self,
        s: &Session,
        query: &str,
        request: RequestId,
        items: Option<Arc<Vec<Candidate>>>,
    ) -> bool {
        let tracked = self.lists.complete(s.id, query, request, items);
        if !tracked {
            log::debug!("{} dropping reply to superseded {request} for {query:?}", s.id);
        }
        tracked
    }

    pub fn on_timer(&mut self, s: &mut Session, handle: TimerHandle, kind: TimerKind) {
        match kind {
            TimerKind::Debounce => {
                if s.debounce.settle(handle) {
                    self.handle(s, Command::TextChange);
                }
            }
            TimerKind::Loading => {
                if s.loading == Some(handle) {
                    s.loading = None;
                    self.presenter.show_loading(s.id, None);
                }
            }
            TimerKind::Manage => {
                if s.focus == Some(handle) {
                    s.focus = None;
                    s.managed = true;
                    s.fired = false;
                    self.reset(s);
                }
            }
            TimerKind::Release => {
                if s.focus == Some(handle) {
                    s.focus = None;
                    s.managed = false;
                    s.fired = false;
                    s.debounce.cancel(&mut self.timers);
                    self.timers.cancel_slot(&mut s.dropdown);
                    self.reset(s);
                }
            }
            TimerKind::Dropdown => {
                if s.dropdown == Some(handle) {
                    s.dropdown = None;
                    self.handle(s, Command::Dropdown);
                }
            }
            TimerKind::Flyout => {
                if s.flyout == Some(handle) {
                    s.flyout = None;
                    self.open_detail(s);
                }
            }
        }
    }

    /// Filter, truncate and render the last reply; hard selection picks the
    /// first row.
    fn show_results(&mut self, s: &mut Session) {
        let text = s.query().to_string();
        let all = Arc::clone(&s.reply);
        let mut visible: Vec<Candidate> = if s.filtering {
            let kept = all
                .iter()
                .filter(|&item| match &s.options.filter {
                    Some(filter) => filter(item, &text),
                    None => self.flavor.filter(item, &text),
                })
                .cloned()
                .collect();
            self.flavor.after_filter(kept, &all)
        } else {
            all.to_vec()
        };
        visible.truncate(s.options.limit);
        s.selection.show(visible);
        s.rows = s
            .selection
            .items()
            .iter()
            .map(|item| match &s.options.transform {
                Some(transform) => transform(item, &text),
                None => self.flavor.transform(item, &text),
            })
            .collect();
        if s.selection.policy() == SelectionPolicy::Hard {
            s.selection.select_first();
        }
        self.render_list(s);
        self.schedule_flyout(s);
    }

    pub fn render_list(&mut self, s: &mut Session) {
        let view = ListView {
            scroll_hint: self.flavor.scroll_hint(&s.rows, s.query()),
            rows: s.rows.clone(),
            no_matches: s.selection.shows_no_matches(),
            selected: s.selection.selected(),
            suggest_new: s.options.suggest_new.clone(),
        };
        self.presenter.render_list(s.id, &view);
        s.list_visible = true;
    }

    pub fn hide_list(&mut self, s: &mut Session) {
        self.close_detail(s);
        if s.list_visible {
            self.presenter.hide_list(s.id);
            s.list_visible = false;
        }
    }

    fn navigated(&mut self, s: &mut Session, step: Navigation) {
        match step {
            Navigation::Moved(row) => {
                if let Some(item) = s.selection.item(row) {
                    s.text = item.label.clone();
                    self.presenter.set_input_text(s.id, &s.text);
                }
                self.render_list(s);
                self.schedule_flyout(s);
            }
            Navigation::Cleared => {
                self.restore_typed(s);
                self.render_list(s);
                self.close_detail(s);
            }
            Navigation::Stayed => {}
        }
    }

    fn restore_typed(&mut self, s: &mut Session) {
        s.text = s.typed.clone();
        self.presenter.set_input_text(s.id, &s.text);
    }

    fn commit(&mut self, s: &mut Session, item: Candidate) {
        log::debug!("{} selected {:?}", s.id, item.label);
        s.text = item.label.clone();
        s.typed = s.text.clone();
        self.presenter.set_input_text(s.id, &s.text);
        s.debounce.cancel(&mut self.timers);
        self.emit(s.id, HostEvent::Selected { item });
        self.reset(s);
    }

    /// Ask the host to create an entry from the typed text.
    pub fn request_new(&mut self, s: &Session) {
        let text = s.query();
        if text.is_empty() {
            return;
        }
        if let Some(event) = self.flavor.create_new(text) {
            self.emit(s.id, event);
        }
    }

    pub fn emit(&mut self, session: SessionId, event: HostEvent) {
        self.events.push((session, event));
    }

    /// Restart the flyout delay for the current highlight.
    pub fn schedule_flyout(&mut self, s: &mut Session) {
        self.close_detail(s);
        if s.options.flyout && self.details.is_some() && s.selection.selected().is_some() {
            s.flyout = Some(
                self.timers
                    .schedule(FLYOUT_DELAY, self.now, (s.id, TimerKind::Flyout)),
            );
        }
    }

    pub fn close_detail(&mut self, s: &mut Session) {
        self.timers.cancel_slot(&mut s.flyout);
        if let Some(mut join) = s.join.take() {
            join.cancel();
        }
        if s.detail_visible {
            self.presenter.hide_detail(s.id);
            s.detail_visible = false;
        }
    }

    fn open_detail(&mut self, s: &mut Session) {
        let Some(source) = self.details.clone() else {
            return;
        };
        let Some(row) = s.selection.selected() else {
            return;
        };
        let Some(item) = s.selection.item(row).cloned() else {
            return;
        };
        self.next_join += 1;
        let mut join = DetailJoin::new(JoinId::from_raw(self.next_join), row, &item);
        let mut ready = None;
        for kind in DetailKind::ALL {
            let value = match ResourceRef::of(&item, kind) {
                ResourceRef::Inline(value) => value,
                ResourceRef::Absent => DetailValue::absent(kind),
                ResourceRef::Remote(id) => {
                    let key = (kind, id);
                    match self.detail_cache.lookup(s.id, &key) {
                        Lookup::Hit(value) => value,
                        Lookup::InFlight(request) => {
                            log::debug!("{} {kind} {} already in flight as {request}", s.id, key.1);
                            join.expect(kind, key.1);
                            continue;
                        }
                        Lookup::Miss => {
                            let request = self.next_request_id();
                            let id = key.1.clone();
                            self.detail_cache.begin(s.id, key, request);
                            join.expect(kind, id.clone());
                            source.fetch_detail(
                                DetailRequest {
                                    session: s.id,
                                    request,
                                    kind,
                                    id,
                                },
                                self.replier.clone(),
                            );
                            continue;
                        }
                    }
                }
            };
            if let Some(content) = join.receive(value) {
                ready = Some(content);
            }
        }
        s.join = Some(join);
        if let Some(content) = ready {
            self.show_detail(s, content);
        }
    }

    pub fn on_detail(
        &mut self,
        s: &mut Session,
        request: RequestId,
        kind: DetailKind,
        id: String,
        outcome: Result<Value>,
    ) {
        let (value, cacheable) = match (kind, outcome) {
            (DetailKind::Article, Ok(reply)) => {
                let article = parse_article(reply).map(DetailValue::Article);
                (article.clone(), article)
            }
            (DetailKind::Image, Ok(reply)) => {
                let image = DetailValue::Image(parse_image(&reply));
                (Some(image.clone()), Some(image))
            }
            (DetailKind::Article, Err(e)) => {
                log::warn!("{} article {id} failed: {e}", s.id);
                (
                    Some(DetailValue::Article(ARTICLE_ERROR_TEXT.to_string())),
                    None,
                )
            }
            (DetailKind::Image, Err(e)) => {
                log::warn!("{} image {id} failed: {e}", s.id);
                (Some(DetailValue::Image(None)), None)
            }
        };
        let key = (kind, id);
        self.detail_cache.complete(s.id, &key, request, cacheable);

        let Some(join) = s.join.as_mut() else {
            log::debug!("{} no detail pending; dropping {kind} {}", s.id, key.1);
            return;
        };
        if !join.is_awaiting(kind, &key.1) {
            log::debug!("{} {} not waiting on {kind} {}", s.id, join.id(), key.1);
            return;
        }
        let content = match value {
            Some(value) => join.receive(value),
            None => {
                join.cancel();
                s.join = None;
                None
            }
        };
        if let Some(content) = content {
            self.show_detail(s, content);
        }
    }

    /// Render only if the join still matches the highlighted row of a
    /// visible list.
    fn show_detail(&mut self, s: &mut Session, content: DetailContent) {
        let Some(join) = s.join.as_ref() else {
            return;
        };
        let (join_id, row) = (join.id(), join.row());
        let item = s
            .selection
            .item(row)
            .filter(|item| item.id.as_deref() == join.item_id());
        let Some(item) = item.filter(|_| s.list_visible && s.selection.selected() == Some(row))
        else {
            log::debug!("{} {join_id} for row {row} no longer current", s.id);
            return;
        };
        let display = s.rows.get(row);
        let view = DetailView {
            row,
            label: item.label.clone(),
            link: match (&s.options.service_url, &item.id) {
                (Some(base), Some(id)) => Some(format!("{base}/view{}", quote_id(id))),
                _ => None,
            },
            image: content.image,
            types: display.map(|r| r.types.clone()).unwrap_or_default(),
            domains: display.map(|r| r.domains.clone()).unwrap_or_default(),
            blurb: content.article,
        };
        self.presenter.show_detail(s.id, &view);
        s.detail_visible = true;
    }
}
