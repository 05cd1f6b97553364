use super::{CandidateSource, DetailRequest, DetailSource, FetchRequest, Replier};
use crate::{error::SuggestError, flyout::DetailKind};
use serde_json::Value;
use std::sync::Mutex;

/// Candidate source that holds every request until the test answers it.
#[derive(Debug, Default)]
pub struct MockCandidateSource {
    pub calls: Mutex<Vec<FetchRequest>>,
    pending: Mutex<Vec<(FetchRequest, Replier)>>,
}

impl MockCandidateSource {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.query.clone())
            .collect()
    }

    /// Answer only the oldest pending request for `query`.
    pub fn resolve_oldest(&self, query: &str, reply: &Value) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(at) = pending.iter().position(|(request, _)| request.query == query) else {
            return false;
        };
        let (request, replier) = pending.remove(at);
        drop(pending);
        replier.list(&request, Ok(reply.clone()));
        true
    }

    /// Answer every pending request for `query`. Returns how many were answered.
    pub fn resolve(&self, query: &str, reply: &Value) -> usize {
        let taken = self.take(query);
        for (request, replier) in &taken {
            replier.list(request, Ok(reply.clone()));
        }
        taken.len()
    }

    pub fn fail(&self, query: &str, make_error: impl Fn() -> SuggestError) -> usize {
        let taken = self.take(query);
        for (request, replier) in &taken {
            replier.list(request, Err(make_error()));
        }
        taken.len()
    }

    fn take(&self, query: &str) -> Vec<(FetchRequest, Replier)> {
        let mut pending = self.pending.lock().unwrap();
        let (matched, rest) = pending
            .drain(..)
            .partition(|(request, _)| request.query == query);
        *pending = rest;
        matched
    }
}

impl CandidateSource for MockCandidateSource {
    fn fetch(&self, request: FetchRequest, replier: Replier) {
        self.calls.lock().unwrap().push(request.clone());
        self.pending.lock().unwrap().push((request, replier));
    }
}

#[derive(Debug, Default)]
pub struct MockDetailSource {
    pub calls: Mutex<Vec<DetailRequest>>,
    pending: Mutex<Vec<(DetailRequest, Replier)>>,
}

impl MockDetailSource {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn resolve(&self, kind: DetailKind, id: &str, reply: &Value) -> usize {
        let taken = self.take(kind, id);
        for (request, replier) in &taken {
            replier.detail(request, Ok(reply.clone()));
        }
        taken.len()
    }

    pub fn fail(&self, kind: DetailKind, id: &str) -> usize {
        let taken = self.take(kind, id);
        for (request, replier) in &taken {
            replier.detail(
                request,
                Err(SuggestError::Transport("connection reset".to_string())),
            );
        }
        taken.len()
    }

    fn take(&self, kind: DetailKind, id: &str) -> Vec<(DetailRequest, Replier)> {
        let mut pending = self.pending.lock().unwrap();
        let (matched, rest) = pending
            .drain(..)
            .partition(|(request, _)| request.kind == kind && request.id == id);
        *pending = rest;
        matched
    }
}

impl DetailSource for MockDetailSource {
    fn fetch_detail(&self, request: DetailRequest, replier: Replier) {
        self.calls.lock().unwrap().push(request.clone());
        self.pending.lock().unwrap().push((request, replier));
    }
}
