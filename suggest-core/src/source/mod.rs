//! Candidate and detail collaborators, and the channel their replies travel
//! back on.

pub mod catalog;
pub mod mock;
pub mod provider;

pub use catalog::CatalogSource;
pub use provider::{CandidateSource, DetailSource};

use crate::{cache::RequestId, controller::SessionId, error::Result, flyout::DetailKind};
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub session: SessionId,
    pub request: RequestId,
    /// Trimmed input text ("" for a full enumeration)
    pub query: String,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub session: SessionId,
    pub request: RequestId,
    pub kind: DetailKind,
    pub id: String,
}

/// Work finished off the controller thread, waiting for the next `pump`.
#[derive(Debug)]
pub enum Completion {
    List {
        session: SessionId,
        request: RequestId,
        query: String,
        outcome: Result<Value>,
    },
    Detail {
        session: SessionId,
        request: RequestId,
        kind: DetailKind,
        id: String,
        outcome: Result<Value>,
    },
}

/// Posts completions back to the controller's inbox. Cloned into every
/// background job; once the controller is dropped sends are discarded.
#[derive(Debug, Clone)]
pub struct Replier {
    tx: mpsc::Sender<Completion>,
    cancel: Arc<AtomicBool>,
}

impl Replier {
    pub fn new(tx: mpsc::Sender<Completion>, cancel: Arc<AtomicBool>) -> Self {
        Self { tx, cancel }
    }

    pub fn send(&self, completion: Completion) {
        if self.is_cancelled() {
            return;
        }
        let _ = self.tx.send(completion);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn list(&self, request: &FetchRequest, outcome: Result<Value>) {
        self.send(Completion::List {
            session: request.session,
            request: request.request,
            query: request.query.clone(),
            outcome,
        });
    }

    pub fn detail(&self, request: &DetailRequest, outcome: Result<Value>) {
        self.send(Completion::Detail {
            session: request.session,
            request: request.request,
            kind: request.kind,
            id: request.id.clone(),
            outcome,
        });
    }
}
