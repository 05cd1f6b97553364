use super::{DetailRequest, FetchRequest, Replier};

/// Answers candidate queries. Implementations must not block the caller:
/// do the work elsewhere and post the reply through `replier`.
pub trait CandidateSource: Send + Sync {
    fn fetch(&self, request: FetchRequest, replier: Replier);
}

/// Resolves article text and image references for the detail pane.
pub trait DetailSource: Send + Sync {
    fn fetch_detail(&self, request: DetailRequest, replier: Replier);
}
