//! Per-session request cache with in-flight tracking.
//!
//! One cache is shared by every session of a controller, partitioned by
//! [`SessionId`] so one input's results never answer another's lookups.

use crate::controller::SessionId;
use std::{borrow::Borrow, collections::HashMap, fmt, hash::Hash};

/// Identifies one outbound fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    /// A fetch for this key is already out; wait for it instead of issuing another
    InFlight(RequestId),
    Miss,
}

#[derive(Debug)]
struct Partition<K, V> {
    entries: HashMap<K, V>,
    in_flight: HashMap<K, RequestId>,
}

impl<K, V> Default for Partition<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct RequestCache<K, V> {
    partitions: HashMap<SessionId, Partition<K, V>>,
}

impl<K, V> Default for RequestCache<K, V> {
    fn default() -> Self {
        Self {
            partitions: HashMap::new(),
        }
    }
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, session: SessionId, key: &K) -> Lookup<V> {
        let Some(partition) = self.partitions.get(&session) else {
            return Lookup::Miss;
        };
        if let Some(value) = partition.entries.get(key) {
            return Lookup::Hit(value.clone());
        }
        match partition.in_flight.get(key) {
            Some(request) => Lookup::InFlight(*request),
            None => Lookup::Miss,
        }
    }

    /// Record that `request` is fetching `key` for `session`.
    pub fn begin(&mut self, session: SessionId, key: K, request: RequestId) {
        self.partitions
            .entry(session)
            .or_default()
            .in_flight
            .insert(key, request);
    }

    /// Settle `request`. A successful value is stored; a failure just clears
    /// the in-flight marker so the next lookup misses. Returns false when the
    /// request is not the one in flight for `key` (the partition was flushed
    /// or dropped meanwhile); nothing is stored in that case.
    pub fn complete<Q>(
        &mut self,
        session: SessionId,
        key: &Q,
        request: RequestId,
        value: Option<V>,
    ) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(partition) = self.partitions.get_mut(&session) else {
            return false;
        };
        if partition.in_flight.get(key) != Some(&request) {
            return false;
        }
        if let Some((key, _)) = partition.in_flight.remove_entry(key)
            && let Some(value) = value
        {
            partition.entries.insert(key, value);
        }
        true
    }

    /// Forget everything cached or in flight for `session`.
    pub fn flush(&mut self, session: SessionId) {
        self.partitions.remove(&session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(n: u64) -> SessionId {
        SessionId::from_raw(n)
    }

    #[test]
    fn miss_then_in_flight_then_hit() {
        let mut cache: RequestCache<String, u32> = RequestCache::new();
        let key = "lin".to_string();
        assert_eq!(cache.lookup(sid(1), &key), Lookup::Miss);

        cache.begin(sid(1), key.clone(), RequestId(1));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::InFlight(RequestId(1)));

        assert!(cache.complete(sid(1), &key, RequestId(1), Some(42)));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::Hit(42));
    }

    #[test]
    fn partitions_do_not_leak_between_sessions() {
        let mut cache: RequestCache<String, u32> = RequestCache::new();
        let key = "lin".to_string();
        cache.begin(sid(1), key.clone(), RequestId(1));
        assert_eq!(cache.lookup(sid(2), &key), Lookup::Miss);
        cache.complete(sid(1), &key, RequestId(1), Some(1));
        assert_eq!(cache.lookup(sid(2), &key), Lookup::Miss);
    }

    #[test]
    fn failed_request_clears_in_flight_without_storing() {
        let mut cache: RequestCache<String, u32> = RequestCache::new();
        let key = "lin".to_string();
        cache.begin(sid(1), key.clone(), RequestId(3));
        assert!(cache.complete(sid(1), &key, RequestId(3), None));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::Miss);
    }

    #[test]
    fn completion_after_flush_is_ignored() {
        let mut cache: RequestCache<String, u32> = RequestCache::new();
        let key = "lin".to_string();
        cache.begin(sid(1), key.clone(), RequestId(3));
        cache.flush(sid(1));
        assert!(!cache.complete(sid(1), &key, RequestId(3), Some(9)));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::Miss);
    }

    #[test]
    fn completion_from_superseded_request_is_ignored() {
        let mut cache: RequestCache<String, u32> = RequestCache::new();
        let key = "lin".to_string();
        cache.begin(sid(1), key.clone(), RequestId(1));
        cache.flush(sid(1));
        cache.begin(sid(1), key.clone(), RequestId(2));
        assert!(!cache.complete(sid(1), &key, RequestId(1), Some(1)));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::InFlight(RequestId(2)));
        assert!(cache.complete(sid(1), &key, RequestId(2), Some(2)));
        assert_eq!(cache.lookup(sid(1), &key), Lookup::Hit(2));
    }
}
