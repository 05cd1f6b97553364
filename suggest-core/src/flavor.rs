//! Capability sets plugged into the generic controller.
//!
//! A flavor decides how queries are keyed, how rows are filtered and
//! rendered, and what "create new" means. The state machine is shared.

use crate::{
    candidate::{Candidate, DisplayRow, emphasize},
    command::HostEvent,
    options::{Options, SelectionPolicy},
};

/// Type id left out of the rendered type list; every topic has it.
const COMMON_TOPIC: &str = "/common/topic";

/// Case-insensitive containment; an empty `text` matches everything.
pub fn substring(label: &str, text: &str) -> bool {
    text.is_empty() || label.to_lowercase().contains(&text.to_lowercase())
}

pub trait Flavor: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_options(&self) -> Options;

    /// Cache/staleness key for the current input text.
    fn cache_key(&self, text: &str) -> String;

    /// Skip fetching entirely for an empty input.
    fn requires_text(&self) -> bool;

    fn filter(&self, item: &Candidate, text: &str) -> bool;

    /// Post-process the filtered rows; `all` is the unfiltered reply.
    fn after_filter(&self, filtered: Vec<Candidate>, all: &[Candidate]) -> Vec<Candidate> {
        let _ = all;
        filtered
    }

    fn transform(&self, item: &Candidate, text: &str) -> DisplayRow;

    /// Host event for the "create new" affordance, if the flavor has one.
    fn create_new(&self, text: &str) -> Option<HostEvent>;

    /// Row the presenter should scroll to when the list appears.
    fn scroll_hint(&self, rows: &[DisplayRow], text: &str) -> Option<usize> {
        let _ = (rows, text);
        None
    }
}

/// Free-text search: one cached reply per typed query.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suggest;

impl Flavor for Suggest {
    fn name(&self) -> &'static str {
        "suggest"
    }

    fn default_options(&self) -> Options {
        Options {
            min_len: 1,
            policy: SelectionPolicy::Hard,
            flyout: true,
            limit: 20,
            ..Options::default()
        }
    }

    fn cache_key(&self, text: &str) -> String {
        text.to_string()
    }

    fn requires_text(&self) -> bool {
        true
    }

    fn filter(&self, _item: &Candidate, _text: &str) -> bool {
        true
    }

    fn transform(&self, item: &Candidate, text: &str) -> DisplayRow {
        let types = item
            .field("type")
            .and_then(|t| t.as_array())
            .map(|types| {
                types
                    .iter()
                    .filter(|t| t.get("id").and_then(|id| id.as_str()) != Some(COMMON_TOPIC))
                    .map(|t| match t.as_str() {
                        Some(s) => s.to_string(),
                        None => crate::candidate::label_of(t).to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        DisplayRow {
            emphasis: emphasize(&item.label, text),
            label: item.label.clone(),
            aliases: item.labels("alias"),
            types,
            domains: item.labels("domain"),
            properties: item.labels("properties"),
        }
    }

    fn create_new(&self, text: &str) -> Option<HostEvent> {
        Some(HostEvent::NewItemRequested {
            text: text.to_string(),
        })
    }
}

/// Fixed enumeration: fetched once per session, narrowed locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct Select;

impl Flavor for Select {
    fn name(&self) -> &'static str {
        "select"
    }

    fn default_options(&self) -> Options {
        Options {
            min_len: 0,
            policy: SelectionPolicy::Soft,
            flyout: false,
            limit: 100,
            ..Options::default()
        }
    }

    fn cache_key(&self, _text: &str) -> String {
        String::new()
    }

    fn requires_text(&self) -> bool {
        false
    }

    fn filter(&self, item: &Candidate, text: &str) -> bool {
        substring(&item.label, text)
    }

    /// Nothing matching means show everything rather than an empty list.
    fn after_filter(&self, filtered: Vec<Candidate>, all: &[Candidate]) -> Vec<Candidate> {
        if filtered.is_empty() {
            all.to_vec()
        } else {
            filtered
        }
    }

    fn transform(&self, item: &Candidate, _text: &str) -> DisplayRow {
        DisplayRow::plain(item.label.clone())
    }

    fn create_new(&self, _text: &str) -> Option<HostEvent> {
        None
    }

    fn scroll_hint(&self, rows: &[DisplayRow], text: &str) -> Option<usize> {
        if text.is_empty() {
            return None;
        }
        rows.iter().position(|row| substring(&row.label, text))
    }
}
