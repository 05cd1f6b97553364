use crate::error::{Result, SuggestError};
use serde::Serialize;
use serde_json::Value;
use std::ops::Range;

pub const OK_STATUS: &str = "200 OK";
pub const TIMED_OUT_CODE: &str = "/api/status/timedout";
const UNKNOWN_LABEL: &str = "unknown";

/// One candidate as received from the source. The payload is kept verbatim
/// so hosts get back exactly what the service sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: Option<String>,
    pub label: String,
    /// Position in the displayed list
    pub index: usize,
    pub payload: Value,
}

impl Candidate {
    pub fn from_value(payload: Value) -> Self {
        Self {
            id: match payload.get("id") {
                Some(Value::String(id)) => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            },
            label: label_of(&payload).to_string(),
            index: 0,
            payload,
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Labels of an array field whose entries are strings or `{text|name}` objects.
    pub fn labels(&self, key: &str) -> Vec<String> {
        let Some(Value::Array(entries)) = self.field(key) else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| match entry {
                Value::String(s) => s.clone(),
                other => label_of(other).to_string(),
            })
            .collect()
    }
}

/// `text` wins over `name`; anything without either is "unknown".
pub fn label_of(value: &Value) -> &str {
    value
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| value.get("name").and_then(Value::as_str))
        .unwrap_or(UNKNOWN_LABEL)
}

/// Display form of a candidate, produced by the flavor's (or the options')
/// transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub label: String,
    /// Byte range of `label` matching the typed text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Range<usize>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

impl DisplayRow {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Case-insensitive first occurrence of `needle` in `text`, as a byte range
/// into `text`.
pub fn emphasize(text: &str, needle: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return None;
    }
    for (start, _) in text.char_indices() {
        let mut chars = text[start..].char_indices();
        let mut end = start;
        let matched = needle.iter().all(|n| match chars.next() {
            Some((offset, c)) if c.to_lowercase().eq(n.to_lowercase()) => {
                end = start + offset + c.len_utf8();
                true
            }
            _ => false,
        });
        if matched {
            return Some(start..end);
        }
    }
    None
}

/// Parsed reply from a candidate source.
#[derive(Debug, Clone, PartialEq)]
pub enum ListReply {
    Items(Vec<Candidate>),
    TimedOut,
}

/// Accepts a bare array, or an envelope. Envelope shapes are tried in order:
/// non-OK `status`, timed-out `code`, `list.listItems`, `result`, `results`,
/// `query.result`.
pub fn parse_reply(mut value: Value) -> Result<ListReply> {
    let map = match &mut value {
        Value::Array(items) => return Ok(ListReply::Items(candidates(std::mem::take(items)))),
        Value::Object(map) => map,
        other => {
            return Err(SuggestError::MalformedResponse(format!(
                "expected a list or an object, got {}",
                kind_of(other)
            )));
        }
    };

    if let Some(status) = map.get("status")
        && status.as_str() != Some(OK_STATUS)
    {
        return Err(SuggestError::Service {
            code: map
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: map
                .get("messages")
                .map_or_else(|| status.to_string(), Value::to_string),
        });
    }

    if map.get("code").and_then(Value::as_str) == Some(TIMED_OUT_CODE) {
        return Ok(ListReply::TimedOut);
    }

    let found = if let Some(items) = map.get_mut("list").and_then(|l| l.get_mut("listItems")) {
        Some(("list.listItems", items.take()))
    } else if let Some(items) = map.get_mut("result") {
        Some(("result", items.take()))
    } else if let Some(items) = map.get_mut("results") {
        Some(("results", items.take()))
    } else {
        map.get_mut("query")
            .and_then(|q| q.get_mut("result"))
            .map(|items| ("query.result", items.take()))
    };

    match found {
        Some((_, Value::Array(items))) => Ok(ListReply::Items(candidates(items))),
        Some((key, other)) => Err(SuggestError::MalformedResponse(format!(
            "`{key}` is {}, expected a list",
            kind_of(&other)
        ))),
        None => Err(SuggestError::MalformedResponse(
            "unrecognized list result".to_string(),
        )),
    }
}

fn candidates(items: Vec<Value>) -> Vec<Candidate> {
    items.into_iter().map(Candidate::from_value).collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(reply: ListReply) -> Vec<String> {
        match reply {
            ListReply::Items(items) => items.into_iter().map(|c| c.label).collect(),
            ListReply::TimedOut => panic!("expected items"),
        }
    }

    #[test]
    fn label_prefers_text_over_name() {
        assert_eq!(label_of(&json!({"text": "T", "name": "N"})), "T");
        assert_eq!(label_of(&json!({"name": "N"})), "N");
        assert_eq!(label_of(&json!({"id": "/x"})), "unknown");
    }

    #[test]
    fn bare_list_is_accepted() {
        let reply = parse_reply(json!([{"id": 1, "name": "Lincoln"}])).unwrap();
        let ListReply::Items(items) = reply else {
            panic!("expected items");
        };
        assert_eq!(items[0].id.as_deref(), Some("1"));
        assert_eq!(items[0].label, "Lincoln");
    }

    #[test]
    fn envelope_shapes_in_precedence_order() {
        let list = json!({"status": "200 OK", "list": {"listItems": [{"name": "a"}]}, "result": [{"name": "b"}]});
        assert_eq!(labels(parse_reply(list).unwrap()), vec!["a"]);

        let result = json!({"result": [{"name": "b"}], "results": [{"name": "c"}]});
        assert_eq!(labels(parse_reply(result).unwrap()), vec!["b"]);

        let results = json!({"results": [{"name": "c"}]});
        assert_eq!(labels(parse_reply(results).unwrap()), vec!["c"]);

        let query = json!({"query": {"result": [{"name": "d"}]}});
        assert_eq!(labels(parse_reply(query).unwrap()), vec!["d"]);
    }

    #[test]
    fn timed_out_code_is_reported() {
        let reply = parse_reply(json!({"status": "200 OK", "code": TIMED_OUT_CODE})).unwrap();
        assert_eq!(reply, ListReply::TimedOut);
    }

    #[test]
    fn non_ok_status_is_a_service_error() {
        let err = parse_reply(json!({"status": "500 Error", "code": "/api/status/error"}))
            .unwrap_err();
        assert!(matches!(err, SuggestError::Service { ref code, .. } if code == "/api/status/error"));
    }

    #[test]
    fn unrecognized_shape_is_malformed() {
        let err = parse_reply(json!({"status": "200 OK", "items": []})).unwrap_err();
        assert!(matches!(err, SuggestError::MalformedResponse(_)));
        let err = parse_reply(json!("nope")).unwrap_err();
        assert!(matches!(err, SuggestError::MalformedResponse(_)));
        let err = parse_reply(json!({"result": {"name": "x"}})).unwrap_err();
        assert!(err.to_string().contains("`result`"), "{err}");
    }

    #[test]
    fn candidate_carries_id_and_array_labels() {
        let c = Candidate::from_value(json!({
            "id": "/en/lincoln",
            "name": "Lincoln",
            "type": [{"id": "/people/person", "name": "Person"}, "Politician"]
        }));
        assert_eq!(c.id.as_deref(), Some("/en/lincoln"));
        assert_eq!(c.labels("type"), vec!["Person", "Politician"]);
        assert!(c.labels("alias").is_empty());
    }

    #[test]
    fn emphasize_is_case_insensitive() {
        assert_eq!(emphasize("Abraham Lincoln", "lin"), Some(8..11));
        assert_eq!(emphasize("Lincoln", "LIN"), Some(0..3));
        assert_eq!(emphasize("Lincoln", "xyz"), None);
        assert_eq!(emphasize("Lincoln", ""), None);
    }

    #[test]
    fn emphasize_respects_multibyte_boundaries() {
        let text = "Über Zürich";
        let range = emphasize(text, "zü").unwrap();
        assert_eq!(&text[range], "Zü");
    }
}
