//! Detail pane ("flyout") loading: the pane is shown only once both the
//! article and the image for the highlighted candidate have resolved.

use crate::candidate::Candidate;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const ARTICLE_ERROR_TEXT: &str = "Description could not be displayed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    Article,
    Image,
}

impl DetailKind {
    pub const ALL: [Self; 2] = [Self::Article, Self::Image];

    /// Payload field holding the resource reference.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Image => "image",
        }
    }

    const fn slot(self) -> Slots {
        match self {
            Self::Article => Slots::ARTICLE,
            Self::Image => Slots::IMAGE,
        }
    }
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Slots: u8 {
        const ARTICLE = 1;
        const IMAGE = 1 << 1;
    }
}

/// A resolved detail resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailValue {
    /// Description text (may be empty)
    Article(String),
    /// Image source; `None` when there is nothing to show
    Image(Option<String>),
}

impl DetailValue {
    pub fn kind(&self) -> DetailKind {
        match self {
            Self::Article(_) => DetailKind::Article,
            Self::Image(_) => DetailKind::Image,
        }
    }

    /// Value used when the candidate has no reference for `kind`.
    pub fn absent(kind: DetailKind) -> Self {
        match kind {
            DetailKind::Article => Self::Article(String::new()),
            DetailKind::Image => Self::Image(None),
        }
    }

    fn inline(kind: DetailKind, value: &Value) -> Self {
        let text = match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        };
        match kind {
            DetailKind::Article => Self::Article(text.unwrap_or_default()),
            DetailKind::Image => Self::Image(text),
        }
    }
}

/// Where a candidate's detail resource comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// Embedded in the payload; no fetch needed
    Inline(DetailValue),
    /// Fetch by identifier
    Remote(String),
    Absent,
}

impl ResourceRef {
    /// `{"value": ..}` is inline, `{"id": ..}` or a bare string is remote.
    pub fn of(item: &Candidate, kind: DetailKind) -> Self {
        match item.field(kind.field()) {
            Some(Value::Object(map)) => {
                if let Some(value) = map.get("value") {
                    Self::Inline(DetailValue::inline(kind, value))
                } else if let Some(Value::String(id)) = map.get("id") {
                    Self::Remote(id.clone())
                } else {
                    Self::Absent
                }
            }
            Some(Value::String(id)) if !id.is_empty() => Self::Remote(id.clone()),
            _ => Self::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinId(u64);

impl JoinId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for JoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "j{}", self.0)
    }
}

/// Both resources, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailContent {
    pub article: String,
    pub image: Option<String>,
}

/// Barrier over the article and image loads of one highlighted row.
///
/// The join remembers which row and item it was created for so the owner can
/// check the highlight is unchanged before rendering. It reports completion
/// exactly once; after [`DetailJoin::cancel`] it accepts nothing.
#[derive(Debug, Clone)]
pub struct DetailJoin {
    id: JoinId,
    row: usize,
    item_id: Option<String>,
    awaiting: Vec<(DetailKind, String)>,
    article: Option<String>,
    image: Option<Option<String>>,
    filled: Slots,
    done: bool,
}

impl DetailJoin {
    pub fn new(id: JoinId, row: usize, item: &Candidate) -> Self {
        Self {
            id,
            row,
            item_id: item.id.clone(),
            awaiting: Vec::new(),
            article: None,
            image: None,
            filled: Slots::empty(),
            done: false,
        }
    }

    pub fn id(&self) -> JoinId {
        self.id
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn filled(&self) -> Slots {
        self.filled
    }

    /// Mark `kind` as waiting on a fetch of `id`.
    pub fn expect(&mut self, kind: DetailKind, id: String) {
        self.awaiting.push((kind, id));
    }

    pub fn is_awaiting(&self, kind: DetailKind, id: &str) -> bool {
        self.awaiting.iter().any(|(k, i)| *k == kind && i == id)
    }

    /// Fill a slot. Returns the content the first time both slots are full.
    pub fn receive(&mut self, value: DetailValue) -> Option<DetailContent> {
        if self.done {
            return None;
        }
        let kind = value.kind();
        self.awaiting.retain(|(k, _)| *k != kind);
        match value {
            DetailValue::Article(text) => self.article = Some(text),
            DetailValue::Image(src) => self.image = Some(src),
        }
        self.filled |= kind.slot();
        if !self.filled.is_all() {
            return None;
        }
        self.done = true;
        Some(DetailContent {
            article: self.article.clone().unwrap_or_default(),
            image: self.image.clone().flatten(),
        })
    }

    /// Detach pending loads; later resolutions are ignored.
    pub fn cancel(&mut self) {
        self.done = true;
        self.awaiting.clear();
    }
}

/// Article replies are plain text or a `{status, result: {body}}` envelope.
/// A non-OK envelope yields `None`: the pane stays hidden.
pub fn parse_article(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Object(map) => {
            if map.get("status").and_then(Value::as_str) != Some(crate::candidate::OK_STATUS) {
                log::error!(
                    "article reply not OK: code={}",
                    map.get("code").and_then(Value::as_str).unwrap_or_default()
                );
                return None;
            }
            map.get("result")
                .and_then(|r| r.get("body"))
                .and_then(Value::as_str)
                .map(String::from)
        }
        _ => None,
    }
}

/// Image replies are the image source string.
pub fn parse_image(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(String::from)
}

/// Path form of an id for detail links: ids already starting with `/` pass
/// through, anything else is percent-encoded behind a leading `/`.
pub fn quote_id(id: &str) -> String {
    if id.starts_with('/') {
        return id.to_string();
    }
    let mut quoted = String::with_capacity(id.len() + 1);
    quoted.push('/');
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            quoted.push(char::from(byte));
        } else {
            quoted.push_str(&format!("%{byte:02X}"));
        }
    }
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(payload: Value) -> Candidate {
        Candidate::from_value(payload)
    }

    #[test]
    fn resource_refs_follow_payload_shape() {
        let c = item(json!({
            "id": "/en/lincoln",
            "article": {"id": "/guid/1"},
            "image": {"value": "http://img/1.png"}
        }));
        assert_eq!(
            ResourceRef::of(&c, DetailKind::Article),
            ResourceRef::Remote("/guid/1".into())
        );
        assert_eq!(
            ResourceRef::of(&c, DetailKind::Image),
            ResourceRef::Inline(DetailValue::Image(Some("http://img/1.png".into())))
        );

        let bare = item(json!({"article": "/guid/2"}));
        assert_eq!(
            ResourceRef::of(&bare, DetailKind::Article),
            ResourceRef::Remote("/guid/2".into())
        );
        assert_eq!(ResourceRef::of(&bare, DetailKind::Image), ResourceRef::Absent);
    }

    #[test]
    fn image_alone_does_not_complete() {
        let c = item(json!({"id": "a"}));
        let mut join = DetailJoin::new(JoinId(1), 0, &c);
        assert_eq!(join.id().to_string(), "j1");
        assert!(join.receive(DetailValue::Image(Some("x.png".into()))).is_none());
        assert_eq!(join.filled(), Slots::IMAGE);
    }

    #[test]
    fn both_slots_complete_exactly_once() {
        let c = item(json!({"id": "a"}));
        let mut join = DetailJoin::new(JoinId(1), 0, &c);
        join.receive(DetailValue::Image(Some("x.png".into())));
        let content = join.receive(DetailValue::Article("blurb".into())).unwrap();
        assert_eq!(content.article, "blurb");
        assert_eq!(content.image.as_deref(), Some("x.png"));
        assert!(join.receive(DetailValue::Article("again".into())).is_none());
    }

    #[test]
    fn cancelled_join_ignores_resolutions() {
        let c = item(json!({"id": "a"}));
        let mut join = DetailJoin::new(JoinId(1), 0, &c);
        join.expect(DetailKind::Article, "/guid/1".into());
        join.cancel();
        assert!(!join.is_awaiting(DetailKind::Article, "/guid/1"));
        join.receive(DetailValue::Image(None));
        assert!(join.receive(DetailValue::Article(String::new())).is_none());
    }

    #[test]
    fn article_envelope_parsing() {
        assert_eq!(parse_article(json!("plain")), Some("plain".into()));
        assert_eq!(
            parse_article(json!({"status": "200 OK", "result": {"body": "b"}})),
            Some("b".into())
        );
        assert_eq!(parse_article(json!({"status": "404 Not Found"})), None);
    }

    #[test]
    fn quote_id_encodes_bare_ids() {
        assert_eq!(quote_id("/en/lincoln"), "/en/lincoln");
        assert_eq!(quote_id("#9202a8c04000641f8"), "/%239202a8c04000641f8");
        assert_eq!(quote_id("a b"), "/a%20b");
    }
}
