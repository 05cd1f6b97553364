use super::{CandidateSource, DetailRequest, DetailSource, FetchRequest, Replier};
use crate::{
    candidate::{OK_STATUS, label_of},
    error::{Result, SuggestError},
    flyout::DetailKind,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{collections::HashMap, fs, path::Path, sync::Arc, thread, time::Duration};

const NOT_FOUND_CODE: &str = "/api/status/error/not_found";

/// On disk a catalog is either a bare list of items or an object with
/// separate article and image tables keyed by id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Items(Vec<Value>),
    Tables {
        items: Vec<Value>,
        #[serde(default)]
        articles: HashMap<String, String>,
        #[serde(default)]
        images: HashMap<String, String>,
    },
}

#[derive(Debug, Default)]
struct Catalog {
    items: Vec<Value>,
    articles: HashMap<String, String>,
    images: HashMap<String, String>,
}

/// A local JSON catalog answering like a remote service: each request runs
/// on its own worker thread, optionally after a simulated latency.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    catalog: Arc<Catalog>,
    latency: Duration,
}

impl CatalogSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let catalog = match serde_json::from_str(contents)? {
            CatalogFile::Items(items) => Catalog {
                items,
                ..Catalog::default()
            },
            CatalogFile::Tables {
                items,
                articles,
                images,
            } => Catalog {
                items,
                articles,
                images,
            },
        };
        log::debug!("catalog loaded: {} items", catalog.items.len());
        Ok(Self {
            catalog: Arc::new(catalog),
            latency: Duration::ZERO,
        })
    }

    pub fn from_items(items: Vec<Value>) -> Self {
        Self {
            catalog: Arc::new(Catalog {
                items,
                ..Catalog::default()
            }),
            latency: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn len(&self) -> usize {
        self.catalog.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.items.is_empty()
    }

    /// Prefix matches first, then other substring matches, each in catalog
    /// order. An empty query matches everything.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Value> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.catalog.items.iter().take(limit).cloned().collect();
        }
        let (mut prefix, mut inner) = (Vec::new(), Vec::new());
        for item in &self.catalog.items {
            let label = label_of(item).to_lowercase();
            if label.starts_with(&query) {
                prefix.push(item);
            } else if label.contains(&query) {
                inner.push(item);
            }
        }
        prefix
            .into_iter()
            .chain(inner)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn lookup(&self, kind: DetailKind, id: &str) -> Result<Value> {
        let table = match kind {
            DetailKind::Article => &self.catalog.articles,
            DetailKind::Image => &self.catalog.images,
        };
        let Some(found) = table.get(id) else {
            return Err(SuggestError::Service {
                code: NOT_FOUND_CODE.to_string(),
                message: format!("no {kind} for {id}"),
            });
        };
        Ok(match kind {
            DetailKind::Article => json!({"status": OK_STATUS, "result": {"body": found}}),
            DetailKind::Image => Value::String(found.clone()),
        })
    }

    fn spawn(&self, replier: Replier, job: impl FnOnce(&Self, &Replier) + Send + 'static) {
        let source = self.clone();
        thread::spawn(move || {
            if !source.latency.is_zero() {
                thread::sleep(source.latency);
            }
            if replier.is_cancelled() {
                return;
            }
            job(&source, &replier);
        });
    }
}

impl CandidateSource for CatalogSource {
    fn fetch(&self, request: FetchRequest, replier: Replier) {
        self.spawn(replier, move |source, replier| {
            let items = source.search(&request.query, request.limit);
            replier.list(
                &request,
                Ok(json!({"status": OK_STATUS, "result": items})),
            );
        });
    }
}

impl DetailSource for CatalogSource {
    fn fetch_detail(&self, request: DetailRequest, replier: Replier) {
        self.spawn(replier, move |source, replier| {
            replier.detail(&request, source.lookup(request.kind, &request.id));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::RequestId,
        candidate::{ListReply, parse_reply},
        controller::SessionId,
        source::Completion,
    };
    use std::sync::{Arc, atomic::AtomicBool, mpsc};

    fn presidents() -> CatalogSource {
        CatalogSource::from_items(vec![
            json!({"id": "/m/grant", "name": "Ulysses S. Grant"}),
            json!({"id": "/m/lincoln", "name": "Abraham Lincoln"}),
            json!({"id": "/m/lincoln_ne", "name": "Lincoln, Nebraska"}),
            json!({"id": "/m/lindbergh", "name": "Charles Lindbergh"}),
        ])
    }

    fn names(items: &[Value]) -> Vec<&str> {
        items.iter().map(label_of).collect()
    }

    #[test]
    fn prefix_matches_come_first() {
        let found = presidents().search("Lin", 10);
        assert_eq!(
            names(&found),
            vec!["Lincoln, Nebraska", "Abraham Lincoln", "Charles Lindbergh"]
        );
    }

    #[test]
    fn empty_query_lists_everything_up_to_limit() {
        assert_eq!(presidents().search("", 2).len(), 2);
        assert_eq!(presidents().search("  ", 10).len(), 4);
    }

    #[test]
    fn reads_tables_form() {
        let source = CatalogSource::from_json(
            r#"{
                "items": [{"id": "/m/a", "name": "A", "article": {"id": "/m/a"}}],
                "articles": {"/m/a": "The first letter."},
                "images": {"/m/a": "a.png"}
            }"#,
        )
        .unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(
            source.lookup(DetailKind::Article, "/m/a").unwrap(),
            json!({"status": "200 OK", "result": {"body": "The first letter."}})
        );
        assert_eq!(
            source.lookup(DetailKind::Image, "/m/a").unwrap(),
            json!("a.png")
        );
        assert!(matches!(
            source.lookup(DetailKind::Image, "/m/b"),
            Err(SuggestError::Service { .. })
        ));
    }

    #[test]
    fn rejects_non_catalog_json() {
        assert!(matches!(
            CatalogSource::from_json("42"),
            Err(SuggestError::Json(_))
        ));
    }

    #[test]
    fn fetch_replies_on_worker_thread_with_envelope() {
        let (tx, rx) = mpsc::channel();
        let replier = Replier::new(tx, Arc::new(AtomicBool::new(false)));
        presidents().fetch(
            FetchRequest {
                session: SessionId::from_raw(1),
                request: RequestId::from_raw(1),
                query: "grant".into(),
                limit: 5,
            },
            replier,
        );
        let completion = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let Completion::List { outcome, .. } = completion else {
            panic!("expected a list completion");
        };
        let ListReply::Items(items) = parse_reply(outcome.unwrap()).unwrap() else {
            panic!("expected items");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_deref(), Some("/m/grant"));
    }
}
