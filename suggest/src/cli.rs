use serde::Serialize;
use std::{
    fmt::Write,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use suggest_core::{
    Candidate, Config, Controller, SessionId, State, SuggestError, source::CatalogSource,
};
use suggest_tui::{TerminalPresenter, filter::overrides_from_config};

const QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const QUERY_TICK: Duration = Duration::from_millis(10);

pub type CliResult<T> = Result<T, CliError>;

/// Error reported on stderr. Code 1 is a usage problem, code 2 a config or
/// system failure.
#[derive(Debug, Clone)]
pub struct CliError {
    message: String,
    code: u8,
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 2,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> u8 {
        self.code
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(value: anyhow::Error) -> Self {
        Self::system(value.to_string())
    }
}

impl From<SuggestError> for CliError {
    fn from(value: SuggestError) -> Self {
        Self::system(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub text: String,
    pub limit: Option<usize>,
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct CandidateOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    label: String,
}

impl From<&Candidate> for CandidateOutput {
    fn from(item: &Candidate) -> Self {
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
        }
    }
}

pub fn load_catalog(config: &Config) -> CliResult<Arc<CatalogSource>> {
    let path = config.catalog_path()?;
    let catalog = CatalogSource::from_path(&path)?.with_latency(config.latency());
    log::debug!("loaded {} candidates from {}", catalog.len(), path.display());
    Ok(Arc::new(catalog))
}

/// Type `args.text` into a fresh session and wait for the list to settle.
pub fn cmd_query(config: &Config, args: &QueryArgs) -> CliResult<()> {
    let catalog = load_catalog(config)?;
    let mut controller = Controller::new(
        config.flavor().build(),
        catalog,
        TerminalPresenter::default(),
    );
    let mut overrides = overrides_from_config(&config.options).initialize(true);
    if let Some(limit) = args.limit {
        overrides = overrides.limit(limit);
    }
    let session = controller
        .bind(&overrides)
        .map_err(|e| CliError::user(e.to_string()))?;

    controller.text_changed(session, &args.text, Instant::now())?;
    let items: Vec<CandidateOutput> = settle(&mut controller, session)?
        .iter()
        .map(CandidateOutput::from)
        .collect();

    if args.json {
        print_json(&items)?;
    } else {
        print!("{}", format_candidates(&items));
    }
    Ok(())
}

/// Pump until the session shows a list, or goes idle with nothing pending.
fn settle(
    controller: &mut Controller<TerminalPresenter>,
    session: SessionId,
) -> CliResult<Vec<Candidate>> {
    let deadline = Instant::now() + QUERY_TIMEOUT;
    loop {
        let now = Instant::now();
        controller.pump(now);
        match controller.state(session)? {
            State::Selecting => return Ok(controller.items(session)?.to_vec()),
            State::Start if controller.next_deadline().is_none() => return Ok(Vec::new()),
            _ => {}
        }
        if now >= deadline {
            return Err(CliError::system("timed out waiting for candidates"));
        }
        thread::sleep(controller.poll_timeout(now, QUERY_TICK));
    }
}

fn format_candidates(items: &[CandidateOutput]) -> String {
    let width = items.iter().map(|item| item.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for item in items {
        match &item.id {
            Some(id) => {
                let _ = writeln!(out, "{:<width$}  {id}", item.label);
            }
            None => {
                let _ = writeln!(out, "{}", item.label);
            }
        }
    }
    out
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!(
        "{}",
        serde_json::to_string(value).map_err(|e| CliError::system(e.to_string()))?
    );
    Ok(())
}

pub fn print_error(error: &CliError, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": error.message() });
        eprintln!("{payload}");
    } else {
        eprintln!("{}", error.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use suggest_core::config::load_config_from_str;

    fn config_with_catalog(dir: &tempfile::TempDir, extra: &str) -> Config {
        let catalog = dir.path().join("presidents.json");
        std::fs::write(
            &catalog,
            json!([
                {"id": "/en/abraham_lincoln", "name": "Abraham Lincoln"},
                {"id": "/en/lincoln_chafee", "name": "Lincoln Chafee"},
                {"id": "/en/ulysses_grant", "name": "Ulysses S. Grant"}
            ])
            .to_string(),
        )
        .unwrap();
        load_config_from_str(&format!(
            "[source]\ncatalog = \"{}\"\n{extra}",
            catalog.display()
        ))
        .unwrap()
    }

    fn settle_query(config: &Config, text: &str) -> Vec<String> {
        let catalog = load_catalog(config).unwrap();
        let mut controller =
            Controller::new(config.flavor().build(), catalog, TerminalPresenter::default());
        let overrides = overrides_from_config(&config.options).initialize(true);
        let session = controller.bind(&overrides).unwrap();
        controller
            .text_changed(session, text, Instant::now())
            .unwrap();
        settle(&mut controller, session)
            .unwrap()
            .into_iter()
            .map(|item| item.label)
            .collect()
    }

    #[test]
    fn settles_on_matching_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_catalog(&dir, "");
        let labels = settle_query(&config, "lin");
        assert_eq!(labels, vec!["Lincoln Chafee", "Abraham Lincoln"]);
    }

    #[test]
    fn short_text_settles_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_catalog(&dir, "[options]\nmin_len = 3");
        assert!(settle_query(&config, "li").is_empty());
    }

    #[test]
    fn select_flavor_filters_whole_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_catalog(&dir, "flavor = \"select\"");
        assert_eq!(settle_query(&config, "grant"), vec!["Ulysses S. Grant"]);
    }

    #[test]
    fn missing_source_is_a_system_error() {
        let config = load_config_from_str("").unwrap();
        let err = load_catalog(&config).unwrap_err();
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn format_candidates_aligns_ids() {
        let rows = vec![
            CandidateOutput {
                id: Some("/en/grant".to_string()),
                label: "Grant".to_string(),
            },
            CandidateOutput {
                id: None,
                label: "Lincoln".to_string(),
            },
        ];
        assert_eq!(format_candidates(&rows), "Grant    /en/grant\nLincoln\n");
    }
}
