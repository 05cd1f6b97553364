use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use std::sync::Arc;
use suggest_core::{
    Candidate, OptionsOverride,
    config::{FilterMode, OptionsConfig},
    options::FilterFn,
};

/// Keeps candidates whose label fuzzy-matches the typed text. Empty text
/// keeps everything.
pub fn fuzzy_filter() -> FilterFn {
    let matcher = SkimMatcherV2::default();
    Arc::new(move |item: &Candidate, text: &str| {
        text.is_empty() || matcher.fuzzy_match(&item.label, text).is_some()
    })
}

/// Session overrides from config, with the fuzzy filter installed when asked for.
pub fn overrides_from_config(options: &OptionsConfig) -> OptionsOverride {
    let mut overrides = options.to_override();
    if options.filter == Some(FilterMode::Fuzzy) {
        overrides.filter = Some(fuzzy_filter());
    }
    overrides
}
