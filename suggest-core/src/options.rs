use crate::{
    candidate::{Candidate, DisplayRow},
    error::{Result, SuggestError},
};
use std::{fmt, sync::Arc};

pub use crate::selection::SelectionPolicy;

pub type FilterFn = Arc<dyn Fn(&Candidate, &str) -> bool + Send + Sync>;
pub type TransformFn = Arc<dyn Fn(&Candidate, &str) -> DisplayRow + Send + Sync>;

/// Resolved per-session options: flavor defaults with overrides applied.
#[derive(Clone)]
pub struct Options {
    /// Shortest trimmed input (in graphemes) that triggers a fetch
    pub min_len: usize,
    pub policy: SelectionPolicy,
    /// Show the detail pane for the highlighted row
    pub flyout: bool,
    /// Shown in place of the list when the service times out
    pub timeout_content: Option<String>,
    /// Label of the "create new" affordance; `None` disables it
    pub suggest_new: Option<String>,
    pub limit: usize,
    /// Activate the input at bind time instead of waiting for focus
    pub initialize: bool,
    /// Base URL for detail links
    pub service_url: Option<String>,
    /// Replaces the flavor's filter
    pub filter: Option<FilterFn>,
    /// Replaces the flavor's transform
    pub transform: Option<TransformFn>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_len: 1,
            policy: SelectionPolicy::Hard,
            flyout: true,
            timeout_content: None,
            suggest_new: None,
            limit: 20,
            initialize: false,
            service_url: None,
            filter: None,
            transform: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("min_len", &self.min_len)
            .field("policy", &self.policy)
            .field("flyout", &self.flyout)
            .field("timeout_content", &self.timeout_content)
            .field("suggest_new", &self.suggest_new)
            .field("limit", &self.limit)
            .field("initialize", &self.initialize)
            .field("service_url", &self.service_url)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Caller-supplied overrides; `None` keeps the default.
#[derive(Clone, Default)]
pub struct OptionsOverride {
    pub min_len: Option<usize>,
    pub policy: Option<SelectionPolicy>,
    pub flyout: Option<bool>,
    pub timeout_content: Option<String>,
    pub suggest_new: Option<String>,
    pub limit: Option<usize>,
    pub initialize: Option<bool>,
    pub service_url: Option<String>,
    pub filter: Option<FilterFn>,
    pub transform: Option<TransformFn>,
}

impl OptionsOverride {
    pub fn policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = Some(min_len);
        self
    }

    pub fn flyout(mut self, flyout: bool) -> Self {
        self.flyout = Some(flyout);
        self
    }

    pub fn timeout_content(mut self, content: impl Into<String>) -> Self {
        self.timeout_content = Some(content.into());
        self
    }

    pub fn suggest_new(mut self, label: impl Into<String>) -> Self {
        self.suggest_new = Some(label.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn initialize(mut self, initialize: bool) -> Self {
        self.initialize = Some(initialize);
        self
    }

    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    pub fn filter(mut self, filter: impl Fn(&Candidate, &str) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn transform(
        mut self,
        transform: impl Fn(&Candidate, &str) -> DisplayRow + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for OptionsOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsOverride")
            .field("min_len", &self.min_len)
            .field("policy", &self.policy)
            .field("flyout", &self.flyout)
            .field("limit", &self.limit)
            .field("initialize", &self.initialize)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Later wins: `overrides` replace whatever `defaults` set.
    pub fn resolve(defaults: Options, overrides: &OptionsOverride) -> Result<Self> {
        let overrides = overrides.clone();
        let options = Self {
            min_len: overrides.min_len.unwrap_or(defaults.min_len),
            policy: overrides.policy.unwrap_or(defaults.policy),
            flyout: overrides.flyout.unwrap_or(defaults.flyout),
            timeout_content: overrides.timeout_content.or(defaults.timeout_content),
            suggest_new: overrides.suggest_new.or(defaults.suggest_new),
            limit: overrides.limit.unwrap_or(defaults.limit),
            initialize: overrides.initialize.unwrap_or(defaults.initialize),
            service_url: overrides.service_url.or(defaults.service_url),
            filter: overrides.filter.or(defaults.filter),
            transform: overrides.transform.or(defaults.transform),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(SuggestError::InvalidConfig(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overrides_win_over_defaults() {
        let defaults = Options {
            suggest_new: Some("Create new".into()),
            ..Options::default()
        };
        let overrides = OptionsOverride::default()
            .policy(SelectionPolicy::Soft)
            .limit(5);
        let options = Options::resolve(defaults, &overrides).unwrap();
        assert_eq!(options.policy, SelectionPolicy::Soft);
        assert_eq!(options.limit, 5);
        assert_eq!(options.suggest_new.as_deref(), Some("Create new"));
        assert_eq!(options.min_len, 1);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = Options::resolve(Options::default(), &OptionsOverride::default().limit(0))
            .unwrap_err();
        assert!(matches!(err, SuggestError::InvalidConfig(_)));
    }

    #[test]
    fn closures_carry_through() {
        let overrides = OptionsOverride::default().filter(|c, _| c.label.starts_with('L'));
        let options = Options::resolve(Options::default(), &overrides).unwrap();
        let filter = options.filter.unwrap();
        assert!(filter(&Candidate::from_value(json!({"name": "Lincoln"})), ""));
        assert!(!filter(&Candidate::from_value(json!({"name": "Grant"})), ""));
    }

    #[test]
    fn debug_hides_closures() {
        let overrides = OptionsOverride::default().filter(|_, _| true);
        let options = Options::resolve(Options::default(), &overrides).unwrap();
        assert!(format!("{options:?}").contains("<fn>"));
    }
}
