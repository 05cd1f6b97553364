use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};

/// How the highlighted row behaves at list edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Nothing is highlighted by default; walking off an edge clears the
    /// highlight and puts the typed text back
    Soft,
    /// The first row is highlighted when shown; edges are sticky
    #[default]
    Hard,
}

/// Result of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    /// Highlight removed; the input should show the typed text again
    Cleared,
    Stayed,
}

/// The visible candidates and the highlighted row, if any.
///
/// Invariant: `selected` is always `< items.len()`. The "no matches" row is
/// not an item and can never be selected.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    policy: SelectionPolicy,
    items: Vec<Candidate>,
    no_matches: bool,
    selected: Option<usize>,
}

impl SelectionModel {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.policy = policy;
    }

    /// Replace the visible rows. Clears the highlight; an empty list shows
    /// the "no matches" row.
    pub fn show(&mut self, items: Vec<Candidate>) {
        self.items = items
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                item.index = index;
                item
            })
            .collect();
        self.no_matches = self.items.is_empty();
        self.selected = None;
    }

    /// Drop all rows.
    pub fn reset(&mut self) {
        self.items.clear();
        self.no_matches = false;
        self.selected = None;
    }

    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&Candidate> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shows_no_matches(&self) -> bool {
        self.no_matches
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&Candidate> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Highlight `index` (or nothing). Out-of-range indices are rejected.
    pub fn select(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.items.len() => false,
            _ => {
                self.selected = index;
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Highlight the first row, as hard selection does when a list appears.
    pub fn select_first(&mut self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        self.selected = Some(0);
        self.selected
    }

    pub fn select_next(&mut self) -> Navigation {
        let len = self.items.len();
        if len == 0 {
            return Navigation::Stayed;
        }
        match self.selected {
            None => self.move_to(0),
            Some(i) if i + 1 < len => self.move_to(i + 1),
            Some(_) => match self.policy {
                SelectionPolicy::Soft => self.clear_highlight(),
                SelectionPolicy::Hard => Navigation::Stayed,
            },
        }
    }

    pub fn select_previous(&mut self) -> Navigation {
        let len = self.items.len();
        if len == 0 {
            return Navigation::Stayed;
        }
        match self.selected {
            None => self.move_to(len - 1),
            Some(i) if i > 0 => self.move_to(i - 1),
            Some(_) => match self.policy {
                SelectionPolicy::Soft => self.clear_highlight(),
                SelectionPolicy::Hard => Navigation::Stayed,
            },
        }
    }

    fn move_to(&mut self, index: usize) -> Navigation {
        self.selected = Some(index);
        Navigation::Moved(index)
    }

    fn clear_highlight(&mut self) -> Navigation {
        self.selected = None;
        Navigation::Cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abc(policy: SelectionPolicy) -> SelectionModel {
        let mut model = SelectionModel::new(policy);
        model.show(
            ["A", "B", "C"]
                .iter()
                .map(|n| Candidate::from_value(json!({ "name": n })))
                .collect(),
        );
        model
    }

    fn label(model: &SelectionModel) -> Option<&str> {
        model.selected_item().map(|c| c.label.as_str())
    }

    #[test]
    fn show_assigns_display_indices() {
        let model = abc(SelectionPolicy::Hard);
        let indices: Vec<_> = model.items().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn soft_next_from_none_lands_on_first() {
        let mut model = abc(SelectionPolicy::Soft);
        assert_eq!(model.select_next(), Navigation::Moved(0));
        assert_eq!(label(&model), Some("A"));
    }

    #[test]
    fn soft_previous_from_first_clears() {
        let mut model = abc(SelectionPolicy::Soft);
        model.select_next();
        assert_eq!(model.select_previous(), Navigation::Cleared);
        assert_eq!(model.selected(), None);
    }

    #[test]
    fn soft_previous_from_none_lands_on_last() {
        let mut model = abc(SelectionPolicy::Soft);
        assert_eq!(model.select_previous(), Navigation::Moved(2));
        assert_eq!(label(&model), Some("C"));
    }

    #[test]
    fn soft_next_past_last_clears() {
        let mut model = abc(SelectionPolicy::Soft);
        model.select(Some(2));
        assert_eq!(model.select_next(), Navigation::Cleared);
        assert_eq!(model.select_next(), Navigation::Moved(0));
    }

    #[test]
    fn hard_edges_are_sticky() {
        let mut model = abc(SelectionPolicy::Hard);
        model.select(Some(2));
        assert_eq!(model.select_next(), Navigation::Stayed);
        assert_eq!(label(&model), Some("C"));

        model.select(Some(0));
        assert_eq!(model.select_previous(), Navigation::Stayed);
        assert_eq!(label(&model), Some("A"));
    }

    #[test]
    fn empty_list_shows_no_matches_and_never_selects() {
        let mut model = SelectionModel::new(SelectionPolicy::Hard);
        model.show(Vec::new());
        assert!(model.shows_no_matches());
        assert_eq!(model.select_first(), None);
        assert_eq!(model.select_next(), Navigation::Stayed);
        assert_eq!(model.select_previous(), Navigation::Stayed);
        assert!(!model.select(Some(0)));
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut model = abc(SelectionPolicy::Hard);
        assert!(!model.select(Some(3)));
        assert!(model.select(Some(1)));
        assert_eq!(label(&model), Some("B"));
        assert!(model.select(None));
        assert_eq!(model.selected(), None);
    }
}
