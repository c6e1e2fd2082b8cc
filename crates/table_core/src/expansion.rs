use std::collections::BTreeSet;

use crate::row_id::RowId;

/// The set of rows the user has expanded. Rows absent from the set are
/// collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<RowId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionDelta {
    pub newly_expanded: Vec<RowId>,
    pub newly_collapsed: Vec<RowId>,
}

impl ExpansionDelta {
    pub fn is_empty(&self) -> bool {
        self.newly_expanded.is_empty() && self.newly_collapsed.is_empty()
    }
}

impl ExpansionState {
    pub fn is_expanded(&self, row_id: &RowId) -> bool {
        self.expanded.contains(row_id)
    }

    pub fn set_expanded(&mut self, row_id: RowId, expanded: bool) {
        if expanded {
            self.expanded.insert(row_id);
        } else {
            self.expanded.remove(&row_id);
        }
    }

    pub fn toggled(&self, row_id: &RowId) -> Self {
        let mut next = self.clone();
        let expanded = !next.is_expanded(row_id);
        next.set_expanded(row_id.clone(), expanded);
        next
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowId> {
        self.expanded.iter()
    }

    /// Rows that changed state going from `self` to `next`.
    pub fn diff(&self, next: &ExpansionState) -> ExpansionDelta {
        ExpansionDelta {
            newly_expanded: next.expanded.difference(&self.expanded).cloned().collect(),
            newly_collapsed: self.expanded.difference(&next.expanded).cloned().collect(),
        }
    }
}

impl FromIterator<RowId> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_id(raw: &str) -> RowId {
        RowId::parse(raw).expect("row id")
    }

    #[test]
    fn diff_reports_both_directions() {
        let prev: ExpansionState = [row_id("queue:a"), row_id("queue:b")].into_iter().collect();
        let next: ExpansionState = [row_id("queue:b"), row_id("queue:c")].into_iter().collect();

        let delta = prev.diff(&next);
        assert_eq!(delta.newly_expanded, vec![row_id("queue:c")]);
        assert_eq!(delta.newly_collapsed, vec![row_id("queue:a")]);
        assert!(prev.diff(&prev).is_empty());
    }

    #[test]
    fn toggling_twice_restores_the_state() {
        let state = ExpansionState::default();
        let once = state.toggled(&row_id("queue:a"));
        assert!(once.is_expanded(&row_id("queue:a")));
        assert_eq!(once.toggled(&row_id("queue:a")), state);
    }
}
