//! Import matching
//!
//! Public definitions match public actions by fully-qualified name, across
//! module boundaries. Everything else matches by draft name among non-public
//! actions on the same side of a collection boundary. An existing action is
//! claimed at most once per import.

use std::collections::HashSet;

use crate::action::Action;
use super::definition::ActionDefinition;

pub struct ImportMatcher<'a> {
    candidates: &'a [Action],
    claimed: HashSet<usize>,
}

impl<'a> ImportMatcher<'a> {
    pub fn new(candidates: &'a [Action]) -> Self {
        Self {
            candidates,
            claimed: HashSet::new(),
        }
    }

    /// Existing action the definition updates, if any.
    pub fn claim(&mut self, incoming: &ActionDefinition) -> Option<&'a Action> {
        let index = self.candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.claimed.contains(i))
            .find(|(_, existing)| Self::matches(existing, incoming))
            .map(|(i, _)| i)?;

        self.claimed.insert(index);
        self.candidates.get(index)
    }

    fn matches(existing: &Action, incoming: &ActionDefinition) -> bool {
        if incoming.is_public {
            return existing.is_public
                && existing.draft.fully_qualified_name() == incoming.fully_qualified_name();
        }

        !existing.is_public
            && existing.name() == incoming.name()
            && existing.collection_id.is_some() == incoming.in_collection()
    }
}
