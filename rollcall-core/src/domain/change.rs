//! Roster diffing and rename reconciliation

use serde::Serialize;

use super::roster::{roster_difference, Roster};

/// Raw username-level difference between two rosters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterDiff {
    /// In the new roster, username absent from the old one
    pub added_candidates: Roster,
    /// In the old roster, username absent from the new one
    pub removed_candidates: Roster,
}

impl RosterDiff {
    pub fn compute(old: &Roster, new: &Roster) -> Self {
        Self {
            added_candidates: roster_difference(new, old),
            removed_candidates: roster_difference(old, new),
        }
    }

    /// True when both rosters hold exactly the same usernames
    pub fn is_empty(&self) -> bool {
        self.added_candidates.is_empty() && self.removed_candidates.is_empty()
    }

    /// Classify the difference into added, removed and renamed members.
    ///
    /// Each removed candidate is matched by identity key against the added
    /// candidates first. A match is a rename and consumes that added candidate.
    /// When several added candidates share the key, the first in username order
    /// is taken.
    pub fn reconcile(self) -> ChangeSet {
        let RosterDiff {
            added_candidates: mut added,
            removed_candidates,
        } = self;

        let mut removed = Vec::new();
        let mut renamed = Vec::new();

        for (username, key) in removed_candidates {
            match added.username_for_key(key).map(str::to_owned) {
                Some(new_name) => {
                    added.remove(&new_name);
                    renamed.push(Rename {
                        old_username: username,
                        new_username: new_name,
                    });
                }
                None => removed.push(username),
            }
        }

        ChangeSet {
            added,
            removed,
            renamed,
        }
    }
}

/// A username change detected through a shared identity key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Rename {
    pub old_username: String,
    pub new_username: String,
}

impl Rename {
    pub fn new(old_username: impl Into<String>, new_username: impl Into<String>) -> Self {
        Self {
            old_username: old_username.into(),
            new_username: new_username.into(),
        }
    }
}

/// Reconciled membership changes, three disjoint groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub added: Roster,
    pub removed: Vec<String>,
    pub renamed: Vec<Rename>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.renamed.is_empty()
    }
}

/// Reconcile an old roster against a new one
pub fn reconcile(old: &Roster, new: &Roster) -> ChangeSet {
    RosterDiff::compute(old, new).reconcile()
}
