//! Roster domain model
//!
//! A roster is a point-in-time membership snapshot mapping username to
//! identity key. Iteration is always in ascending username order.

use std::collections::btree_map;
use std::collections::BTreeMap;

use super::user::{IdentityKey, UserRecord};

/// Username to identity key mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    members: BTreeMap<String, IdentityKey>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member, returning the key previously stored for that username
    pub fn insert(
        &mut self,
        username: impl Into<String>,
        key: impl Into<IdentityKey>,
    ) -> Option<IdentityKey> {
        self.members.insert(username.into(), key.into())
    }

    pub fn remove(&mut self, username: &str) -> Option<IdentityKey> {
        self.members.remove(username)
    }

    pub fn get(&self, username: &str) -> Option<IdentityKey> {
        self.members.get(username).copied()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.members.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, IdentityKey> {
        self.members.iter()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// First username, in roster order, holding an equal identity key
    pub fn username_for_key(&self, key: IdentityKey) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, k)| **k == key)
            .map(|(name, _)| name.as_str())
    }

    /// Merge user records in, later records overwriting earlier usernames
    pub fn extend_records(&mut self, records: impl IntoIterator<Item = UserRecord>) {
        for record in records {
            self.members.insert(record.username, record.identity_key);
        }
    }
}

impl FromIterator<(String, IdentityKey)> for Roster {
    fn from_iter<I: IntoIterator<Item = (String, IdentityKey)>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<UserRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = UserRecord>>(iter: I) -> Self {
        let mut roster = Roster::new();
        roster.extend_records(iter);
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = (&'a String, &'a IdentityKey);
    type IntoIter = btree_map::Iter<'a, String, IdentityKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl IntoIterator for Roster {
    type Item = (String, IdentityKey);
    type IntoIter = btree_map::IntoIter<String, IdentityKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

/// Entries of `a` whose username is not present in `b`.
///
/// Only usernames are compared; identity keys are ignored.
pub fn roster_difference(a: &Roster, b: &Roster) -> Roster {
    a.iter()
        .filter(|(name, _)| !b.contains(name))
        .map(|(name, key)| (name.clone(), *key))
        .collect()
}

/// Entries of both rosters, `b` winning on duplicate usernames
pub fn roster_union(a: &Roster, b: &Roster) -> Roster {
    let mut merged = a.clone();
    for (name, key) in b {
        merged.insert(name.clone(), *key);
    }
    merged
}
