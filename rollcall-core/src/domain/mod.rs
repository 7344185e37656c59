//! Core domain entities
//!
//! Rosters, identity keys and the reconciliation of membership changes.
//! Pure data structures and algorithms - no I/O.

mod change;
pub mod result;
mod roster;
mod user;

pub use change::{reconcile, ChangeSet, Rename, RosterDiff};
pub use roster::{roster_difference, roster_union, Roster};
pub use user::{IdentityKey, UserRecord};
