//! Snapshot store port - persisted roster from the previous run

use crate::domain::result::Result;
use crate::domain::Roster;

/// Storage for the last known roster
pub trait SnapshotStore {
    /// Whether a snapshot has been written before
    fn exists(&self) -> bool;

    /// Load the stored roster
    fn load(&self) -> Result<Roster>;

    /// Replace the stored roster
    fn save(&self, roster: &Roster) -> Result<()>;
}
