//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - BnW HTTP client for the ForumApi port
//! - Plain text file for the SnapshotStore port

pub mod bnw;
pub mod snapshot_file;

#[cfg(test)]
pub mod bnw_mock;
