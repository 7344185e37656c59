//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod forum_api;
mod snapshot_store;

pub use forum_api::ForumApi;
pub use snapshot_store::SnapshotStore;
