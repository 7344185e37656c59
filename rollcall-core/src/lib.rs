//! Rollcall Core - forum membership watcher
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Rosters, identity keys and rename reconciliation
//! - **ports**: Trait definitions for external dependencies (ForumApi, SnapshotStore)
//! - **services**: Fetching, announcing and the run pipeline
//! - **adapters**: Concrete implementations (BnW HTTP API, snapshot file)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use anyhow::{Context, Result};

use adapters::bnw::BnwClient;
use adapters::snapshot_file::SnapshotFile;
use config::Config;
use services::AnnounceService;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{reconcile, ChangeSet, IdentityKey, Rename, Roster, UserRecord};
pub use services::{RunOutcome, RunReport};

/// Main context for a Rollcall run
///
/// Wires the HTTP client and snapshot file to the announce service for the
/// given configuration.
pub struct RollcallContext {
    pub api: BnwClient,
    pub store: SnapshotFile,
    pub announce_service: AnnounceService,
}

impl RollcallContext {
    pub fn new(config: Config) -> Result<Self> {
        let api = BnwClient::new_with_base_url(&config.api_url)
            .context("Failed to create the API client")?;
        let store = SnapshotFile::new(&config.users_file);
        let announce_service = AnnounceService::new(config);

        Ok(Self {
            api,
            store,
            announce_service,
        })
    }

    pub fn config(&self) -> &Config {
        self.announce_service.config()
    }

    /// Run once against the live API. `now` is the current Unix time.
    pub fn run(&self, now: i64) -> Result<RunReport> {
        self.announce_service.run(&self.api, &self.store, now)
    }
}
