//! Announce service - one complete watch run
//!
//! fetch → (first run: save, stop) → load previous snapshot → diff →
//! (no changes: stop, file untouched) → save new snapshot → classify →
//! compose → post.
//!
//! The snapshot is written before posting, so a crash while posting never
//! re-announces the same changes but may lose some announcements.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{ChangeSet, RosterDiff};
use crate::ports::{ForumApi, SnapshotStore};
use crate::services::fetch::RosterFetcher;
use crate::services::notify::{AnnouncementPlan, DeliveryReport, Notifier};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Snapshot recorded without diffing. `forced` is set when the
    /// snapshot file did not exist yet.
    FirstRun { forced: bool },
    /// Same usernames as last time; nothing written or posted
    NoChanges,
    /// Membership changed; snapshot rewritten and announcements handled
    Changed {
        changes: ChangeSet,
        plan: AnnouncementPlan,
        delivery: DeliveryReport,
    },
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Members returned by the API
    pub fetched: usize,
    /// Members in the previous snapshot, when it was read
    pub previous: Option<usize>,
    pub outcome: RunOutcome,
}

/// Orchestrates a single run from an explicit configuration
pub struct AnnounceService {
    config: Config,
    notifier: Notifier,
}

impl AnnounceService {
    pub fn new(config: Config) -> Self {
        let notifier = Notifier::new(
            config.messages.clone(),
            config.freshness(),
            config.sleep,
            config.no_post,
        );
        Self { config, notifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute the run. `now` is the current Unix time in seconds.
    pub fn run<A, S>(&self, api: &A, store: &S, now: i64) -> Result<RunReport>
    where
        A: ForumApi + ?Sized,
        S: SnapshotStore + ?Sized,
    {
        let current = RosterFetcher::new(api)
            .fetch_all_users()
            .context("Failed to fetch the user list")?;

        let forced = !self.config.first_run && !store.exists();
        if forced {
            warn!(
                path = %self.config.users_file.display(),
                "snapshot not found, running in first-run mode"
            );
        }

        if self.config.first_run || forced {
            store
                .save(&current)
                .context("Failed to write the snapshot")?;
            info!(users = current.len(), "snapshot recorded, nothing announced");
            return Ok(RunReport {
                fetched: current.len(),
                previous: None,
                outcome: RunOutcome::FirstRun { forced },
            });
        }

        let previous = store.load().context("Failed to read the snapshot")?;
        info!(users = previous.len(), "[file] users: {}", previous.len());

        let diff = RosterDiff::compute(&previous, &current);
        if diff.is_empty() {
            info!("no changes");
            return Ok(RunReport {
                fetched: current.len(),
                previous: Some(previous.len()),
                outcome: RunOutcome::NoChanges,
            });
        }

        store
            .save(&current)
            .context("Failed to write the snapshot")?;

        let changes = diff.reconcile();
        log_changes(&changes);

        let plan = self.notifier.compose(&changes, now);
        let delivery = self
            .notifier
            .deliver(api, &self.config.token, &plan)
            .context("Failed to post an announcement")?;

        Ok(RunReport {
            fetched: current.len(),
            previous: Some(previous.len()),
            outcome: RunOutcome::Changed {
                changes,
                plan,
                delivery,
            },
        })
    }
}

fn log_changes(changes: &ChangeSet) {
    if !changes.added.is_empty() {
        let names: Vec<&str> = changes.added.usernames().collect();
        info!("added: {}", names.join(" "));
    }
    if !changes.removed.is_empty() {
        info!("removed: {}", changes.removed.join(" "));
    }
    if !changes.renamed.is_empty() {
        let pairs: Vec<String> = changes
            .renamed
            .iter()
            .map(|r| format!("{}>{}", r.old_username, r.new_username))
            .collect();
        info!("renamed: {}", pairs.join(" "));
    }
}
