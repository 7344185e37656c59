//! Notifier - turns membership changes into forum posts
//!
//! Composition and delivery are separate steps so the planned messages can
//! be shown (or logged in dry-run mode) before anything is sent.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::result::Result;
use crate::domain::{ChangeSet, IdentityKey};
use crate::ports::ForumApi;

pub const DEFAULT_ADDED_TEMPLATE: &str = "Поприветствуем нового бнвачера — @{username}";
pub const DEFAULT_REMOVED_TEMPLATE: &str = "Нас покинул @{username}";
pub const DEFAULT_RENAMED_TEMPLATE: &str = "@{username_old} сменил юзернейм на @{username_new}";

/// Message templates with `{username}`, `{username_old}` and `{username_new}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplates {
    pub added: String,
    pub removed: String,
    pub renamed: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            added: DEFAULT_ADDED_TEMPLATE.to_string(),
            removed: DEFAULT_REMOVED_TEMPLATE.to_string(),
            renamed: DEFAULT_RENAMED_TEMPLATE.to_string(),
        }
    }
}

impl MessageTemplates {
    pub fn added(&self, username: &str) -> String {
        fill(&self.added, &[("{username}", username)])
    }

    pub fn removed(&self, username: &str) -> String {
        fill(&self.removed, &[("{username}", username)])
    }

    pub fn renamed(&self, old_username: &str, new_username: &str) -> String {
        fill(
            &self.renamed,
            &[("{username_old}", old_username), ("{username_new}", new_username)],
        )
    }
}

/// Substitute placeholders in one left-to-right pass; inserted values are never rescanned
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(c) = rest.chars().next() {
        if let Some((placeholder, value)) = values.iter().find(|(p, _)| rest.starts_with(*p)) {
            out.push_str(value);
            rest = &rest[placeholder.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}

/// Suppresses announcements for members registered too long ago
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Maximum registration age in seconds; `None` announces everyone
    pub max_age: Option<u64>,
}

impl FreshnessPolicy {
    /// A zero threshold disables the filter
    pub fn from_seconds(max_age: u64) -> Self {
        Self {
            max_age: (max_age > 0).then_some(max_age),
        }
    }

    pub fn disabled() -> Self {
        Self { max_age: None }
    }

    /// Registration age when it exceeds the threshold, `None` if fresh
    pub fn stale_age(&self, key: IdentityKey, now: i64) -> Option<i64> {
        let max_age = self.max_age?;
        let age = key.age_at(now);
        (age > 0 && age as u64 > max_age).then_some(age)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    Added,
    Removed,
    Renamed,
}

/// One message ready to post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub text: String,
}

/// An added member left out by the freshness policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMember {
    pub username: String,
    pub age_secs: i64,
}

/// Messages to post, in posting order, plus the members not announced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnouncementPlan {
    pub announcements: Vec<Announcement>,
    pub skipped: Vec<SkippedMember>,
}

/// Result of delivering a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Raw responses of the `post` command, one per sent message
    pub receipts: Vec<String>,
    pub dry_run: bool,
}

/// Formats and posts membership announcements
#[derive(Debug, Clone)]
pub struct Notifier {
    templates: MessageTemplates,
    freshness: FreshnessPolicy,
    delay: Duration,
    dry_run: bool,
}

impl Notifier {
    pub fn new(
        templates: MessageTemplates,
        freshness: FreshnessPolicy,
        delay: Duration,
        dry_run: bool,
    ) -> Self {
        Self {
            templates,
            freshness,
            delay,
            dry_run,
        }
    }

    /// Build the messages for a change set.
    ///
    /// Order: added (by username), removed (by username), renamed (by old
    /// username). Only added members go through the freshness policy.
    pub fn compose(&self, changes: &ChangeSet, now: i64) -> AnnouncementPlan {
        let mut plan = AnnouncementPlan::default();

        for (username, key) in &changes.added {
            if let Some(age) = self.freshness.stale_age(*key, now) {
                warn!(user = %username, age_secs = age, "skip {}: added {} seconds ago", username, age);
                plan.skipped.push(SkippedMember {
                    username: username.clone(),
                    age_secs: age,
                });
                continue;
            }
            plan.announcements.push(Announcement {
                kind: AnnouncementKind::Added,
                text: self.templates.added(username),
            });
        }

        let mut removed: Vec<&String> = changes.removed.iter().collect();
        removed.sort();
        for username in removed {
            plan.announcements.push(Announcement {
                kind: AnnouncementKind::Removed,
                text: self.templates.removed(username),
            });
        }

        let mut renamed: Vec<_> = changes.renamed.iter().collect();
        renamed.sort();
        for rename in renamed {
            plan.announcements.push(Announcement {
                kind: AnnouncementKind::Renamed,
                text: self
                    .templates
                    .renamed(&rename.old_username, &rename.new_username),
            });
        }

        plan
    }

    /// Post each announcement, pausing between posts.
    ///
    /// In dry-run mode messages are only logged. A failed post aborts the
    /// remaining ones; posts already sent are not rolled back.
    pub fn deliver<A: ForumApi + ?Sized>(
        &self,
        api: &A,
        login: &str,
        plan: &AnnouncementPlan,
    ) -> Result<DeliveryReport> {
        let mut report = DeliveryReport {
            receipts: Vec::new(),
            dry_run: self.dry_run,
        };

        if self.dry_run {
            for announcement in &plan.announcements {
                info!(kind = ?announcement.kind, "not posting: {}", announcement.text);
            }
            return Ok(report);
        }

        for (index, announcement) in plan.announcements.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            let receipt = api.publish_message(&announcement.text, login)?;
            info!(kind = ?announcement.kind, "posted: {}", receipt.trim());
            report.receipts.push(receipt);
        }

        Ok(report)
    }
}
