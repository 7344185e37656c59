//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one stage of a run.

mod announce;
mod fetch;
pub mod logging;
mod notify;

pub use announce::{AnnounceService, RunOutcome, RunReport};
pub use fetch::RosterFetcher;
pub use notify::{
    Announcement, AnnouncementKind, AnnouncementPlan, DeliveryReport, FreshnessPolicy,
    MessageTemplates, Notifier, SkippedMember,
};
