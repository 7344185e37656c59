//! Run summary printed after the pipeline finishes

use colored::Colorize;

use rollcall_core::config::Config;
use rollcall_core::services::AnnouncementKind;
use rollcall_core::{RunOutcome, RunReport};

use crate::output;

pub fn print(report: &RunReport, config: &Config) {
    println!("Users from API: {}", report.fetched);
    if let Some(previous) = report.previous {
        println!("Users from file: {}", previous);
    }

    match &report.outcome {
        RunOutcome::FirstRun { forced } => {
            if *forced {
                output::warning(&format!(
                    "{} does not exist yet, running in first-run mode",
                    config.users_file.display()
                ));
            }
            output::success(&format!(
                "Recorded {} users to {}",
                report.fetched,
                config.users_file.display()
            ));
        }
        RunOutcome::NoChanges => println!("{}", "No changes".cyan()),
        RunOutcome::Changed {
            changes,
            plan,
            delivery,
        } => {
            println!(
                "{} added, {} removed, {} renamed",
                changes.added.len(),
                changes.removed.len(),
                changes.renamed.len()
            );

            for skipped in &plan.skipped {
                output::warning(&format!(
                    "Skipped {}: registered {} seconds ago",
                    skipped.username, skipped.age_secs
                ));
            }

            if !plan.announcements.is_empty() {
                let mut table = output::announcement_table();
                for announcement in &plan.announcements {
                    table.add_row(vec![kind_label(announcement.kind), announcement.text.as_str()]);
                }
                println!("{}", table);
            }

            if delivery.dry_run {
                println!("{}", "DRY RUN - nothing posted".yellow());
            } else {
                output::success(&format!("Posted {} messages", delivery.receipts.len()));
            }
        }
    }

    output::separator();
}

fn kind_label(kind: AnnouncementKind) -> &'static str {
    match kind {
        AnnouncementKind::Added => "added",
        AnnouncementKind::Removed => "removed",
        AnnouncementKind::Renamed => "renamed",
    }
}
