//! Console output for a run

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Errors go to stderr, next to the log
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Table listing planned announcements, one row per message
pub fn announcement_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kind", "Message"]);
    table
}

/// Horizontal rule closing a run's output
pub fn separator() {
    println!("{}", "-".repeat(40));
}
