//! Terminal output for the `lockbox` commands.
//!
//! Status lines carry a colored marker; errors and warnings go to
//! stderr so stdout stays pipeable (`lockbox get x | pbcopy`).

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::crypto::StrengthLabel;
use crate::rotation::{RotationCandidate, RotationReason};
use crate::vault::PasswordEntry;

pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Errors and warnings go to stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Dimmed hint pointing at a follow-up command.
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print entries as a table (Title, Username, URL, Category, Updated, Id).
/// Passwords are never shown.
pub fn print_entries_table(entries: &[PasswordEntry]) {
    if entries.is_empty() {
        info("No entries found.");
        tip("Run `lockbox add <TITLE>` to add your first password.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Username", "URL", "Category", "Updated", "Id"]);

    for e in entries {
        table.add_row(vec![
            e.title.clone(),
            e.username.clone(),
            e.url.clone(),
            e.category.clone().unwrap_or_else(|| "-".into()),
            e.updated_at.format("%Y-%m-%d").to_string(),
            e.id.chars().take(8).collect(),
        ]);
    }

    println!("{table}");
}

/// Colored strength label, e.g. "strong (92/100)".
pub fn strength(score: u8) -> String {
    let label = StrengthLabel::from_score(score);
    let text = format!("{} ({score}/100)", label.as_str());
    match label {
        StrengthLabel::Weak => style(text).red().to_string(),
        StrengthLabel::Medium => style(text).yellow().to_string(),
        StrengthLabel::Strong => style(text).green().to_string(),
    }
}

pub fn print_rotation_table(candidates: &[RotationCandidate]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Reason", "Id"]);

    for c in candidates {
        let reasons: Vec<String> = c
            .reasons
            .iter()
            .map(|r| match r {
                RotationReason::Age { days } => format!("{days} days old"),
                RotationReason::Weak { score } => format!("weak ({score}/100)"),
            })
            .collect();
        table.add_row(vec![
            c.title.clone(),
            reasons.join(", "),
            c.entry_id.chars().take(8).collect(),
        ]);
    }

    println!("{table}");
}
