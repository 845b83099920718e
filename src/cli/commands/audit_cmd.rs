//! `lockbox audit`: display the security event log.

use crate::cli::{open, Cli};
use crate::errors::Result;

/// Execute the `audit` command.
#[cfg(feature = "audit-log")]
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    use crate::audit::AuditLog;
    use crate::cli::output;
    use crate::errors::LockboxError;

    let ctx = open(cli)?;
    let audit = AuditLog::open(&ctx.data_dir)
        .ok_or_else(|| LockboxError::AuditError("failed to open audit database".into()))?;

    let entries = audit.recent(last)?;
    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

#[cfg(not(feature = "audit-log"))]
pub fn execute(cli: &Cli, _last: usize) -> Result<()> {
    let _ = open(cli)?;
    Err(crate::errors::LockboxError::AuditError(
        "this build was compiled without the audit-log feature".into(),
    ))
}

/// Print audit entries in a formatted table.
#[cfg(feature = "audit-log")]
fn print_audit_table(entries: &[crate::audit::AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Event", "Subject", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_event(&entry.event),
            entry.subject.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize event names for display.
#[cfg(feature = "audit-log")]
fn colorize_event(event: &str) -> String {
    use console::style;

    match event {
        "wiped" | "unlock_failed" => style(event).red().bold().to_string(),
        "vault_created" | "unlocked" | "backup_restored" | "shards_combined" => {
            style(event).green().to_string()
        }
        "secret_revealed" | "link_created" | "link_accessed" => style(event).yellow().to_string(),
        "password_changed" | "passwords_rotated" | "settings_changed" => {
            style(event).blue().to_string()
        }
        _ => event.to_string(),
    }
}

#[cfg(all(test, feature = "audit-log"))]
mod tests {
    use super::*;

    #[test]
    fn colorize_event_keeps_name() {
        assert!(colorize_event("wiped").contains("wiped"));
        assert_eq!(colorize_event("entry_added"), "entry_added");
    }
}
