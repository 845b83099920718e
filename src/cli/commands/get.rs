//! `lockbox get` / `lockbox copy`: reveal one entry's password.

use crate::cli::output;
use crate::cli::{audit_subject, unlock, AuditKind, Cli};
use crate::clipboard;
use crate::errors::Result;

/// Execute the `get` command: print the password to stdout.
pub fn execute(cli: &Cli, entry: &str) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let found = ctx.lockbox.find_entry(entry)?;

    audit_subject(&ctx, AuditKind::SecretRevealed, Some(&found.id), Some("stdout"));
    println!("{}", found.password);

    Ok(())
}

/// Execute the `copy` command: put the password on the clipboard and
/// clear it after the configured delay.
pub fn copy(cli: &Cli, entry: &str) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let found = ctx.lockbox.find_entry(entry)?;
    let clear_after = ctx.settings.clipboard_clear_after();

    let handle = clipboard::copy_with_clear(&found.password, clear_after)?;
    audit_subject(&ctx, AuditKind::SecretRevealed, Some(&found.id), Some("clipboard"));

    match handle {
        Some(handle) => {
            output::success(&format!(
                "Copied password for '{}' — clearing in {}s",
                found.title,
                clear_after.as_secs()
            ));
            // The process must outlive the timer for the clear to happen.
            let _ = handle.join();
        }
        None => output::success(&format!("Copied password for '{}'", found.title)),
    }

    Ok(())
}
