//! `lockbox rm`: remove an entry from the vault.

use crate::cli::output;
use crate::cli::{audit_subject, confirm, unlock, AuditKind, Cli};
use crate::errors::Result;

/// Execute the `rm` command.
pub fn execute(cli: &Cli, entry: &str, force: bool) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let found = ctx.lockbox.find_entry(entry)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Delete '{}'?", found.title), false)? {
        output::info("Cancelled.");
        return Ok(());
    }

    ctx.lockbox.vault()?.delete_entry(&found.id)?;

    audit_subject(&ctx, AuditKind::EntryDeleted, Some(&found.id), None);
    output::success(&format!("Deleted '{}'", found.title));

    Ok(())
}
