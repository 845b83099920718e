//! `lockbox backup` / `lockbox restore`.
//!
//! A backup is the encrypted vault blob exactly as stored, written to a
//! `.lbx` file.  Restoring it needs the master password it was created
//! with.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::cli::output;
use crate::cli::{
    audit_event, audit_restore_failure, confirm, open, prompt_password, unlock, AuditKind, Cli,
};
use crate::errors::Result;
use crate::storage::file::SLOT_EXTENSION;

/// Execute the `backup` command.
pub fn execute(cli: &Cli, output_path: Option<&str>) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let blob = ctx.lockbox.vault()?.create_backup()?;

    let path = match output_path {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!(
            "lockbox-{}.{SLOT_EXTENSION}",
            Utc::now().format("%Y%m%d-%H%M%S")
        )),
    };
    fs::write(&path, blob)?;

    audit_event(&ctx, AuditKind::BackupCreated, Some(&path.display().to_string()));
    output::success(&format!("Backup written to {}", path.display()));
    output::tip("Restoring it requires the current master password.");

    Ok(())
}

/// Execute the `restore` command.
pub fn restore(cli: &Cli, file: &str, force: bool) -> Result<()> {
    let blob = fs::read_to_string(file)?;
    let mut ctx = open(cli)?;

    if ctx.lockbox.exists()?
        && !force
        && !confirm("Replace the existing vault with this backup?", false)?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    let password = prompt_password()?;
    let vault = match ctx.lockbox.restore_backup(&blob, &password) {
        Ok(vault) => vault,
        Err(e) => {
            audit_restore_failure(&ctx, &e, file);
            return Err(e);
        }
    };

    audit_event(&ctx, AuditKind::BackupRestored, Some(file));
    output::success(&format!(
        "Restored vault '{}' ({} entries)",
        vault.name,
        vault.entries.len()
    ));

    Ok(())
}
