//! `lockbox change-password`: re-encrypt the vault under a new master
//! password.
//!
//! Duress and passphrase-stack records are encrypted under the master
//! password too, so they are re-created under the new one.

use crate::cli::output;
use crate::cli::{audit_event, prompt_new_password, unlock, AuditKind, Cli};
use crate::errors::Result;

/// Execute the `change-password` command.
pub fn execute(cli: &Cli) -> Result<()> {
    output::info("Enter your current master password.");
    let mut ctx = unlock(cli)?;
    let current = ctx.password.clone();
    ctx.lockbox.vault()?;

    let new_password = prompt_new_password("LOCKBOX_NEW_PASSWORD", "new master password")?;

    let duress = ctx.lockbox.duress().settings(&current)?;
    let phrases = ctx.lockbox.stack().required_phrases();

    ctx.lockbox
        .vault()?
        .change_password(&current, &new_password)?;

    if let Some(settings) = duress.filter(|s| s.enabled) {
        ctx.lockbox
            .duress()
            .set_duress_password(&settings.duress_password, &new_password)?;
    }
    if !phrases.is_empty() {
        let phrases: Vec<String> = phrases.iter().map(|p| p.as_str().to_string()).collect();
        ctx.lockbox
            .stack()
            .enable_passphrase_stacking(&phrases, &new_password)?;
    }

    audit_event(&ctx, AuditKind::PasswordChanged, None);
    output::success("Master password changed.");

    Ok(())
}
