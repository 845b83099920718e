//! Safeguard settings: `self-destruct`, `duress set|disable`,
//! `stack enable|disable`.
//!
//! Each of these needs the real vault to be fully unlocked.

use crate::cli::output;
use crate::cli::{audit_event, prompt_new_password, unlock, AuditKind, Cli};
use crate::errors::Result;

/// Execute the `self-destruct` command.
pub fn self_destruct(cli: &Cli, max_attempts: u32) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;
    ctx.lockbox.self_destruct().configure(max_attempts)?;

    audit_event(
        &ctx,
        AuditKind::SettingsChanged,
        Some(&format!("self-destruct max_attempts={max_attempts}")),
    );
    if max_attempts == 0 {
        output::success("Self-destruct disabled.");
    } else {
        output::success(&format!(
            "The vault will be wiped after {max_attempts} consecutive failed unlocks."
        ));
        output::warning("A wipe cannot be undone. Keep a backup somewhere safe.");
    }
    Ok(())
}

/// Execute `duress set`.
pub fn duress_set(cli: &Cli) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;
    let real = ctx.password.clone();

    let duress = prompt_new_password("LOCKBOX_DURESS_PASSWORD", "duress password")?;
    ctx.lockbox.duress().set_duress_password(&duress, &real)?;
    // Seed the decoy dataset now so the first duress unlock looks lived-in.
    ctx.lockbox.duress().decoy_entries()?;

    audit_event(&ctx, AuditKind::SettingsChanged, Some("duress password set"));
    output::success("Duress password set. Entering it opens a decoy vault.");
    Ok(())
}

/// Execute `duress disable`.
pub fn duress_disable(cli: &Cli) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;
    let real = ctx.password.clone();
    ctx.lockbox.duress().disable(&real)?;

    audit_event(&ctx, AuditKind::SettingsChanged, Some("duress password removed"));
    output::success("Duress password removed.");
    Ok(())
}

/// Execute `stack enable`.
pub fn stack_enable(cli: &Cli, phrases: &[String]) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;
    let master = ctx.password.clone();
    ctx.lockbox
        .stack()
        .enable_passphrase_stacking(phrases, &master)?;

    audit_event(&ctx, AuditKind::SettingsChanged, Some("passphrase stacking enabled"));
    output::success(&format!(
        "{} passphrases will be required after the master password.",
        phrases.len()
    ));
    output::tip("Scripts can pass them in LOCKBOX_PASSPHRASES, comma separated.");
    Ok(())
}

/// Execute `stack disable`.
pub fn stack_disable(cli: &Cli) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;
    let master = ctx.password.clone();
    ctx.lockbox.stack().disable_passphrase_stacking(&master)?;

    audit_event(&ctx, AuditKind::SettingsChanged, Some("passphrase stacking disabled"));
    output::success("Passphrase stacking disabled.");
    Ok(())
}
