//! `lockbox init`: create a new vault.

use crate::cli::output;
use crate::cli::{audit_event, open, prompt_new_password, AuditKind, Cli};
use crate::crypto::{strength, StrengthLabel};
use crate::errors::{LockboxError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let mut ctx = open(cli)?;

    if ctx.lockbox.exists()? {
        output::tip("Use `lockbox add` to add entries to the existing vault.");
        return Err(LockboxError::VaultAlreadyExists);
    }

    let password = prompt_new_password("LOCKBOX_PASSWORD", "master password")?;
    let score = strength(&password);
    output::info(&format!("Master password strength: {}", output::strength(score)));
    if StrengthLabel::from_score(score) == StrengthLabel::Weak {
        output::warning(
            "This master password is weak. Mix upper and lower case, digits and symbols.",
        );
    }
    let vault = ctx.lockbox.create_vault(&password, name)?;
    ctx.lockbox.lock();

    audit_event(&ctx, AuditKind::VaultCreated, Some(name));
    output::success(&format!(
        "Vault '{}' created in {}",
        vault.name,
        ctx.data_dir.display()
    ));

    output::tip("Run `lockbox add <TITLE> --generate` to store a new password.");
    output::tip("Run `lockbox self-destruct 10` to wipe the vault after 10 failed unlocks.");

    Ok(())
}
