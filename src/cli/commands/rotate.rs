//! `lockbox rotate`: replace stale or weak passwords.
//!
//! With `--check` it only lists what the policy flags.  Policy flags
//! (`--enable`, `--interval-days`, `--min-strength`, `--exclude`) update
//! the stored settings first.

use chrono::Utc;

use crate::cli::output;
use crate::cli::{audit_event, unlock, AuditKind, Cli};
use crate::errors::Result;
use crate::rotation::passwords_needing_rotation;

/// Policy changes requested on the command line.
pub struct PolicyArgs<'a> {
    pub enable: bool,
    pub interval_days: Option<u32>,
    pub min_strength: Option<u8>,
    pub exclude: &'a [String],
}

impl PolicyArgs<'_> {
    fn is_empty(&self) -> bool {
        !self.enable
            && self.interval_days.is_none()
            && self.min_strength.is_none()
            && self.exclude.is_empty()
    }
}

/// Execute the `rotate` command.
pub fn execute(cli: &Cli, check: bool, policy: PolicyArgs<'_>) -> Result<()> {
    let mut ctx = unlock(cli)?;
    ctx.lockbox.vault()?;

    if !policy.is_empty() {
        let mut settings = ctx.lockbox.rotation().settings()?;
        settings.enabled |= policy.enable;
        if let Some(days) = policy.interval_days {
            settings.interval_days = days;
        }
        if let Some(min) = policy.min_strength {
            settings.min_strength = min;
        }
        for id in policy.exclude {
            if !settings.excluded_ids.contains(id) {
                settings.excluded_ids.push(id.clone());
            }
        }
        ctx.lockbox.rotation().save_settings(&settings)?;
        audit_event(&ctx, AuditKind::SettingsChanged, Some("rotation policy"));
    }

    let settings = ctx.lockbox.rotation().settings()?;
    let entries = ctx.lockbox.entries()?;
    let candidates = passwords_needing_rotation(&entries, &settings, Utc::now());

    if candidates.is_empty() {
        output::success("No passwords need rotation.");
        return Ok(());
    }

    output::info(&format!("{} password(s) need rotation:", candidates.len()));
    output::print_rotation_table(&candidates);
    if check {
        return Ok(());
    }

    if !settings.enabled {
        output::tip("Run `lockbox rotate --enable` to turn on automatic rotation.");
        return Ok(());
    }

    let report = ctx.lockbox.rotate_all()?;
    for (id, reason) in &report.failed {
        output::warning(&format!("Could not rotate {id}: {reason}"));
    }

    audit_event(
        &ctx,
        AuditKind::PasswordsRotated,
        Some(&format!(
            "{} rotated, {} failed",
            report.rotated.len(),
            report.failed.len()
        )),
    );
    output::success(&format!("Rotated {} password(s).", report.rotated.len()));

    Ok(())
}
