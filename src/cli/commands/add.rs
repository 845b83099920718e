//! `lockbox add`: store a new password entry.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{audit_subject, unlock, AuditKind, Cli};
use crate::crypto::{generate_password, strength, CharClasses};
use crate::errors::{LockboxError, Result};
use crate::vault::NewEntry;

/// Length used by `--generate`.
const GENERATED_LENGTH: usize = 20;

/// Fields for a new entry, as given on the command line.
pub struct AddArgs<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub url: &'a str,
    pub password: Option<&'a str>,
    pub generate: bool,
    pub notes: Option<&'a str>,
    pub category: Option<&'a str>,
    pub tags: &'a [String],
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    let password = match (args.password, args.generate) {
        (_, true) => Zeroizing::new(generate_password(GENERATED_LENGTH, CharClasses::ALL)?),
        (Some(pw), false) => Zeroizing::new(pw.to_string()),
        (None, false) => Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Password for {}", args.title))
                .interact()
                .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?,
        ),
    };

    let mut ctx = unlock(cli)?;

    let mut entry = NewEntry::new(args.title, args.username, &password, args.url);
    entry.notes = args.notes.map(str::to_string);
    entry.category = args.category.map(str::to_string);
    entry.tags = args.tags.to_vec();

    let added = ctx.lockbox.vault()?.add_entry(entry)?;

    audit_subject(&ctx, AuditKind::EntryAdded, Some(&added.id), None);
    output::success(&format!(
        "Added '{}' — strength {}",
        added.title,
        output::strength(strength(&password))
    ));
    if args.generate {
        output::tip(&format!("Run `lockbox copy {}` to copy it.", added.title));
    }

    Ok(())
}
