//! `lockbox share` / `lockbox open-link`: one-time links.
//!
//! The printed link is `<id>#<key>`.  Only the id identifies the stored
//! record; the key after `#` is what decrypts it and is never stored.

use crate::cli::output;
use crate::cli::{audit_subject, open, unlock, AuditKind, Cli};
use crate::errors::Result;
use crate::links::parse_fragment;

/// Execute the `share` command.
pub fn execute(cli: &Cli, entry: &str, ttl: u32, max_accesses: u32) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let found = ctx.lockbox.find_entry(entry)?;
    ctx.lockbox.vault()?;

    let purged = ctx.lockbox.links().purge_expired()?;
    if purged > 0 {
        output::info(&format!("Removed {purged} expired link(s)."));
    }

    let link = ctx
        .lockbox
        .links()
        .create_link(&found.id, &found.password, ttl, max_accesses)?;

    audit_subject(&ctx, AuditKind::LinkCreated, Some(&link.id), Some(&found.id));
    output::success(&format!(
        "One-time link for '{}' (expires {}, {} use{}):",
        found.title,
        link.expires_at.format("%Y-%m-%d %H:%M UTC"),
        max_accesses,
        if max_accesses == 1 { "" } else { "s" }
    ));
    println!("{}", link.fragment());

    Ok(())
}

/// Execute the `open-link` command.  No master password is needed.
pub fn open_link(cli: &Cli, link: &str) -> Result<()> {
    let (id, key) = parse_fragment(link)?;
    let ctx = open(cli)?;

    let secret = ctx.lockbox.links().access_link(&id, &key)?;

    audit_subject(&ctx, AuditKind::LinkAccessed, Some(&id), None);
    println!("{}", secret.as_str());

    Ok(())
}
