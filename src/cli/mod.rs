//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{LockboxError, Result};
use crate::unlock::{Lockbox, UnlockOutcome};

/// Minimum master password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Lockbox CLI: local-first personal secrets vault.
#[derive(Parser)]
#[command(name = "lockbox", about = "Local-first personal secrets vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (overrides `data_dir` in .lockbox.toml)
    #[arg(long, global = true, env = "LOCKBOX_DIR")]
    pub data_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault
    Init {
        /// Vault name
        #[arg(long, default_value = "Personal")]
        name: String,
    },

    /// Add a password entry
    Add {
        /// Entry title (e.g. GitHub)
        title: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        url: String,
        /// Password to store (omit for a prompt, or use --generate)
        #[arg(short, long, conflicts_with = "generate")]
        password: Option<String>,
        /// Generate a strong random password
        #[arg(short, long)]
        generate: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List all entries
    List,

    /// Search entries by title, username, url, notes, category or tag
    Search {
        query: String,
    },

    /// Print an entry's password
    Get {
        /// Entry id or title
        entry: String,
    },

    /// Copy an entry's password to the clipboard
    Copy {
        /// Entry id or title
        entry: String,
    },

    /// Delete an entry
    Rm {
        /// Entry id or title
        entry: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a password or passphrase
    Generate {
        #[arg(short, long, default_value = "20")]
        length: usize,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_symbols: bool,
        /// Generate a passphrase of this many words instead
        #[arg(long, value_name = "WORDS")]
        passphrase: Option<usize>,
    },

    /// Score a password (0-100)
    Strength {
        password: String,
    },

    /// Write the encrypted vault blob to a backup file
    Backup {
        /// Output file (default: lockbox-<date>.lbx)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replace the vault with a backup file
    Restore {
        file: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the master password
    ChangePassword,

    /// Create a one-time link for an entry's password
    Share {
        /// Entry id or title
        entry: String,
        /// Minutes until the link expires
        #[arg(long, default_value = "60")]
        ttl: u32,
        /// How many times the link can be opened
        #[arg(long, default_value = "1")]
        max_accesses: u32,
    },

    /// Open a one-time link (`<id>#<key>`)
    OpenLink {
        link: String,
    },

    /// Split the vault into shards or rebuild it from shards
    Shard {
        #[command(subcommand)]
        action: ShardAction,
    },

    /// Rotate stale or weak passwords
    Rotate {
        /// Only report what would be rotated
        #[arg(long)]
        check: bool,
        /// Enable the rotation policy with these settings
        #[arg(long)]
        enable: bool,
        #[arg(long)]
        interval_days: Option<u32>,
        #[arg(long)]
        min_strength: Option<u8>,
        /// Never rotate this entry id (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Wipe the vault after this many failed unlocks (0 disables)
    SelfDestruct {
        max_attempts: u32,
    },

    /// Manage the duress password
    Duress {
        #[command(subcommand)]
        action: DuressAction,
    },

    /// Manage stacked passphrases
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },

    /// View the security event log
    Audit {
        /// Number of entries to show
        #[arg(long, default_value = "50")]
        last: usize,
    },
}

#[derive(clap::Subcommand)]
pub enum ShardAction {
    /// Split the vault into N shard files
    Split {
        #[arg(short, long, default_value = "3")]
        shards: usize,
        /// Directory for the shard files
        #[arg(short, long, default_value = ".")]
        output: String,
    },
    /// Rebuild the vault from shard files
    Combine {
        #[arg(required = true)]
        files: Vec<String>,
    },
}

#[derive(clap::Subcommand)]
pub enum DuressAction {
    /// Set the duress password
    Set,
    /// Remove the duress password and decoy data
    Disable,
}

#[derive(clap::Subcommand)]
pub enum StackAction {
    /// Require these passphrases after the master password
    Enable {
        #[arg(required = true, num_args = 2..)]
        phrases: Vec<String>,
    },
    /// Stop requiring stacked passphrases
    Disable,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// An opened installation plus what the commands need alongside it.
pub struct Context {
    pub lockbox: Lockbox,
    pub settings: Settings,
    pub data_dir: PathBuf,
    /// Master password, when the command unlocked the vault.
    pub password: Zeroizing<String>,
}

/// Load settings and open the on-disk installation without unlocking.
pub fn open(cli: &Cli) -> Result<Context> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    let data_dir = settings.data_path(&cwd);
    let lockbox = Lockbox::open(&settings, &cwd)?;

    Ok(Context {
        lockbox,
        settings,
        data_dir,
        password: Zeroizing::new(String::new()),
    })
}

/// Open and unlock, prompting for stacked passphrases when needed.
///
/// A duress unlock succeeds like a normal one; reads then come from the
/// decoy dataset.
pub fn unlock(cli: &Cli) -> Result<Context> {
    let mut ctx = open(cli)?;
    let password = prompt_password()?;

    let outcome = match ctx.lockbox.unlock(&password) {
        Ok(outcome) => outcome,
        Err(LockboxError::WipeTriggered) => {
            audit_event(&ctx, AuditKind::Wiped, None);
            return Err(LockboxError::WipeTriggered);
        }
        Err(e) => return Err(e),
    };

    match outcome {
        UnlockOutcome::Unlocked => audit_event(&ctx, AuditKind::Unlocked, None),
        UnlockOutcome::Decoy => {}
        UnlockOutcome::PassphrasesRequired { remaining } => {
            enter_passphrases(&mut ctx.lockbox, remaining)?;
            audit_event(&ctx, AuditKind::Unlocked, None);
        }
        UnlockOutcome::Rejected { remaining } => {
            let details = remaining.map(|r| format!("{r} attempt(s) left"));
            audit_event(&ctx, AuditKind::UnlockFailed, details.as_deref());
            if let Some(r) = remaining {
                output::warning(&format!("{r} attempt(s) left before the vault is wiped."));
            }
            return Err(LockboxError::DecryptionFailed);
        }
    }

    ctx.password = password;
    Ok(ctx)
}

/// Feed stacked passphrases from `LOCKBOX_PASSPHRASES` (comma separated)
/// or interactive prompts.
fn enter_passphrases(lockbox: &mut Lockbox, mut remaining: usize) -> Result<()> {
    if let Ok(list) = std::env::var("LOCKBOX_PASSPHRASES") {
        let list = Zeroizing::new(list);
        for phrase in list.split(',').filter(|p| !p.is_empty()) {
            if let UnlockOutcome::Unlocked = lockbox.enter_passphrase(phrase)? {
                return Ok(());
            }
        }
        return Err(LockboxError::CommandFailed(
            "not every stacked passphrase was supplied".into(),
        ));
    }

    while remaining > 0 {
        let phrase = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt(format!("Passphrase ({remaining} remaining)"))
                .interact()
                .map_err(|e| LockboxError::CommandFailed(format!("passphrase prompt: {e}")))?,
        );
        remaining = match lockbox.enter_passphrase(&phrase)? {
            UnlockOutcome::PassphrasesRequired { remaining } => remaining,
            _ => 0,
        };
    }
    Ok(())
}

/// Get the master password from `LOCKBOX_PASSWORD` or an interactive
/// prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("LOCKBOX_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` lets scripts supply it (`LOCKBOX_PASSWORD` for `init`,
/// `LOCKBOX_NEW_PASSWORD` for `change-password`).  Enforces a minimum
/// length.
pub fn prompt_new_password(env_var: &str, label: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(LockboxError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt(format!("Choose {label}"))
            .with_confirmation(format!("Confirm {label}"), "Passwords do not match, try again")
            .interact()
            .map_err(|e| LockboxError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Ask a yes/no question; `default` is used on Enter.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| LockboxError::CommandFailed(format!("confirm prompt: {e}")))
}

#[cfg(feature = "audit-log")]
pub use crate::audit::SecurityEvent as AuditKind;

/// Stand-in when the audit log is compiled out.
#[cfg(not(feature = "audit-log"))]
#[derive(Debug, Clone, Copy)]
pub enum AuditKind {
    VaultCreated,
    Unlocked,
    UnlockFailed,
    Wiped,
    EntryAdded,
    EntryDeleted,
    SecretRevealed,
    BackupCreated,
    BackupRestored,
    PasswordChanged,
    LinkCreated,
    LinkAccessed,
    VaultSplit,
    ShardsCombined,
    PasswordsRotated,
    SettingsChanged,
}

/// Record a security event.  Never fails the calling command, and is
/// skipped entirely during a duress session.
pub fn audit_event(ctx: &Context, event: AuditKind, details: Option<&str>) {
    audit_subject(ctx, event, None, details);
}

/// Audit a restore that failed on the master password.
pub fn audit_restore_failure(ctx: &Context, err: &LockboxError, source: &str) {
    match err {
        LockboxError::WipeTriggered => audit_event(ctx, AuditKind::Wiped, Some(source)),
        LockboxError::DecryptionFailed | LockboxError::ShardDecryptionFailed { .. } => {
            audit_event(ctx, AuditKind::UnlockFailed, Some(source))
        }
        _ => {}
    }
}

pub fn audit_subject(ctx: &Context, event: AuditKind, subject: Option<&str>, details: Option<&str>) {
    if ctx.lockbox.is_in_duress_mode() {
        return;
    }
    #[cfg(feature = "audit-log")]
    crate::audit::record(&ctx.data_dir, event, subject, details);
    #[cfg(not(feature = "audit-log"))]
    let _ = (event, subject, details);
}
