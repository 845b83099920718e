//! `lockbox shard split|combine`.
//!
//! Split writes one JSON file per shard and also keeps the set in the
//! installation.  Combine reads shard files back, rebuilds the vault
//! document and restores it.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{
    audit_event, audit_restore_failure, confirm, open, prompt_password, unlock, AuditKind, Cli,
};
use crate::errors::Result;
use crate::sharding::VaultShard;

/// Execute `shard split`.
pub fn split(cli: &Cli, shards: usize, output_dir: &str) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let password = ctx.password.clone();
    let set = ctx.lockbox.split_current_vault(shards, &password)?;
    ctx.lockbox.shards().save_set(&set)?;

    let dir = Path::new(output_dir);
    fs::create_dir_all(dir)?;
    for shard in &set {
        let path = dir.join(shard_file_name(shard));
        fs::write(&path, serde_json::to_string_pretty(shard)?)?;
        output::info(&format!("Wrote {}", path.display()));
    }

    audit_event(&ctx, AuditKind::VaultSplit, Some(&format!("{shards} shards")));
    output::success(&format!(
        "Vault split into {shards} shards — all {shards} are needed to rebuild it."
    ));

    Ok(())
}

/// Execute `shard combine`.
pub fn combine(cli: &Cli, files: &[String]) -> Result<()> {
    let shards = files
        .iter()
        .map(|f| Ok(serde_json::from_str(&fs::read_to_string(f)?)?))
        .collect::<Result<Vec<VaultShard>>>()?;

    let mut ctx = open(cli)?;
    if ctx.lockbox.exists()? && !confirm("Replace the existing vault with the rebuilt one?", false)? {
        output::info("Cancelled.");
        return Ok(());
    }

    let password = prompt_password()?;
    let vault = match ctx.lockbox.restore_from_shards(&shards, &password) {
        Ok(vault) => vault,
        Err(e) => {
            audit_restore_failure(&ctx, &e, "shards");
            return Err(e);
        }
    };

    audit_event(&ctx, AuditKind::ShardsCombined, Some(&format!("{} shards", shards.len())));
    output::success(&format!(
        "Rebuilt vault '{}' ({} entries)",
        vault.name,
        vault.entries.len()
    ));

    Ok(())
}

fn shard_file_name(shard: &VaultShard) -> String {
    let short: String = shard.set_id.chars().take(8).collect();
    format!(
        "lockbox-{short}-{}-of-{}.shard.json",
        shard.index + 1,
        shard.total_shards
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn shard_file_name_is_one_based() {
        let shard = VaultShard {
            set_id: "0123456789abcdef".into(),
            index: 0,
            total_shards: 3,
            data: String::new(),
            checksum: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(shard_file_name(&shard), "lockbox-01234567-1-of-3.shard.json");
    }
}
