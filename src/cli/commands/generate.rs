//! `lockbox generate` / `lockbox strength`: offline helpers, no vault
//! needed.

use crate::cli::output;
use crate::crypto::{generate_passphrase, generate_password, strength, CharClasses};
use crate::errors::Result;

/// Execute the `generate` command.
pub fn execute(length: usize, classes: CharClasses, passphrase: Option<usize>) -> Result<()> {
    let generated = match passphrase {
        Some(words) => generate_passphrase(words)?,
        None => generate_password(length, classes)?,
    };
    println!("{generated}");
    Ok(())
}

/// Execute the `strength` command.
pub fn strength_cmd(password: &str) -> Result<()> {
    let score = strength(password);
    output::info(&format!("Strength: {}", output::strength(score)));
    if score < 70 {
        output::tip("Longer passwords with mixed case, digits and symbols score higher.");
    }
    Ok(())
}
