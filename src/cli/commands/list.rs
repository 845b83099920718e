//! `lockbox list` / `lockbox search`: display entries in a table.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let entries = ctx.lockbox.entries()?;

    output::info(&format!("{} entr{}", entries.len(), plural(entries.len())));
    output::print_entries_table(&entries);

    Ok(())
}

/// Execute the `search` command.
pub fn search(cli: &Cli, query: &str) -> Result<()> {
    let mut ctx = unlock(cli)?;
    let entries = ctx.lockbox.search(query)?;

    output::info(&format!(
        "{} match{} for '{query}'",
        entries.len(),
        if entries.len() == 1 { "" } else { "es" }
    ));
    output::print_entries_table(&entries);

    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
