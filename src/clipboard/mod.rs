//! Copy a secret to the system clipboard and clear it later.
//!
//! The clear runs on a detached thread.  It only wipes the clipboard if
//! it still holds the value we put there, so anything the user copied in
//! the meantime is left alone.

use std::thread;
use std::time::Duration;

use arboard::Clipboard;
use tracing::debug;
use zeroize::Zeroizing;

use crate::errors::{LockboxError, Result};

/// Put `secret` on the clipboard and schedule a clear after `clear_after`.
///
/// A zero `clear_after` disables the scheduled clear.  Returns the join
/// handle of the clearing thread, if one was spawned.
pub fn copy_with_clear(secret: &str, clear_after: Duration) -> Result<Option<thread::JoinHandle<()>>> {
    let mut clipboard = Clipboard::new().map_err(clipboard_error)?;
    clipboard
        .set_text(secret.to_string())
        .map_err(clipboard_error)?;

    if clear_after.is_zero() {
        return Ok(None);
    }

    let copied = Zeroizing::new(secret.to_string());
    let handle = thread::spawn(move || {
        thread::sleep(clear_after);
        let Ok(mut clipboard) = Clipboard::new() else {
            return;
        };
        let current = clipboard.get_text().map(Zeroizing::new);
        if matches!(current, Ok(ref text) if *text == copied) {
            let _ = clipboard.clear();
            debug!("clipboard cleared");
        }
    });
    Ok(Some(handle))
}

fn clipboard_error(e: arboard::Error) -> LockboxError {
    LockboxError::CommandFailed(format!("clipboard unavailable: {e}"))
}
