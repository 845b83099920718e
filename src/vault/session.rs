//! The unlocked session: cached master secret, inactivity deadline and
//! activity-listener registration, owned by one object.
//!
//! The inactivity timer is deadline based.  Activity while listening
//! pushes the deadline out by the full timeout; every access checks the
//! deadline first and ends the session once it has passed.  A host that
//! wants the lock to happen without any access polls `tick()`.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::errors::{LockboxError, Result};

/// Default inactivity timeout (5 minutes).
pub const DEFAULT_AUTO_LOCK: Duration = Duration::from_secs(5 * 60);

/// User activity that keeps a session alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    Pointer,
    Key,
    Touch,
    Scroll,
}

/// Session state for one installation.
pub struct Session {
    secret: Option<Zeroizing<String>>,
    deadline: Option<Instant>,
    timeout: Duration,
    listening: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_LOCK)
    }
}

impl Session {
    pub fn new(timeout: Duration) -> Self {
        Self {
            secret: None,
            deadline: None,
            timeout,
            listening: false,
        }
    }

    /// Cache the secret, register listeners and arm the timer.
    pub fn start(&mut self, secret: &str) {
        self.secret = Some(Zeroizing::new(secret.to_string()));
        self.listening = true;
        self.deadline = Some(Instant::now() + self.timeout);
        debug!(timeout_secs = self.timeout.as_secs(), "session started");
    }

    /// Clear the secret, cancel the timer and deregister listeners.
    ///
    /// Safe to call on an already-ended session.
    pub fn end(&mut self) {
        self.secret = None;
        self.deadline = None;
        self.listening = false;
    }

    /// True while a secret is cached and the deadline has not passed.
    pub fn is_live(&mut self) -> bool {
        self.tick();
        self.secret.is_some()
    }

    /// The cached secret, or `VaultLocked` if there is no live session.
    pub fn secret(&mut self) -> Result<Zeroizing<String>> {
        if !self.is_live() {
            return Err(LockboxError::VaultLocked);
        }
        self.secret.clone().ok_or(LockboxError::VaultLocked)
    }

    /// Reset the inactivity timer.  Ignored when no listeners are
    /// registered.  Returns whether the event was accepted.
    pub fn record_activity(&mut self, event: ActivityEvent) -> bool {
        if !self.listening || self.tick() {
            return false;
        }
        self.deadline = Some(Instant::now() + self.timeout);
        debug!(?event, "activity reset auto-lock timer");
        true
    }

    /// Fire the timer if its deadline has passed.  Returns `true` when
    /// this call locked the session.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.end();
                info!("vault auto-locked after inactivity");
                true
            }
            _ => false,
        }
    }

    /// Change the timeout; a running timer is re-armed with the new value.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
        if self.deadline.is_some() {
            self.deadline = Some(Instant::now() + timeout);
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before the timer fires, if it is armed.
    pub fn time_until_lock(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_session_is_locked() {
        let mut session = Session::default();
        assert!(!session.is_live());
        assert!(matches!(session.secret(), Err(LockboxError::VaultLocked)));
    }

    #[test]
    fn start_and_end() {
        let mut session = Session::default();
        session.start("pw");
        assert!(session.is_live());
        assert!(session.is_listening());
        assert_eq!(session.secret().unwrap().as_str(), "pw");

        session.end();
        session.end();
        assert!(!session.is_live());
        assert!(!session.is_listening());
        assert!(session.time_until_lock().is_none());
    }

    #[test]
    fn deadline_locks_session() {
        let mut session = Session::new(Duration::from_secs(60));
        session.start("pw");

        assert!(!session.tick_at(Instant::now()));
        assert!(session.tick_at(Instant::now() + Duration::from_secs(61)));
        assert!(!session.is_live());
        // Fires at most once.
        assert!(!session.tick_at(Instant::now() + Duration::from_secs(120)));
    }

    #[test]
    fn activity_resets_timer() {
        // Wide margins to stay stable on slow CI runners.
        let mut session = Session::new(Duration::from_millis(250));
        session.start("pw");

        thread::sleep(Duration::from_millis(150));
        assert!(session.record_activity(ActivityEvent::Key));

        thread::sleep(Duration::from_millis(150));
        assert!(session.is_live(), "activity should have pushed the deadline");

        thread::sleep(Duration::from_millis(300));
        assert!(!session.is_live());
    }

    #[test]
    fn activity_ignored_when_not_listening() {
        let mut session = Session::default();
        assert!(!session.record_activity(ActivityEvent::Pointer));
        assert!(session.time_until_lock().is_none());
    }

    #[test]
    fn set_timeout_rearms() {
        let mut session = Session::new(Duration::from_secs(600));
        session.start("pw");
        session.set_timeout(Duration::from_secs(1));
        assert!(session.time_until_lock().unwrap() <= Duration::from_secs(1));
    }
}
