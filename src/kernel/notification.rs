//! Latest-wins transient status message.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
    pub generation: u64,
}

/// Holds at most one notification. Each publish bumps the generation, so an
/// expiry timer scheduled for an older message cannot clear a newer one.
#[derive(Debug)]
pub struct NotificationState {
    current: Option<Notification>,
    generation: u64,
    ttl: Duration,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}

impl NotificationState {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn publish(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(Notification {
            message: message.into(),
            severity,
            created_at: now,
            generation: self.generation,
        });
        self.generation
    }

    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Clears the notification only if `generation` is still the current one.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|n| n.generation == generation)
        {
            self.current = None;
            return true;
        }
        false
    }

    pub fn expire_due(&mut self, now: Instant) -> bool {
        let due = self
            .current
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.created_at) >= self.ttl);
        if due {
            self.current = None;
        }
        due
    }
}
