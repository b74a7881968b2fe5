//! Transient notification banner with timed auto-clear.

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Info,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }
}

/// What a scheduled clear is allowed to wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// A clear only applies while its own notification is still the latest one.
    #[default]
    LatestOnly,
    /// Every clear fires unconditionally, so an older timer can wipe a newer banner.
    Independent,
}

#[derive(Debug, Error)]
#[error("unknown clear policy '{0}' (expected 'latest_only' or 'independent')")]
pub struct UnknownClearPolicy(String);

impl FromStr for ClearPolicy {
    type Err = UnknownClearPolicy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "latest" | "latest_only" | "latest-only" => Ok(Self::LatestOnly),
            "independent" => Ok(Self::Independent),
            other => Err(UnknownClearPolicy(other.to_string())),
        }
    }
}

#[derive(Default)]
struct Banner {
    current: Option<Notification>,
    generation: u64,
}

/// Holds the current notification and schedules its removal.
///
/// Each [`Notifier::notify`] call spawns its own clear task on the tokio runtime;
/// the tasks are never cancelled.
#[derive(Clone)]
pub struct Notifier {
    banner: Arc<Mutex<Banner>>,
    ttl: Duration,
    policy: ClearPolicy,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL, ClearPolicy::default())
    }
}

impl Notifier {
    pub fn new(ttl: Duration, policy: ClearPolicy) -> Self {
        Self {
            banner: Arc::new(Mutex::new(Banner::default())),
            ttl,
            policy,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shows `notification` and returns the generation it was assigned.
    pub async fn notify(&self, notification: Notification) -> u64 {
        let generation = {
            let mut banner = self.banner.lock().await;
            banner.generation += 1;
            banner.current = Some(notification);
            banner.generation
        };

        let banner = Arc::clone(&self.banner);
        let ttl = self.ttl;
        let policy = self.policy;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut banner = banner.lock().await;
            if policy == ClearPolicy::Independent || banner.generation == generation {
                banner.current = None;
                debug!(generation, "notification cleared");
            }
        });

        generation
    }

    pub async fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(Notification::info(message)).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(Notification::error(message)).await
    }

    pub async fn current(&self) -> Option<Notification> {
        self.banner.lock().await.current.clone()
    }
}

#[cfg(test)]
#[path = "tests/notification_tests.rs"]
mod tests;
