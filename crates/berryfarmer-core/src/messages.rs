//! Host system messages and the timestamps they leave behind.
//!
//! The game reports harvest and upgrade results as chat-style system
//! messages identified by string ids. They arrive between ticks; the engine
//! only records when each one was last seen and reads those timestamps
//! during the next tick.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A system message the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemMessage {
    /// Berries were received from a bush.
    HarvestReceived,
    /// The bush is on cooldown.
    HarvestCooldown,
    /// A glove upgrade attempt failed.
    UpgradeFailed,
    /// A glove upgrade attempt succeeded.
    UpgradeSucceeded,
    /// Anything else.
    Other,
}

impl SystemMessage {
    /// Classify a host message id.
    pub fn parse(id: &str) -> Self {
        match id {
            "ids_textclient_harvest_receive" => Self::HarvestReceived,
            "ids_textclient_harvest_cooldown" => Self::HarvestCooldown,
            "ids_textclient_upgrade_fail" => Self::UpgradeFailed,
            "textclient_upgrade_successful" => Self::UpgradeSucceeded,
            _ => Self::Other,
        }
    }

    /// The host id of this message, if it is one the engine knows.
    pub const fn id(self) -> Option<&'static str> {
        match self {
            Self::HarvestReceived => Some("ids_textclient_harvest_receive"),
            Self::HarvestCooldown => Some("ids_textclient_harvest_cooldown"),
            Self::UpgradeFailed => Some("ids_textclient_upgrade_fail"),
            Self::UpgradeSucceeded => Some("textclient_upgrade_successful"),
            Self::Other => None,
        }
    }
}

/// Timestamps left by system messages and the engine's own attempts.
///
/// `None` means "never", which is always old enough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestTimers {
    /// Last harvest-cooldown message.
    pub harvest_cooldown_at: Option<u64>,
    /// Last harvest-received message.
    pub last_harvest_success_at: Option<u64>,
    /// Last upgrade scroll the engine used, cleared when its result arrives.
    pub last_upgrade_attempt_at: Option<u64>,
}

impl HarvestTimers {
    /// Record a message seen at `now_ms`.
    pub fn record(&mut self, message: SystemMessage, now_ms: u64) {
        match message {
            SystemMessage::HarvestReceived => self.last_harvest_success_at = Some(now_ms),
            SystemMessage::HarvestCooldown => self.harvest_cooldown_at = Some(now_ms),
            SystemMessage::UpgradeFailed | SystemMessage::UpgradeSucceeded => {
                self.last_upgrade_attempt_at = None;
            }
            SystemMessage::Other => return,
        }
        debug!(?message, now_ms, "System message recorded");
    }

    /// Whether both harvest messages are older than `backoff_ms`.
    pub fn harvest_settled(&self, now_ms: u64, backoff_ms: u64) -> bool {
        older_than(self.harvest_cooldown_at, now_ms, backoff_ms)
            && older_than(self.last_harvest_success_at, now_ms, backoff_ms)
    }

    /// Whether another upgrade may be attempted.
    pub fn upgrade_ready(&self, now_ms: u64, retry_ms: u64) -> bool {
        self.last_upgrade_attempt_at
            .is_none_or(|at| now_ms.saturating_sub(at) >= retry_ms)
    }
}

fn older_than(at: Option<u64>, now_ms: u64, age_ms: u64) -> bool {
    at.is_none_or(|at| now_ms.saturating_sub(at) > age_ms)
}
