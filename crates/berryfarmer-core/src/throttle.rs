//! Per-key cooldowns for side-effecting host commands.
//!
//! The host ticks roughly ten times per second. Equip, upgrade, harvest, and
//! UI commands must not be re-issued that often, so each logical command
//! stream gets its own cooldown keyed by a free-form name. Keys name the
//! kind of action (`EQUIP_ITEM`), never a particular target entity.
//!
//! The same mechanism rate-limits repeated warnings ("despamming").

use std::collections::HashMap;

/// Statistics display refresh.
pub const KEY_UPDATE_STATISTIC: &str = "UPDATE_STATISTIC";
/// Collect command on a bush.
pub const KEY_COLLECT_BERRIES: &str = "COLLECT_BERRIES";
/// Equip or unequip command. Shared by the upgrade and equip behaviours.
pub const KEY_EQUIP_ITEM: &str = "EQUIP_ITEM";
/// Vendor menu clicks.
pub const KEY_UI_INTERACTION: &str = "UI_INTERACTION";
/// Glove purchase.
pub const KEY_PURCHASE_GLOVES: &str = "PURCHASE_GLOVES";
/// "Missing Power Dice 8" complaint.
pub const KEY_COMPLAIN_MISSING_DICE: &str = "COMPLAIN_MISSING_PD8";
/// Warning about materials of an unknown bush kind.
pub const KEY_WARN_UNKNOWN_BUSH: &str = "WARN_UNKNOWN_BUSH";
/// Warning about the glove vendor being unknown or absent.
pub const KEY_WARN_VENDOR_MISSING: &str = "WARN_VENDOR_MISSING";

/// Registry of last-invocation timestamps, one per action key.
///
/// Entries are created on first use and live for the whole run.
#[derive(Debug, Clone, Default)]
pub struct ActionThrottle {
    last_run_at: HashMap<String, u64>,
}

impl ActionThrottle {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` if at least `interval_ms` have passed since the last run
    /// under `key` (or it never ran). Returns the action's result, or `None`
    /// when throttled.
    ///
    /// The timestamp is only updated when the action actually runs.
    pub fn run_throttled<R>(
        &mut self,
        now_ms: u64,
        key: &str,
        interval_ms: u64,
        action: impl FnOnce() -> R,
    ) -> Option<R> {
        if !self.is_ready(now_ms, key, interval_ms) {
            return None;
        }
        self.last_run_at.insert(key.to_owned(), now_ms);
        Some(action())
    }

    /// Whether an action under `key` would run at `now_ms`.
    pub fn is_ready(&self, now_ms: u64, key: &str, interval_ms: u64) -> bool {
        self.last_run_at
            .get(key)
            .is_none_or(|last| now_ms.saturating_sub(*last) >= interval_ms)
    }

    /// Timestamp of the last run under `key`.
    pub fn last_run_at(&self, key: &str) -> Option<u64> {
        self.last_run_at.get(key).copied()
    }
}
