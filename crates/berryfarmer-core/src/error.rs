//! Error types for the `berryfarmer-core` crate.
//!
//! Faults fall in two classes. Configuration faults mean the operator set
//! the agent up in a way it cannot work with; they terminate the run.
//! Host faults come from the bot platform refusing or failing a command and
//! are passed through unchanged. Soft "expected missing data" conditions
//! (unknown bush kinds, an absent vendor) never become errors: the handler
//! that saw them logs at a rate-limited cadence and reports no action.

use berryfarmer_types::ItemId;

/// Failure reported by the host platform while executing a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("host command `{command}` failed: {message}")]
pub struct HostError {
    /// Name of the command that failed (e.g. `navigate_to`).
    pub command: &'static str,
    /// Host-provided description.
    pub message: String,
}

impl HostError {
    /// Create a host error for the given command.
    pub fn new(command: &'static str, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
        }
    }
}

/// Errors that can surface out of a tick.
#[derive(Debug, thiserror::Error)]
pub enum FarmerError {
    /// No berry type is enabled for collection.
    #[error("BerryFarmer started but not configured to collect any berries")]
    NoBerryTypeSelected,

    /// The route needs at least two waypoints.
    #[error(
        "BerryFarmer started with {configured} waypoint(s); configure at least 2 waypoints to use the script"
    )]
    TooFewWaypoints {
        /// Number of waypoints found in the configuration.
        configured: usize,
    },

    /// The player owns no copy of a required tool and buying it is disabled.
    #[error("player does not own item {item_id} and the \"Purchase Gloves\" option is disabled")]
    ToolNotOwned {
        /// The missing tool.
        item_id: ItemId,
    },

    /// Every behaviour declined to act on a valid configuration.
    #[error("no behaviour applied this tick; the agent does not know what to do")]
    NoApplicableBehaviour,

    /// The tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// A host command failed.
    #[error("{source}")]
    Host {
        /// The underlying host error.
        #[from]
        source: HostError,
    },
}

impl FarmerError {
    /// Whether this fault is an operator misconfiguration that must stop the
    /// run rather than be retried next tick.
    pub const fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::NoBerryTypeSelected
                | Self::TooFewWaypoints { .. }
                | Self::ToolNotOwned { .. }
                | Self::NoApplicableBehaviour
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_faults_are_classified() {
        assert!(FarmerError::NoBerryTypeSelected.is_configuration_fault());
        assert!(FarmerError::TooFewWaypoints { configured: 1 }.is_configuration_fault());
        assert!(FarmerError::ToolNotOwned { item_id: ItemId(4004) }.is_configuration_fault());
        assert!(FarmerError::NoApplicableBehaviour.is_configuration_fault());
    }

    #[test]
    fn host_faults_are_not_configuration_faults() {
        let err = FarmerError::from(HostError::new("buy_item", "not enough penya"));
        assert!(!err.is_configuration_fault());
        assert_eq!(err.to_string(), "host command `buy_item` failed: not enough penya");
    }

    #[test]
    fn waypoint_fault_reports_count() {
        let err = FarmerError::TooFewWaypoints { configured: 1 };
        assert!(err.to_string().contains("1 waypoint(s)"));
    }
}
