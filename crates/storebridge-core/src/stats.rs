//! Bridge activity counters

use serde::Serialize;

/// Counters for everything the bridge has relayed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStats {
    /// Non-null values written to storage
    pub saves: u64,
    /// Null saves (slot removed)
    pub clears: u64,
    /// Save or clear calls that failed at the storage layer
    pub write_failures: u64,
    /// Confirmations posted to the task queue
    pub confirmations_scheduled: u64,
    /// Confirmations delivered to the application
    pub confirmations_delivered: u64,
    /// Cross-tab changes forwarded to the application
    pub external_forwarded: u64,
    /// Cross-tab changes dropped by the key/area filter
    pub external_ignored: u64,
}

impl BridgeStats {
    /// Confirmations posted but not yet delivered
    pub fn confirmations_pending(&self) -> u64 {
        self.confirmations_scheduled.saturating_sub(self.confirmations_delivered)
    }

    /// Total notifications the application has received
    pub fn notifications_sent(&self) -> u64 {
        self.confirmations_delivered + self.external_forwarded
    }
}
