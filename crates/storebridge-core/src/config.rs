//! Bridge configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHANGE_PORT, DEFAULT_MOUNT_SELECTOR, DEFAULT_SAVE_PORT, DEFAULT_STORAGE_KEY,
};
use crate::error::BridgeError;

/// What to do when the stored text cannot be parsed at startup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MalformedStatePolicy {
    /// Fail startup with `BridgeError::MalformedState`
    #[default]
    Fail,
    /// Log the fault and start as if nothing was stored
    TreatAsAbsent,
}

/// Configuration for a [`StorageBridge`](crate::StorageBridge)
///
/// Field names use camelCase when deserialized so a JS options object can
/// be passed straight through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Name of the storage slot
    pub storage_key: String,
    /// CSS selector of the node the application mounts on
    pub mount_selector: String,
    /// Port the application sends values-to-persist on
    pub save_port: String,
    /// Port the bridge reports stored values on
    pub change_port: String,
    /// Startup parse failure handling
    pub malformed_policy: MalformedStatePolicy,
    /// Log every save, confirmation and cross-tab change
    pub verbose: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            mount_selector: DEFAULT_MOUNT_SELECTOR.to_string(),
            save_port: DEFAULT_SAVE_PORT.to_string(),
            change_port: DEFAULT_CHANGE_PORT.to_string(),
            malformed_policy: MalformedStatePolicy::default(),
            verbose: false,
        }
    }
}

impl BridgeConfig {
    /// Use a different storage slot
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Mount on a different node
    pub fn with_mount_selector(mut self, selector: impl Into<String>) -> Self {
        self.mount_selector = selector.into();
        self
    }

    /// Use different port names
    pub fn with_ports(mut self, save_port: impl Into<String>, change_port: impl Into<String>) -> Self {
        self.save_port = save_port.into();
        self.change_port = change_port.into();
        self
    }

    /// Set the startup parse failure policy
    pub fn with_malformed_policy(mut self, policy: MalformedStatePolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    /// Enable or disable per-event logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check that every name is usable
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.storage_key.is_empty() {
            return Err(BridgeError::InvalidConfig("storage key is empty".to_string()));
        }
        if self.mount_selector.trim().is_empty() {
            return Err(BridgeError::InvalidConfig("mount selector is empty".to_string()));
        }
        if self.save_port.is_empty() || self.change_port.is_empty() {
            return Err(BridgeError::InvalidConfig("port name is empty".to_string()));
        }
        Ok(())
    }
}
