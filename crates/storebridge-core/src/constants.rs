//! Centralized constants for the bridge
//!
//! Names shared between the Rust side and the embedded application's ports
//! are defined here so they can be audited in one place.

/// Default storage slot name
pub const DEFAULT_STORAGE_KEY: &str = "store";

/// Default CSS selector of the application's mount node
pub const DEFAULT_MOUNT_SELECTOR: &str = "main";

/// Port on which the application asks for a value to be persisted
pub const DEFAULT_SAVE_PORT: &str = "setStorage";

/// Port on which the bridge reports the new stored value
pub const DEFAULT_CHANGE_PORT: &str = "onStoreChange";

/// Prefix for every debug line written by the bridge
pub const LOG_PREFIX: &str = "[storebridge]";
