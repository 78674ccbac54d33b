//! StoreBridge core
//!
//! Keeps an embedded front-end application in sync with one slot of the
//! browser's persistent key-value storage:
//!
//! - **Startup**: the slot is read and parsed, and handed to the application
//!   as its initial flags ([`load_initial_state`])
//! - **Save**: values the application asks to persist are written (or the
//!   slot removed for `null`) and confirmed back on the next task
//!   ([`StorageBridge::on_save_requested`])
//! - **Cross-tab**: changes other pages make to the slot are forwarded to
//!   the application as raw text ([`StorageBridge::on_external_storage_change`])
//!
//! The crate is platform independent. Storage, the task queue and debug
//! output come from a [`BridgeHal`] implementation: `storebridge-web` in the
//! browser, `storebridge-hal-mock` in tests.

mod bridge;
mod config;
pub mod constants;
mod error;
mod ports;
mod stats;
mod value;

pub use bridge::{load_initial_state, StorageBridge};
pub use config::{BridgeConfig, MalformedStatePolicy};
pub use error::{BridgeError, StorageOp};
pub use ports::{AppPorts, RecordingPorts};
pub use stats::BridgeStats;
pub use value::StoreValue;

// Re-export HAL types that appear in the public API
pub use storebridge_hal::{BridgeHal, HalError, SlotStorage, StorageArea, StorageChange, TaskQueue};
