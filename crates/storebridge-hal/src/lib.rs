//! Hardware Abstraction Layer traits for StoreBridge
//!
//! This crate defines the platform seams the bridge runs on, so the bridge
//! logic can be driven by a real browser or by an in-memory mock.
//!
//! # Platform Implementations
//!
//! - **Browser**: `window.localStorage` for the slot, `setTimeout(.., 0)` for
//!   deferred tasks, `console.log()` for debug output (`storebridge-web`)
//! - **Mock**: `BTreeMap` slot store, manually drained task queue, captured
//!   debug log (`storebridge-hal-mock`)

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// A unit of work posted to the task queue
pub type DeferredTask = Box<dyn FnOnce()>;

/// Narrow key-value interface over the persistent storage area
///
/// All calls are synchronous and run to completion within the current task,
/// matching the browser's Web Storage API.
pub trait SlotStorage {
    /// Read the raw text stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(text))` - Slot is present
    /// * `Ok(None)` - Slot is absent
    /// * `Err(HalError::Unavailable)` - Storage cannot be accessed
    fn get_item(&self, key: &str) -> Result<Option<String>, HalError>;

    /// Write `value` under `key`, overwriting any previous value
    ///
    /// # Returns
    /// * `Ok(())` - Value stored
    /// * `Err(HalError::QuotaExceeded)` - Storage is full
    /// * `Err(HalError::SecurityDenied)` - Storage disabled for this origin
    fn set_item(&self, key: &str, value: &str) -> Result<(), HalError>;

    /// Remove the slot under `key`
    ///
    /// Removing an absent key is a no-op and returns `Ok(())`.
    fn remove_item(&self, key: &str) -> Result<(), HalError>;

    /// Which storage area this instance writes to
    ///
    /// Used to match cross-tab change notifications against this instance.
    fn area(&self) -> StorageArea;
}

/// Event-loop task queue
pub trait TaskQueue {
    /// Post `task` to run as a new task after the current one completes
    ///
    /// The task must never run synchronously inside this call.
    ///
    /// On Browser: `setTimeout(task, 0)`
    fn post(&self, task: DeferredTask) -> Result<(), HalError>;
}

/// Complete platform surface used by the bridge
pub trait BridgeHal: SlotStorage + TaskQueue + 'static {
    /// Write a debug message to the platform's console/log
    ///
    /// On Browser: Uses `console.log()`
    fn debug_write(&self, msg: &str);
}

/// Identity of a Web Storage area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageArea {
    /// `window.localStorage` (persistent, shared across tabs of the origin)
    Local,
    /// `window.sessionStorage` (per tab)
    Session,
    /// Any other area, or one that could not be identified
    Other,
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageArea::Local => write!(f, "localStorage"),
            StorageArea::Session => write!(f, "sessionStorage"),
            StorageArea::Other => write!(f, "other"),
        }
    }
}

/// Storage change notification delivered by the platform
///
/// Browsers fire this in every other page of the origin that shares the
/// storage area, never in the page that performed the write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageChange {
    /// Area the change happened in
    pub area: StorageArea,
    /// Changed key, `None` when the whole area was cleared
    pub key: Option<String>,
    /// Previous raw value
    pub old_value: Option<String>,
    /// New raw value, `None` when the key was removed
    pub new_value: Option<String>,
    /// URL of the page that made the change
    pub url: String,
}

impl StorageChange {
    /// Change of a single key in `area`
    pub fn new(
        area: StorageArea,
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            area,
            key: Some(key.into()),
            old_value,
            new_value,
            url: String::new(),
        }
    }

    /// Whole-area clear (`storage.clear()` in another page)
    pub fn cleared(area: StorageArea) -> Self {
        Self {
            area,
            key: None,
            old_value: None,
            new_value: None,
            url: String::new(),
        }
    }

    /// Set the originating page URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// HAL errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HalError {
    /// Storage capacity exceeded
    QuotaExceeded,
    /// Storage is not available (no window, private mode restrictions)
    Unavailable,
    /// Access to storage was denied by the browser
    SecurityDenied,
    /// The task queue refused the task
    SchedulingFailed,
    /// Platform error that does not map to a known kind
    Other(String),
}

impl HalError {
    /// Create an error from a platform message
    pub fn other(msg: impl Into<String>) -> Self {
        HalError::Other(msg.into())
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::QuotaExceeded => write!(f, "storage quota exceeded"),
            HalError::Unavailable => write!(f, "storage unavailable"),
            HalError::SecurityDenied => write!(f, "storage access denied"),
            HalError::SchedulingFailed => write!(f, "failed to schedule task"),
            HalError::Other(msg) => write!(f, "{}", msg),
        }
    }
}
