//! Application port boundary

use std::cell::RefCell;

use crate::value::StoreValue;

/// Outbound notification channel into the embedded application
///
/// On Browser: `app.ports.onStoreChange.send(value)`
pub trait AppPorts {
    /// Report the new stored value (local confirmation or cross-tab change)
    fn send_store_change(&self, value: StoreValue);
}

/// Port adapter that records every notification
///
/// Used by tests and by hosts that poll instead of receiving callbacks.
#[derive(Debug, Default)]
pub struct RecordingPorts {
    sent: RefCell<Vec<StoreValue>>,
}

impl RecordingPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, oldest first
    pub fn sent(&self) -> Vec<StoreValue> {
        self.sent.borrow().clone()
    }

    /// Number of notifications so far
    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }

    /// Most recent notification
    pub fn last(&self) -> Option<StoreValue> {
        self.sent.borrow().last().cloned()
    }

    /// Take and clear the recorded notifications
    pub fn take(&self) -> Vec<StoreValue> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl AppPorts for RecordingPorts {
    fn send_store_change(&self, value: StoreValue) {
        self.sent.borrow_mut().push(value);
    }
}
