//! StorageBridge - relays state between one storage slot and the application
//!
//! ## Flow
//!
//! ```text
//!  startup:      storage[key] ──parse──▶ flags ──▶ application init
//!  save(V):      application ──▶ storage[key] = V ──(next task)──▶ onStoreChange(V)
//!  other tab:    storage event(key, newValue) ──▶ onStoreChange(raw newValue)
//! ```
//!
//! A save in one page produces exactly one notification in that page (the
//! deferred confirmation) and one in every other open page (the browser's
//! storage event). The browser never fires storage events in the writer,
//! so the two paths cannot double up.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use storebridge_hal::{BridgeHal, HalError, StorageChange};

use crate::config::{BridgeConfig, MalformedStatePolicy};
use crate::constants::LOG_PREFIX;
use crate::error::{BridgeError, StorageOp};
use crate::ports::AppPorts;
use crate::stats::BridgeStats;
use crate::value::StoreValue;

/// Read and parse the persisted state for application startup
///
/// # Returns
/// * `Ok(StoreValue::Absent)` - Nothing stored, or the slot holds empty text
/// * `Ok(StoreValue::Structured(v))` - Stored text parsed as `v`
/// * `Err(BridgeError::MalformedState)` - Text is not JSON and the policy is `Fail`
/// * `Err(BridgeError::Storage)` - Storage could not be read
pub fn load_initial_state<H: BridgeHal>(
    hal: &H,
    config: &BridgeConfig,
) -> Result<StoreValue, BridgeError> {
    let key = config.storage_key.as_str();
    let raw = hal
        .get_item(key)
        .map_err(|e| BridgeError::storage(StorageOp::Read, key, e))?;

    // An empty slot counts as nothing stored
    let Some(text) = raw.filter(|text| !text.is_empty()) else {
        hal.debug_write(&format!("{} No stored state under '{}'", LOG_PREFIX, key));
        return Ok(StoreValue::Absent);
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => {
            hal.debug_write(&format!(
                "{} Loaded stored state from '{}' ({} bytes)",
                LOG_PREFIX,
                key,
                text.len()
            ));
            Ok(StoreValue::Structured(value))
        }
        Err(e) => match config.malformed_policy {
            MalformedStatePolicy::Fail => {
                hal.debug_write(&format!(
                    "{} ERROR: Stored state under '{}' is malformed: {}",
                    LOG_PREFIX, key, e
                ));
                Err(BridgeError::MalformedState {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
            MalformedStatePolicy::TreatAsAbsent => {
                hal.debug_write(&format!(
                    "{} WARNING: Ignoring malformed state under '{}': {}",
                    LOG_PREFIX, key, e
                ));
                Ok(StoreValue::Absent)
            }
        },
    }
}

/// Bridge between one storage slot and the application's ports
pub struct StorageBridge<H: BridgeHal, P: AppPorts + 'static> {
    hal: H,
    config: BridgeConfig,
    ports: Rc<P>,
    stats: Rc<RefCell<BridgeStats>>,
}

impl<H: BridgeHal, P: AppPorts + 'static> StorageBridge<H, P> {
    /// Create a bridge over `hal` reporting to `ports`
    ///
    /// The startup read is separate ([`load_initial_state`]) because the
    /// application, and therefore its ports, only exist after it has been
    /// initialized with that state.
    pub fn new(hal: H, config: BridgeConfig, ports: Rc<P>) -> Result<Self, BridgeError> {
        config.validate()?;
        hal.debug_write(&format!(
            "{} Bridge attached to {} key '{}'",
            LOG_PREFIX,
            hal.area(),
            config.storage_key
        ));
        Ok(Self {
            hal,
            config,
            ports,
            stats: Rc::new(RefCell::new(BridgeStats::default())),
        })
    }

    /// Re-read the persisted state with this bridge's configuration
    pub fn load_initial_state(&self) -> Result<StoreValue, BridgeError> {
        load_initial_state(&self.hal, &self.config)
    }

    /// Persist a value the application asked to store
    ///
    /// `null` removes the slot; anything else is written as JSON text. After
    /// storage is updated a confirmation carrying the same value is posted
    /// to the task queue, so it is observed only after the caller returns.
    ///
    /// Storage failures are returned as-is and no confirmation is posted.
    pub fn on_save_requested(&self, value: Value) -> Result<(), BridgeError> {
        let key = self.config.storage_key.as_str();

        let stored = if value.is_null() {
            if let Err(e) = self.hal.remove_item(key) {
                return Err(self.write_failed(StorageOp::Remove, e));
            }
            self.stats.borrow_mut().clears += 1;
            self.trace(&format!("Cleared '{}'", key));
            StoreValue::Absent
        } else {
            let text = serde_json::to_string(&value)?;
            if let Err(e) = self.hal.set_item(key, &text) {
                return Err(self.write_failed(StorageOp::Write, e));
            }
            self.stats.borrow_mut().saves += 1;
            self.trace(&format!("Stored '{}' ({} bytes)", key, text.len()));
            StoreValue::Structured(value)
        };

        self.schedule_confirmation(stored)
    }

    /// Forward a storage change made by another page
    ///
    /// Only changes to this bridge's key in this bridge's storage area are
    /// forwarded, as the raw text the browser reported. Returns whether the
    /// change was forwarded.
    pub fn on_external_storage_change(&self, change: &StorageChange) -> bool {
        let key = self.config.storage_key.as_str();
        let relevant = change.area == self.hal.area() && change.key.as_deref() == Some(key);

        if !relevant {
            self.stats.borrow_mut().external_ignored += 1;
            return false;
        }

        self.stats.borrow_mut().external_forwarded += 1;
        self.trace(&format!(
            "External change to '{}' from {}",
            key,
            if change.url.is_empty() { "unknown page" } else { change.url.as_str() }
        ));
        self.ports
            .send_store_change(StoreValue::from_raw(change.new_value.clone()));
        true
    }

    /// Current raw text in the slot
    pub fn stored_raw(&self) -> Result<Option<String>, BridgeError> {
        let key = self.config.storage_key.as_str();
        self.hal
            .get_item(key)
            .map_err(|e| BridgeError::storage(StorageOp::Read, key, e))
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> BridgeStats {
        *self.stats.borrow()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn ports(&self) -> &Rc<P> {
        &self.ports
    }

    fn schedule_confirmation(&self, value: StoreValue) -> Result<(), BridgeError> {
        let ports = Rc::clone(&self.ports);
        let stats = Rc::clone(&self.stats);

        self.hal
            .post(Box::new(move || {
                stats.borrow_mut().confirmations_delivered += 1;
                ports.send_store_change(value);
            }))
            .map_err(|e| {
                self.hal.debug_write(&format!(
                    "{} ERROR: Failed to schedule confirmation: {}",
                    LOG_PREFIX, e
                ));
                BridgeError::Schedule(e)
            })?;

        self.stats.borrow_mut().confirmations_scheduled += 1;
        Ok(())
    }

    fn write_failed(&self, op: StorageOp, error: HalError) -> BridgeError {
        self.stats.borrow_mut().write_failures += 1;
        let err = BridgeError::storage(op, &self.config.storage_key, error);
        self.hal
            .debug_write(&format!("{} ERROR: {}", LOG_PREFIX, err));
        err
    }

    fn trace(&self, msg: &str) {
        if self.config.verbose {
            self.hal.debug_write(&format!("{} {}", LOG_PREFIX, msg));
        }
    }
}
