//! Browser HAL implementation
//!
//! - Slot storage: `window.localStorage` (or `sessionStorage`)
//! - Task queue: `setTimeout(task, 0)`
//! - Debug output: `console.log()`

use storebridge_core::constants::LOG_PREFIX;
use storebridge_core::{BridgeHal, HalError, SlotStorage, StorageArea, TaskQueue};
use storebridge_hal::DeferredTask;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Storage, Window};

use crate::util::{describe_js_error, log};

/// Browser HAL over one Web Storage area
pub struct WebHal {
    window: Window,
    storage: Storage,
    area: StorageArea,
}

impl WebHal {
    /// HAL over `window.localStorage`
    pub fn local(window: &Window) -> Result<Self, HalError> {
        let storage = window
            .local_storage()
            .map_err(map_storage_error)?
            .ok_or(HalError::Unavailable)?;
        Ok(Self {
            window: window.clone(),
            storage,
            area: StorageArea::Local,
        })
    }

    /// HAL over `window.sessionStorage`
    pub fn session(window: &Window) -> Result<Self, HalError> {
        let storage = window
            .session_storage()
            .map_err(map_storage_error)?
            .ok_or(HalError::Unavailable)?;
        Ok(Self {
            window: window.clone(),
            storage,
            area: StorageArea::Session,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Identify the area a `storage` event refers to
    ///
    /// Areas are compared by object identity, as `event.storageArea ===
    /// localStorage` would.
    pub fn area_of(&self, event_area: Option<&Storage>) -> StorageArea {
        let Some(event_area) = event_area else {
            return StorageArea::Other;
        };
        let is_same = |candidate: Result<Option<Storage>, JsValue>| {
            candidate
                .ok()
                .flatten()
                .map(|s| js_sys::Object::is(event_area.as_ref(), s.as_ref()))
                .unwrap_or(false)
        };

        if is_same(self.window.local_storage()) {
            StorageArea::Local
        } else if is_same(self.window.session_storage()) {
            StorageArea::Session
        } else {
            StorageArea::Other
        }
    }
}

/// Map a thrown storage exception to a HAL error by its DOMException name
pub(crate) fn map_storage_error(err: JsValue) -> HalError {
    let name = err
        .dyn_ref::<web_sys::DomException>()
        .map(|e| e.name())
        .unwrap_or_default();

    match name.as_str() {
        "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => HalError::QuotaExceeded,
        "SecurityError" => HalError::SecurityDenied,
        "InvalidStateError" => HalError::Unavailable,
        _ => HalError::other(describe_js_error(&err)),
    }
}

impl SlotStorage for WebHal {
    fn get_item(&self, key: &str) -> Result<Option<String>, HalError> {
        self.storage.get_item(key).map_err(map_storage_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HalError> {
        self.storage.set_item(key, value).map_err(map_storage_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), HalError> {
        self.storage.remove_item(key).map_err(map_storage_error)
    }

    fn area(&self) -> StorageArea {
        self.area
    }
}

impl TaskQueue for WebHal {
    fn post(&self, task: DeferredTask) -> Result<(), HalError> {
        let callback = Closure::once_into_js(move || task());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
            .map(|_| ())
            .map_err(|e| {
                log(&format!(
                    "{} setTimeout failed: {}",
                    LOG_PREFIX,
                    describe_js_error(&e)
                ));
                HalError::SchedulingFailed
            })
    }
}

impl BridgeHal for WebHal {
    fn debug_write(&self, msg: &str) {
        log(msg);
    }
}
