//! Browser entry point for StoreBridge
//!
//! Boots an Elm program with the state persisted in `localStorage` and keeps
//! the two in sync for the lifetime of the page.
//!
//! ## Module Structure
//!
//! - `hal` - `localStorage` / `setTimeout` / `console.log` HAL
//! - `ports` - Elm port lookup, subscription and `send`
//! - `convert` - JS value <-> JSON conversions
//! - `util` - console binding and error helpers
//!
//! ## Usage
//!
//! ```js
//! import init, { boot } from './pkg/storebridge_web.js';
//! await init();
//! const bridge = boot(Elm.Main, { storageKey: 'store' });
//! ```

mod convert;
mod hal;
mod ports;
mod util;

use std::rc::Rc;

use storebridge_core::constants::LOG_PREFIX;
use storebridge_core::{
    load_initial_state, BridgeConfig, BridgeError, StorageBridge, StorageChange, StorageOp,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

pub use convert::{config_from_js, js_to_json, json_to_js, store_value_to_js};
pub use hal::WebHal;
pub use ports::ElmPorts;

use crate::util::{log, to_js_error};

type Bridge = StorageBridge<WebHal, ElmPorts>;

/// Handle to a running bridge
///
/// Keeps the `storage` listener and the save-port callback alive. Dropping
/// it (or calling `free()` from JS) detaches both.
#[wasm_bindgen(js_name = StoreBridge)]
pub struct WebBridge {
    bridge: Rc<Bridge>,
    app: JsValue,
    initial_state: JsValue,
    save_callback: Closure<dyn FnMut(JsValue) -> Result<(), JsValue>>,
    storage_listener: Closure<dyn FnMut(StorageEvent)>,
    attached: bool,
}

/// Start the application with persisted state and attach the bridge
///
/// # Arguments
/// * `program` - Compiled Elm module object, e.g. `Elm.Main`
/// * `options` - Optional object overriding `BridgeConfig` fields (camelCase)
///
/// # Errors
/// Throws if the options are invalid, storage is unreachable, the stored
/// state is malformed (under the default policy), the mount node is missing,
/// or the program lacks the configured ports.
#[wasm_bindgen]
pub fn boot(program: &JsValue, options: JsValue) -> Result<WebBridge, JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let config = config_from_js(&options).map_err(to_js_error)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let hal = WebHal::local(&window).map_err(|e| {
        to_js_error(BridgeError::storage(StorageOp::Read, &config.storage_key, e))
    })?;

    let flags = load_initial_state(&hal, &config).map_err(to_js_error)?;
    let initial_state = store_value_to_js(&flags).map_err(to_js_error)?;

    let app = init_program(program, &window, &config, &initial_state)?;
    let ports = Rc::new(ElmPorts::from_app(&app, &config).map_err(to_js_error)?);
    let bridge = Rc::new(StorageBridge::new(hal, config, ports).map_err(to_js_error)?);

    let save_callback = {
        let bridge = Rc::clone(&bridge);
        Closure::wrap(Box::new(move |value: JsValue| -> Result<(), JsValue> {
            let value = js_to_json(&value).map_err(to_js_error)?;
            bridge.on_save_requested(value).map_err(to_js_error)
        }) as Box<dyn FnMut(JsValue) -> Result<(), JsValue>>)
    };

    let storage_listener = {
        let bridge = Rc::clone(&bridge);
        Closure::wrap(Box::new(move |event: StorageEvent| {
            let change = StorageChange {
                area: bridge.hal().area_of(event.storage_area().as_ref()),
                key: event.key(),
                old_value: event.old_value(),
                new_value: event.new_value(),
                url: event.url().unwrap_or_default(),
            };
            bridge.on_external_storage_change(&change);
        }) as Box<dyn FnMut(StorageEvent)>)
    };

    bridge
        .ports()
        .subscribe(save_callback.as_ref().unchecked_ref())
        .map_err(to_js_error)?;
    if let Err(e) = window
        .add_event_listener_with_callback("storage", storage_listener.as_ref().unchecked_ref())
    {
        bridge
            .ports()
            .unsubscribe(save_callback.as_ref().unchecked_ref());
        return Err(e);
    }

    log(&format!(
        "{} Booted with key '{}' on '{}'",
        LOG_PREFIX,
        bridge.config().storage_key,
        bridge.config().mount_selector
    ));

    Ok(WebBridge {
        bridge,
        app,
        initial_state,
        save_callback,
        storage_listener,
        attached: true,
    })
}

/// Call `program.init({ node, flags })`
fn init_program(
    program: &JsValue,
    window: &web_sys::Window,
    config: &BridgeConfig,
    flags: &JsValue,
) -> Result<JsValue, JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let node = document
        .query_selector(&config.mount_selector)?
        .ok_or_else(|| {
            to_js_error(BridgeError::InvalidConfig(format!(
                "no element matches '{}'",
                config.mount_selector
            )))
        })?;

    let init = js_sys::Reflect::get(program, &"init".into())?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| to_js_error(BridgeError::Port("program has no init()".to_string())))?;

    let init_args = js_sys::Object::new();
    js_sys::Reflect::set(&init_args, &"node".into(), &node)?;
    js_sys::Reflect::set(&init_args, &"flags".into(), flags)?;

    init.call1(program, &init_args)
}

#[wasm_bindgen(js_class = StoreBridge)]
impl WebBridge {
    /// The running application (`program.init` result)
    #[wasm_bindgen(getter)]
    pub fn app(&self) -> JsValue {
        self.app.clone()
    }

    /// Flags the application was started with
    #[wasm_bindgen(getter = initialState)]
    pub fn initial_state(&self) -> JsValue {
        self.initial_state.clone()
    }

    /// Whether the listeners are still registered
    #[wasm_bindgen(getter)]
    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Persist a value as if the application had sent it on its save port
    pub fn save(&self, value: JsValue) -> Result<(), JsValue> {
        let value = js_to_json(&value).map_err(to_js_error)?;
        self.bridge.on_save_requested(value).map_err(to_js_error)
    }

    /// Current raw text in the storage slot
    #[wasm_bindgen(js_name = storedRaw)]
    pub fn stored_raw(&self) -> Result<Option<String>, JsValue> {
        self.bridge.stored_raw().map_err(to_js_error)
    }

    /// Activity counters as a plain object
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        let stats = serde_json::to_value(self.bridge.stats())
            .map_err(|e| to_js_error(BridgeError::from(e)))?;
        json_to_js(&stats).map_err(to_js_error)
    }

    /// Unregister the `storage` listener and the save-port callback
    ///
    /// Calling it again is a no-op.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;

        self.bridge
            .ports()
            .unsubscribe(self.save_callback.as_ref().unchecked_ref());
        if let Err(e) = self.bridge.hal().window().remove_event_listener_with_callback(
            "storage",
            self.storage_listener.as_ref().unchecked_ref(),
        ) {
            log(&format!(
                "{} Failed to remove storage listener: {:?}",
                LOG_PREFIX, e
            ));
        }
        log(&format!("{} Detached", LOG_PREFIX));
    }
}

impl Drop for WebBridge {
    fn drop(&mut self) {
        self.detach();
    }
}
