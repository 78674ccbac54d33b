//! Elm port adapter
//!
//! An initialized Elm program exposes `app.ports.<name>` objects:
//! outgoing ports (Elm to JS) have `subscribe(fn)` / `unsubscribe(fn)`,
//! incoming ports (JS to Elm) have `send(value)`.

use storebridge_core::constants::LOG_PREFIX;
use storebridge_core::{AppPorts, BridgeConfig, BridgeError, StoreValue};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::convert::store_value_to_js;
use crate::util::{describe_js_error, log};

/// Look up `app.ports[name]`
fn port(app: &JsValue, name: &str) -> Result<JsValue, BridgeError> {
    let ports = js_sys::Reflect::get(app, &"ports".into())
        .ok()
        .filter(|p| p.is_object())
        .ok_or_else(|| BridgeError::Port("application exposes no ports".to_string()))?;
    js_sys::Reflect::get(&ports, &name.into())
        .ok()
        .filter(|p| p.is_object())
        .ok_or_else(|| BridgeError::Port(format!("port '{}' not found", name)))
}

/// Look up a method on a port object
fn method(port: &JsValue, port_name: &str, method: &str) -> Result<js_sys::Function, BridgeError> {
    js_sys::Reflect::get(port, &method.into())
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| {
            BridgeError::Port(format!("port '{}' has no {}()", port_name, method))
        })
}

/// Both ports the bridge talks to
pub struct ElmPorts {
    change_port: JsValue,
    change_port_name: String,
    send: js_sys::Function,
    save_port: JsValue,
    subscribe: js_sys::Function,
    unsubscribe: Option<js_sys::Function>,
}

impl ElmPorts {
    /// Resolve the configured ports on an initialized application
    pub fn from_app(app: &JsValue, config: &BridgeConfig) -> Result<Self, BridgeError> {
        let change_port = port(app, &config.change_port)?;
        let send = method(&change_port, &config.change_port, "send")?;
        let save_port = port(app, &config.save_port)?;
        let subscribe = method(&save_port, &config.save_port, "subscribe")?;
        let unsubscribe = method(&save_port, &config.save_port, "unsubscribe").ok();

        Ok(Self {
            change_port,
            change_port_name: config.change_port.clone(),
            send,
            save_port,
            subscribe,
            unsubscribe,
        })
    }

    /// Register `callback` on the save port
    pub fn subscribe(&self, callback: &js_sys::Function) -> Result<(), BridgeError> {
        self.subscribe
            .call1(&self.save_port, callback)
            .map(|_| ())
            .map_err(|e| BridgeError::Port(describe_js_error(&e)))
    }

    /// Remove `callback` from the save port, if the port supports it
    pub fn unsubscribe(&self, callback: &js_sys::Function) {
        if let Some(unsubscribe) = &self.unsubscribe {
            if let Err(e) = unsubscribe.call1(&self.save_port, callback) {
                log(&format!(
                    "{} unsubscribe failed: {}",
                    LOG_PREFIX,
                    describe_js_error(&e)
                ));
            }
        }
    }
}

impl AppPorts for ElmPorts {
    fn send_store_change(&self, value: StoreValue) {
        let result = store_value_to_js(&value)
            .map_err(|e| e.to_string())
            .and_then(|js| {
                self.send
                    .call1(&self.change_port, &js)
                    .map_err(|e| describe_js_error(&e))
            });

        if let Err(msg) = result {
            log(&format!(
                "{} ERROR: {}.send failed: {}",
                LOG_PREFIX, self.change_port_name, msg
            ));
        }
    }
}
