//! Shared utilities for the web crate

use storebridge_core::BridgeError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Console.log binding for WASM
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// Turn a bridge error into a thrown JS `Error`
pub fn to_js_error(err: BridgeError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Best-effort description of a thrown JS value
pub fn describe_js_error(value: &JsValue) -> String {
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
