//! Conversions between JS values and bridge values
//!
//! Values cross the boundary as JSON text, so what the application sees is
//! exactly what `JSON.stringify`/`JSON.parse` would produce.

use serde_json::Value;
use storebridge_core::{BridgeConfig, BridgeError, StoreValue};
use wasm_bindgen::prelude::*;

use crate::util::describe_js_error;

/// Convert a value sent by the application into JSON
///
/// `null`, `undefined` and values `JSON.stringify` drops (functions) map to
/// `null`. Cyclic structures fail with `BridgeError::Serialize`.
pub fn js_to_json(value: &JsValue) -> Result<Value, BridgeError> {
    if value.is_null() || value.is_undefined() {
        return Ok(Value::Null);
    }
    let text = js_sys::JSON::stringify(value)
        .map_err(|e| BridgeError::Serialize(describe_js_error(&e)))?;
    match text.as_string() {
        Some(text) => serde_json::from_str(&text).map_err(BridgeError::from),
        None => Ok(Value::Null),
    }
}

/// Convert JSON into a JS value
pub fn json_to_js(value: &Value) -> Result<JsValue, BridgeError> {
    if value.is_null() {
        return Ok(JsValue::NULL);
    }
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(|e| BridgeError::Serialize(describe_js_error(&e)))
}

/// Convert a bridge value into what the application receives
pub fn store_value_to_js(value: &StoreValue) -> Result<JsValue, BridgeError> {
    match value {
        StoreValue::Absent => Ok(JsValue::NULL),
        StoreValue::Raw(text) => Ok(JsValue::from_str(text)),
        StoreValue::Structured(v) => json_to_js(v),
    }
}

/// Read bridge options from a JS object; `undefined`/`null` gives defaults
pub fn config_from_js(options: &JsValue) -> Result<BridgeConfig, BridgeError> {
    let config = match js_to_json(options)? {
        Value::Null => BridgeConfig::default(),
        value => serde_json::from_value(value)
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))?,
    };
    config.validate()?;
    Ok(config)
}
