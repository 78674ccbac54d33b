//! Browser tests for the web boundary
//!
//! Run with `wasm-pack test --headless --firefox crates/storebridge-web`.

#![cfg(target_arch = "wasm32")]

use serde_json::json;
use storebridge_core::{BridgeHal, SlotStorage, StorageArea, StoreValue, TaskQueue};
use storebridge_web::{boot, config_from_js, js_to_json, json_to_js, store_value_to_js, WebHal};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

fn local_storage() -> web_sys::Storage {
    window().local_storage().unwrap().unwrap()
}

/// Resolve after every zero-delay timer queued so far has run
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

/// Minimal stand-in for a compiled Elm module with the two ports
fn fake_program() -> JsValue {
    js_sys::Function::new_no_args(
        r#"
        const sent = [];
        let subs = [];
        return {
          sent,
          init(opts) {
            this.flags = opts.flags;
            this.node = opts.node;
            return {
              ports: {
                setStorage: {
                  subscribe(f) { subs.push(f); },
                  unsubscribe(f) { subs = subs.filter(g => g !== f); },
                },
                onStoreChange: { send(v) { sent.push(v); } },
              },
              emit(v) { subs.forEach(f => f(v)); },
              subscriberCount() { return subs.length; },
            };
          },
        };
        "#,
    )
    .call0(&JsValue::NULL)
    .unwrap()
}

fn ensure_mount(selector_id: &str) {
    let document = window().document().unwrap();
    if document.get_element_by_id(selector_id).is_none() {
        let main = document.create_element("main").unwrap();
        main.set_id(selector_id);
        document.body().unwrap().append_child(&main).unwrap();
    }
}

fn get(target: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(target, &name.into()).unwrap()
}

fn call0(target: &JsValue, name: &str) -> JsValue {
    get(target, name)
        .dyn_into::<js_sys::Function>()
        .unwrap()
        .call0(target)
        .unwrap()
}

fn options(key: &str, mount_id: &str) -> JsValue {
    json_to_js(&json!({ "storageKey": key, "mountSelector": format!("#{}", mount_id) })).unwrap()
}

// =============================================================================
// Conversions
// =============================================================================

#[wasm_bindgen_test]
fn test_js_to_json() {
    let obj = js_sys::JSON::parse(r#"{"a":1,"b":[true,null]}"#).unwrap();
    assert_eq!(js_to_json(&obj).unwrap(), json!({"a": 1, "b": [true, null]}));
    assert_eq!(js_to_json(&JsValue::NULL).unwrap(), serde_json::Value::Null);
    assert_eq!(js_to_json(&JsValue::UNDEFINED).unwrap(), serde_json::Value::Null);
}

#[wasm_bindgen_test]
fn test_store_value_to_js() {
    assert!(store_value_to_js(&StoreValue::Absent).unwrap().is_null());
    assert_eq!(
        store_value_to_js(&StoreValue::Raw("{\"a\":2}".to_string()))
            .unwrap()
            .as_string(),
        Some("{\"a\":2}".to_string())
    );
    let structured = store_value_to_js(&StoreValue::Structured(json!({"a": 1}))).unwrap();
    assert_eq!(get(&structured, "a").as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn test_config_from_js() {
    let config = config_from_js(&JsValue::UNDEFINED).unwrap();
    assert_eq!(config.storage_key, "store");

    let bad = json_to_js(&json!({ "storageKey": "" })).unwrap();
    assert!(config_from_js(&bad).is_err());
}

// =============================================================================
// HAL
// =============================================================================

#[wasm_bindgen_test]
fn test_web_hal_storage() {
    let hal = WebHal::local(&window()).unwrap();
    let key = "storebridge-test-hal";

    hal.remove_item(key).unwrap();
    assert_eq!(hal.get_item(key).unwrap(), None);
    hal.set_item(key, "{\"x\":1}").unwrap();
    assert_eq!(hal.get_item(key).unwrap(), Some("{\"x\":1}".to_string()));
    hal.remove_item(key).unwrap();
    hal.remove_item(key).unwrap();
    assert_eq!(hal.area(), StorageArea::Local);
    hal.debug_write("[storebridge] test log line");
}

#[wasm_bindgen_test]
fn test_area_identity() {
    let hal = WebHal::local(&window()).unwrap();
    let local = window().local_storage().unwrap();
    let session = window().session_storage().unwrap();

    assert_eq!(hal.area_of(local.as_ref()), StorageArea::Local);
    assert_eq!(hal.area_of(session.as_ref()), StorageArea::Session);
    assert_eq!(hal.area_of(None), StorageArea::Other);

    let session_hal = WebHal::session(&window()).unwrap();
    assert_eq!(session_hal.area(), StorageArea::Session);
    assert_eq!(session_hal.area_of(session.as_ref()), StorageArea::Session);
    assert_eq!(session_hal.area_of(local.as_ref()), StorageArea::Local);
}

#[wasm_bindgen_test]
async fn test_post_runs_on_later_task() {
    let hal = WebHal::local(&window()).unwrap();
    let ran = std::rc::Rc::new(std::cell::Cell::new(false));

    let flag = ran.clone();
    hal.post(Box::new(move || flag.set(true))).unwrap();
    assert!(!ran.get());

    next_tick().await;
    assert!(ran.get());
}

// =============================================================================
// Boot
// =============================================================================

#[wasm_bindgen_test]
async fn test_boot_save_and_confirm() {
    let key = "storebridge-test-boot";
    let mount = "storebridge-mount-boot";
    ensure_mount(mount);
    local_storage().set_item(key, "{\"count\":3}").unwrap();

    let program = fake_program();
    let bridge = boot(&program, options(key, mount)).unwrap();

    let flags = get(&program, "flags");
    assert_eq!(get(&flags, "count").as_f64(), Some(3.0));
    assert_eq!(get(&bridge.initial_state(), "count").as_f64(), Some(3.0));

    let app = bridge.app();
    let emit = get(&app, "emit").dyn_into::<js_sys::Function>().unwrap();
    emit.call1(&app, &js_sys::JSON::parse("{\"count\":4}").unwrap())
        .unwrap();

    assert_eq!(
        local_storage().get_item(key).unwrap(),
        Some("{\"count\":4}".to_string())
    );
    let sent = get(&program, "sent").dyn_into::<js_sys::Array>().unwrap();
    assert_eq!(sent.length(), 0);

    next_tick().await;
    assert_eq!(sent.length(), 1);
    assert_eq!(get(&sent.get(0), "count").as_f64(), Some(4.0));

    emit.call1(&app, &JsValue::NULL).unwrap();
    assert_eq!(local_storage().get_item(key).unwrap(), None);
    next_tick().await;
    assert_eq!(sent.length(), 2);
    assert!(sent.get(1).is_null());
}

#[wasm_bindgen_test]
fn test_boot_malformed_state_throws() {
    let key = "storebridge-test-malformed";
    let mount = "storebridge-mount-malformed";
    ensure_mount(mount);
    local_storage().set_item(key, "{oops").unwrap();

    assert!(boot(&fake_program(), options(key, mount)).is_err());
    local_storage().remove_item(key).unwrap();
}

#[wasm_bindgen_test]
fn test_boot_missing_port_throws() {
    let mount = "storebridge-mount-ports";
    ensure_mount(mount);
    let opts = json_to_js(&json!({
        "storageKey": "storebridge-test-ports",
        "mountSelector": format!("#{}", mount),
        "changePort": "doesNotExist",
    }))
    .unwrap();

    assert!(boot(&fake_program(), opts).is_err());
}

#[wasm_bindgen_test]
fn test_detach_unsubscribes() {
    let key = "storebridge-test-detach";
    let mount = "storebridge-mount-detach";
    ensure_mount(mount);

    let mut bridge = boot(&fake_program(), options(key, mount)).unwrap();
    let app = bridge.app();
    assert_eq!(call0(&app, "subscriberCount").as_f64(), Some(1.0));

    bridge.detach();
    bridge.detach();
    assert!(!bridge.attached());
    assert_eq!(call0(&app, "subscriberCount").as_f64(), Some(0.0));
}
