//! Opaque value passed between storage and the application

use serde_json::Value;

/// Value carried on the "storage changed" channel and used as startup flags
///
/// The bridge never looks inside it. Startup reads and local save
/// confirmations carry parsed data; cross-tab notifications carry the raw
/// text exactly as the browser reported it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StoreValue {
    /// No stored value (slot absent or cleared)
    #[default]
    Absent,
    /// Parsed JSON data
    Structured(Value),
    /// Unparsed text from a cross-tab notification
    Raw(String),
}

impl StoreValue {
    /// Value the application receives: `null`, the data, or the text as a JSON string
    pub fn to_json(&self) -> Value {
        match self {
            StoreValue::Absent => Value::Null,
            StoreValue::Structured(v) => v.clone(),
            StoreValue::Raw(s) => Value::String(s.clone()),
        }
    }

    /// Whether the application will see `null`
    pub fn is_null(&self) -> bool {
        matches!(self, StoreValue::Absent | StoreValue::Structured(Value::Null))
    }

    /// Wrap a raw notification value (`None` means the key was removed)
    pub fn from_raw(raw: Option<String>) -> Self {
        match raw {
            Some(text) => StoreValue::Raw(text),
            None => StoreValue::Absent,
        }
    }

    /// Wrap an application value (`null` means clear)
    pub fn from_json(value: Value) -> Self {
        if value.is_null() {
            StoreValue::Absent
        } else {
            StoreValue::Structured(value)
        }
    }
}

impl From<Value> for StoreValue {
    fn from(value: Value) -> Self {
        StoreValue::from_json(value)
    }
}
