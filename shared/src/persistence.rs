//! Persistence adapter
//!
//! Serializes a calculator's raw input to a key-value slot and restores it
//! field by field. Storage is an injected port ([`KeyValueStorage`]) so the
//! core runs the same against browser storage, files, or memory.
//!
//! # Record Layout
//!
//! ```json
//! {"weight": 70, "heightCm": 175, "heightFt": "", "heightIn": "",
//!  "unitSystem": "metric", "age": 30, "gender": "male", "activityLevel": "moderate"}
//! ```
//!
//! Absent numerics are stored as `""`. The last three keys exist only for
//! the TDEE calculator.

use crate::errors::StorageError;
use crate::state::{Field, InstanceParams, RawInputState};
use crate::units::UnitSystem;
use crate::validation::{parse_numeric_input, validate_age, validate_finite};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Key of the unit system in the persisted record
pub const UNIT_SYSTEM_KEY: &str = "unitSystem";

// ============================================================================
// Storage Port
// ============================================================================

/// Durable string slots addressed by key
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
///
/// Clones share the same slots, so two calculators (or a test and the
/// calculator under test) can see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw contents of a slot
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    /// Overwrite a slot directly, bypassing the adapter
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert_raw(key, value);
        Ok(())
    }
}

// ============================================================================
// Load / Save
// ============================================================================

/// Restore a calculator's input state.
///
/// Never fails: a missing slot, unreadable storage, or unparsable record
/// yields the defaults, and each field that is missing or invalid falls
/// back to its own default.
pub fn load_state<P, S>(storage: &S, key: &str) -> RawInputState<P>
where
    P: InstanceParams,
    S: KeyValueStorage + ?Sized,
{
    let text = match storage.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!(key, "No saved calculator state, using defaults");
            return RawInputState::default();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read calculator state, using defaults");
            return RawInputState::default();
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(record)) => from_record(&record),
        Ok(other) => {
            warn!(key, kind = value_kind(&other), "Saved calculator state is not an object, using defaults");
            RawInputState::default()
        }
        Err(e) => {
            warn!(key, error = %e, "Saved calculator state is corrupt, using defaults");
            RawInputState::default()
        }
    }
}

/// Persist a calculator's input state. Failures are logged, never returned.
pub fn save_state<P, S>(storage: &mut S, key: &str, state: &RawInputState<P>)
where
    P: InstanceParams,
    S: KeyValueStorage + ?Sized,
{
    let record = Value::Object(to_record(state));
    let result = serde_json::to_string(&record)
        .map_err(StorageError::from)
        .and_then(|text| storage.set(key, &text));

    if let Err(e) = result {
        warn!(key, error = %e, "Failed to save calculator state");
    }
}

/// Build the persisted record for a state
pub fn to_record<P: InstanceParams>(state: &RawInputState<P>) -> Map<String, Value> {
    let mut record = Map::new();
    for field in [Field::Weight, Field::HeightCm, Field::HeightFt, Field::HeightIn] {
        write_number(&mut record, field.key(), state.get(field));
    }
    record.insert(
        UNIT_SYSTEM_KEY.to_string(),
        Value::from(state.unit_system.label_key()),
    );
    state.params.write_record(&mut record);
    record
}

/// Rebuild a state from a persisted record, field by field
pub fn from_record<P: InstanceParams>(record: &Map<String, Value>) -> RawInputState<P> {
    let unit_system: UnitSystem = read_enum(record, UNIT_SYSTEM_KEY);
    let live = |field: Field| field.live_in().map_or(true, |system| system == unit_system);
    let read = |field: Field| {
        if live(field) {
            read_number(record, field.key())
        } else {
            None
        }
    };

    RawInputState {
        weight: read(Field::Weight),
        height_cm: read(Field::HeightCm),
        height_ft: read(Field::HeightFt),
        height_in: read(Field::HeightIn),
        unit_system,
        params: P::read_record(record),
    }
}

// ============================================================================
// Field Helpers
// ============================================================================

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Write an optional number, using `""` for absent
pub fn write_number(record: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    let value = value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(""));
    record.insert(key.to_string(), value);
}

/// Read an optional non-negative number stored as a number or numeric text
pub fn read_number(record: &Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match record.get(key)? {
        Value::Null => return None,
        Value::Number(n) => match n.as_f64() {
            Some(value) => validate_finite(value).map(|_| Some(value)).map_err(|e| e.to_string()),
            None => Err("not representable as f64".to_string()),
        },
        Value::String(text) => parse_numeric_input(text).map_err(|e| e.to_string()),
        other => Err(format!("unexpected {}", value_kind(other))),
    };

    match parsed {
        Ok(value) => value,
        Err(reason) => {
            warn!(key, %reason, "Ignoring invalid saved field");
            None
        }
    }
}

/// Write an optional age, using `""` for absent
pub fn write_age(record: &mut Map<String, Value>, key: &str, age: Option<u32>) {
    let value = age.map(Value::from).unwrap_or_else(|| Value::from(""));
    record.insert(key.to_string(), value);
}

/// Read an optional age in whole years within the accepted range
pub fn read_age(record: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = read_number(record, key)?;
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        warn!(key, value, "Ignoring non-integer saved age");
        return None;
    }
    let age = value as u32;
    match validate_age(age) {
        Ok(()) => Some(age),
        Err(e) => {
            warn!(key, error = %e, "Ignoring out-of-range saved age");
            None
        }
    }
}

/// Read an enum by its serialized name, falling back to its default
pub fn read_enum<T>(record: &Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match record.get(key) {
        None => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(key, error = %e, "Ignoring invalid saved option");
            T::default()
        }),
    }
}
