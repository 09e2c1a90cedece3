//! Recursive config merge
//!
//! Plain JSON objects merge key-wise; arrays and primitives are replaced
//! wholesale. A `null` (or absent) overlay value never clobbers the base.

use serde_json::Value;

/// Merge `overlay` into `base`, later values winning.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            if !overlay_value.is_null() {
                *base_slot = overlay_value.clone();
            }
        }
    }
}
