use std::collections::BTreeMap;

use pr_core::ScriptValue;
use rhai::{Array, Dynamic, ImmutableString, Map, FLOAT, INT};
use rust_decimal::Decimal;

pub(crate) fn script_value_to_dynamic(value: &ScriptValue) -> Dynamic {
    match value {
        ScriptValue::Bool(value) => Dynamic::from_bool(*value),
        ScriptValue::Int(value) => Dynamic::from_int(*value as INT),
        ScriptValue::Float(value) => Dynamic::from_float(*value as FLOAT),
        ScriptValue::Decimal(value) => Dynamic::from_decimal(*value),
        ScriptValue::String(value) => Dynamic::from(value.clone()),
        ScriptValue::Array(values) => {
            let array = values.iter().map(script_value_to_dynamic).collect::<Array>();
            Dynamic::from_array(array)
        }
        ScriptValue::Map(values) => {
            let mut map = Map::new();
            for (key, value) in values {
                map.insert(key.as_str().into(), script_value_to_dynamic(value));
            }
            Dynamic::from_map(map)
        }
    }
}

pub(crate) fn dynamic_to_script_value(value: Dynamic) -> Result<ScriptValue, String> {
    if value.is::<bool>() {
        return Ok(ScriptValue::Bool(value.cast::<bool>()));
    }
    if value.is::<INT>() {
        return Ok(ScriptValue::Int(value.cast::<INT>() as i64));
    }
    if value.is::<FLOAT>() {
        return Ok(ScriptValue::Float(value.cast::<FLOAT>() as f64));
    }
    if value.is::<Decimal>() {
        return Ok(ScriptValue::Decimal(value.cast::<Decimal>()));
    }
    if value.is::<ImmutableString>() {
        return Ok(ScriptValue::String(
            value.cast::<ImmutableString>().to_string(),
        ));
    }
    if value.is::<char>() {
        return Ok(ScriptValue::String(value.cast::<char>().to_string()));
    }
    if value.is::<Array>() {
        let array = value.cast::<Array>();
        let mut out = Vec::with_capacity(array.len());
        for item in array {
            out.push(dynamic_to_script_value(item)?);
        }
        return Ok(ScriptValue::Array(out));
    }
    if value.is::<Map>() {
        let map = value.cast::<Map>();
        let mut out = BTreeMap::new();
        for (key, value) in map {
            out.insert(key.to_string(), dynamic_to_script_value(value)?);
        }
        return Ok(ScriptValue::Map(out));
    }

    Err(format!("Unsupported script value type: {}", value.type_name()))
}
