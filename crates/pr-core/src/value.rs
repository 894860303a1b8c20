use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::InsuredItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Array(Vec<ScriptValue>),
    Map(BTreeMap<String, ScriptValue>),
}

impl ScriptValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is never coerced, even when it looks
    /// like a number.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Int(value) => Some(Decimal::from(*value)),
            Self::Decimal(value) => Some(*value),
            Self::Float(value) if value.is_finite() => Decimal::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}

impl From<&InsuredItem> for ScriptValue {
    fn from(item: &InsuredItem) -> Self {
        let mut map = BTreeMap::new();
        map.insert("make".to_string(), ScriptValue::String(item.make.clone()));
        map.insert("model".to_string(), ScriptValue::String(item.model.clone()));
        map.insert(
            "manufactureYear".to_string(),
            ScriptValue::Int(i64::from(item.manufacture_year)),
        );
        map.insert("sumInsured".to_string(), ScriptValue::Decimal(item.sum_insured));
        map.insert(
            "coverage".to_string(),
            ScriptValue::String(item.coverage.name().to_string()),
        );
        map.insert(
            "risks".to_string(),
            ScriptValue::Array(
                item.risks
                    .iter()
                    .map(|risk| ScriptValue::String(risk.name().to_string()))
                    .collect(),
            ),
        );
        ScriptValue::Map(map)
    }
}
