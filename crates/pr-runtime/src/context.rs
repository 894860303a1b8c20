use std::collections::BTreeMap;

use pr_core::{InsuredItem, RatingError, RiskCategory, ScriptIdentity, ScriptValue, Stage};
use rhai::Scope;
use rust_decimal::Decimal;

use crate::helpers::rhai_bridge::script_value_to_dynamic;

/// Read-only bindings for one script run. Built fresh for every invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionVariables {
    values: BTreeMap<String, ScriptValue>,
}

impl ExecutionVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ScriptValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ScriptValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_scope(self) -> Scope<'static> {
        let mut scope = Scope::new();
        for (name, value) in self.values {
            scope.push_constant_dynamic(name, script_value_to_dynamic(&value));
        }
        scope
    }
}

/// Bindings for one stage of one risk on one item.
///
/// The premium stage additionally sees `riskSumInsured`, the value the
/// sum-insured stage produced for the same risk.
pub fn build_context(
    item: &InsuredItem,
    category: RiskCategory,
    stage: Stage,
    current_year: i32,
    risk_sum_insured: Option<Decimal>,
) -> Result<ExecutionVariables, RatingError> {
    let mut variables = ExecutionVariables::new();
    variables.insert("item", ScriptValue::from(item));
    variables.insert("riskType", ScriptValue::String(category.name().to_string()));
    variables.insert("itemAge", ScriptValue::Int(i64::from(item.age(current_year))));
    variables.insert("sumInsured", ScriptValue::Decimal(item.sum_insured));
    variables.insert("make", ScriptValue::String(item.make.clone()));
    variables.insert("model", ScriptValue::String(item.model.clone()));
    variables.insert(
        "coverage",
        ScriptValue::String(item.coverage.name().to_string()),
    );
    variables.insert("riskCount", ScriptValue::Int(item.risks.len() as i64));

    if stage == Stage::Premiums {
        let value = risk_sum_insured.ok_or_else(|| {
            RatingError::execution(
                ScriptIdentity::new(stage, category),
                "premium stage requires the risk sum insured",
            )
        })?;
        variables.insert("riskSumInsured", ScriptValue::Decimal(value));
    }

    Ok(variables)
}
