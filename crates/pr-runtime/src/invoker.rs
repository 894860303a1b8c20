use std::sync::Arc;

use pr_compiler::CompiledScript;
use pr_core::{RatingError, ScriptValue};
use rhai::{Dynamic, Engine};
use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::context::ExecutionVariables;
use crate::helpers::rhai_bridge::dynamic_to_script_value;

/// Runs compiled scripts on the sandboxed engine they were compiled with.
///
/// Every run gets its own scope, so nothing a script declares survives the
/// call.
#[derive(Clone)]
pub struct ScriptInvoker {
    engine: Arc<Engine>,
}

impl ScriptInvoker {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    pub fn run(
        &self,
        unit: &CompiledScript,
        variables: ExecutionVariables,
    ) -> Result<ScriptValue, RatingError> {
        let identity = unit.identity();
        let mut scope = variables.into_scope();
        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, unit.ast())
            .map_err(|error| {
                warn!(script = %identity, error = %error, "Script failed at run time");
                RatingError::execution(identity, error.to_string())
            })?;
        dynamic_to_script_value(result).map_err(|message| RatingError::execution(identity, message))
    }

    /// Runs a stage script and reads its result as a number. Only integer,
    /// decimal and finite float results are accepted; text is never parsed.
    pub fn run_decimal(
        &self,
        unit: &CompiledScript,
        variables: ExecutionVariables,
    ) -> Result<Decimal, RatingError> {
        let identity = unit.identity();
        let value = self.run(unit, variables)?;
        let number = value.to_decimal().ok_or_else(|| {
            warn!(script = %identity, kind = value.type_name(), "Script returned a non-numeric value");
            RatingError::execution(
                identity,
                format!("expected a numeric result, got {}", value.type_name()),
            )
        })?;
        trace!(script = %identity, value = %number, "Script returned");
        Ok(number)
    }
}

impl std::fmt::Debug for ScriptInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInvoker").finish_non_exhaustive()
    }
}
