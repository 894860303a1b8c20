mod context;
mod helpers {
    pub(crate) mod rhai_bridge;
}
mod invoker;

pub use context::{build_context, ExecutionVariables};
pub use invoker::ScriptInvoker;
