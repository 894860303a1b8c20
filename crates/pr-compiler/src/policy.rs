use std::collections::BTreeSet;
use std::sync::Arc;

use rhai::module_resolvers::StaticModuleResolver;
use rhai::packages::{
    BasicArrayPackage, BasicMapPackage, BasicMathPackage, CorePackage, LogicPackage,
    MoreStringPackage, Package,
};
use rhai::{Engine, Module};
use tracing::{debug, info};

pub const DEFAULT_MAX_OPERATIONS: u64 = 100_000;
pub const DEFAULT_MAX_CALL_LEVELS: usize = 16;
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 64;
pub const DEFAULT_MAX_STRING_SIZE: usize = 4_096;

/// Library namespaces a rule script may reach, either globally or through
/// `import "<name>" as alias;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SafeModule {
    Math,
    Array,
    Map,
    String,
}

impl SafeModule {
    pub fn name(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Array => "array",
            Self::Map => "map",
            Self::String => "string",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "math" => Some(Self::Math),
            "array" => Some(Self::Array),
            "map" => Some(Self::Map),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    fn package(self) -> Arc<Module> {
        match self {
            Self::Math => BasicMathPackage::new().as_shared_module(),
            Self::Array => BasicArrayPackage::new().as_shared_module(),
            Self::Map => BasicMapPackage::new().as_shared_module(),
            Self::String => MoreStringPackage::new().as_shared_module(),
        }
    }
}

/// Capability set applied to every compiled rule script. Built once and
/// shared by the compiler and the invoker so both see the same engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    pub allowed_modules: BTreeSet<SafeModule>,
    pub disabled_symbols: Vec<String>,
    pub allow_closures: bool,
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            allowed_modules: BTreeSet::from([SafeModule::Math]),
            // `fn` declares named functions; `eval` would compile code at run time.
            disabled_symbols: vec!["fn".to_string(), "eval".to_string()],
            allow_closures: true,
            max_operations: DEFAULT_MAX_OPERATIONS,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
        }
    }
}

impl SandboxPolicy {
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }

    pub fn with_module(mut self, module: SafeModule) -> Self {
        self.allowed_modules.insert(module);
        self
    }

    pub fn allows_import(&self, name: &str) -> bool {
        SafeModule::parse(name)
            .map(|module| self.allowed_modules.contains(&module))
            .unwrap_or(false)
    }

    pub fn build_engine(&self) -> Engine {
        let mut engine = Engine::new_raw();
        engine.register_global_module(CorePackage::new().as_shared_module());
        engine.register_global_module(LogicPackage::new().as_shared_module());

        let mut resolver = StaticModuleResolver::new();
        for module in &self.allowed_modules {
            let package = module.package();
            resolver.insert(module.name(), Module::clone(&package));
            engine.register_global_module(package);
        }
        engine.set_module_resolver(resolver);

        for symbol in &self.disabled_symbols {
            engine.disable_symbol(symbol.as_str());
        }
        engine.set_allow_anonymous_fn(self.allow_closures);
        engine.set_strict_variables(true);

        engine.set_max_operations(self.max_operations);
        engine.set_max_call_levels(self.max_call_levels);
        engine.set_max_expr_depths(self.max_expr_depth, self.max_expr_depth);
        engine.set_max_string_size(self.max_string_size);

        engine.on_print(|text| info!(target: "rule_script", "{}", text));
        engine.on_debug(|text, source, position| {
            debug!(
                target: "rule_script",
                source = source.unwrap_or("<script>"),
                position = %position,
                "{}",
                text
            )
        });

        debug!(
            modules = ?self.allowed_modules,
            max_operations = self.max_operations,
            "Built sandboxed script engine"
        );
        engine
    }
}
