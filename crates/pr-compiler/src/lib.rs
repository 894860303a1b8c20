use std::sync::Arc;

use pr_core::{RatingError, ScriptIdentity};
use rhai::{Dynamic, Engine, Scope, AST};
use tracing::{debug, instrument, warn};

mod bundle;
mod cache;
mod policy;
mod sanitize;

pub use bundle::{DirectoryBundle, EmbeddedBundle, MemoryBundle, ScriptBundle, SCRIPT_EXTENSION};
pub use cache::{CompileOutcome, ScriptCache};
pub use policy::{
    SafeModule, SandboxPolicy, DEFAULT_MAX_CALL_LEVELS, DEFAULT_MAX_EXPR_DEPTH,
    DEFAULT_MAX_OPERATIONS, DEFAULT_MAX_STRING_SIZE,
};

use sanitize::{scan_imports, strip_package_header, ImportRef};

/// Executable form of one rule script. Immutable once built.
#[derive(Debug)]
pub struct CompiledScript {
    identity: ScriptIdentity,
    ast: AST,
}

impl CompiledScript {
    pub fn identity(&self) -> ScriptIdentity {
        self.identity
    }

    pub fn ast(&self) -> &AST {
        &self.ast
    }
}

pub struct ScriptCompiler {
    engine: Arc<Engine>,
    policy: SandboxPolicy,
    bundle: Arc<dyn ScriptBundle>,
    cache: ScriptCache,
}

impl ScriptCompiler {
    pub fn new(policy: SandboxPolicy, bundle: Arc<dyn ScriptBundle>) -> Self {
        Self {
            engine: Arc::new(policy.build_engine()),
            policy,
            bundle,
            cache: ScriptCache::new(),
        }
    }

    /// The sandboxed engine scripts are compiled with. Invocations must run on
    /// the same engine so the policy limits apply at run time too.
    pub fn engine(&self) -> Arc<Engine> {
        Arc::clone(&self.engine)
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn bundle(&self) -> &dyn ScriptBundle {
        self.bundle.as_ref()
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn get_or_compile(
        &self,
        identity: ScriptIdentity,
    ) -> Result<Arc<CompiledScript>, RatingError> {
        self.cache
            .get_or_compile(identity, || self.compile(identity).map(Arc::new))
    }

    /// Compiles every known identity through the cache and returns how many
    /// scripts are ready. Stops at the first failure.
    pub fn warm_up(&self) -> Result<usize, RatingError> {
        let mut compiled = 0usize;
        for identity in ScriptIdentity::all() {
            self.get_or_compile(identity)?;
            compiled += 1;
        }
        Ok(compiled)
    }

    /// Loads and compiles without consulting the cache.
    #[instrument(skip(self), fields(bundle = %self.bundle.describe()))]
    pub fn compile(&self, identity: ScriptIdentity) -> Result<CompiledScript, RatingError> {
        let source = self
            .bundle
            .load(identity)?
            .ok_or(RatingError::ScriptNotFound { identity })?;
        let ast = compile_source(&self.engine, &self.policy, identity, &source).map_err(
            |error| {
                warn!(script = %identity, error = %error, "Script failed to compile");
                error
            },
        )?;
        debug!(script = %identity, "Compiled script");
        Ok(CompiledScript { identity, ast })
    }
}

impl std::fmt::Debug for ScriptCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptCompiler")
            .field("policy", &self.policy)
            .field("bundle", &self.bundle)
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Prepares and compiles one script under the sandbox policy.
///
/// Imports must name a whitelisted module with a string literal; anything
/// else is rejected before the parser runs. The stage's execution variables
/// are declared up front so strict-variable checking accepts them and rejects
/// any other free variable.
pub fn compile_source(
    engine: &Engine,
    policy: &SandboxPolicy,
    identity: ScriptIdentity,
    source: &str,
) -> Result<AST, RatingError> {
    let prepared = strip_package_header(source);

    for import in scan_imports(&prepared) {
        match import {
            ImportRef::Literal(name) if policy.allows_import(&name) => {}
            ImportRef::Literal(name) => {
                return Err(RatingError::compile(
                    identity,
                    format!("Import \"{}\" is not whitelisted.", name),
                ))
            }
            ImportRef::Dynamic => {
                return Err(RatingError::compile(
                    identity,
                    "Import path must be a string literal.",
                ))
            }
        }
    }

    let mut scope = Scope::new();
    for name in identity.stage.variable_names() {
        scope.push_dynamic(*name, Dynamic::UNIT);
    }

    engine
        .compile_into_self_contained(&scope, &prepared)
        .map_err(|error| RatingError::compile(identity, error.to_string()))
}
