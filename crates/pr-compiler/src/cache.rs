use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use pr_core::{RatingError, ScriptIdentity};

use crate::CompiledScript;

pub type CompileOutcome = Result<Arc<CompiledScript>, RatingError>;

/// Compile-once store keyed by script identity.
///
/// The map shard is locked only long enough to fetch or insert the per-key
/// cell. Compilation runs inside `OnceLock::get_or_init`, so concurrent first
/// use of one identity coalesces onto a single compilation while other
/// identities proceed independently. Outcomes, failures included, stay cached
/// for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct ScriptCache {
    entries: DashMap<ScriptIdentity, Arc<OnceLock<CompileOutcome>>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile<F>(&self, identity: ScriptIdentity, compile: F) -> CompileOutcome
    where
        F: FnOnce() -> CompileOutcome,
    {
        let cell = Arc::clone(self.entries.entry(identity).or_default().value());
        cell.get_or_init(compile).clone()
    }

    pub fn get(&self, identity: ScriptIdentity) -> Option<CompileOutcome> {
        self.entries
            .get(&identity)
            .and_then(|cell| cell.value().get().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
