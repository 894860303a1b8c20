use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use pr_core::{RatingError, RiskCategory, ScriptIdentity, Stage};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const SCRIPT_EXTENSION: &str = "rhai";

/// Resolves a script identity to its source text. `Ok(None)` means the
/// bundle has no resource for the identity.
pub trait ScriptBundle: Send + Sync + Debug {
    fn load(&self, identity: ScriptIdentity) -> Result<Option<String>, RatingError>;
    fn describe(&self) -> String;
}

/// Rule scripts shipped with the crate under `scripts/<stage>/<CATEGORY>.rhai`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedBundle;

impl ScriptBundle for EmbeddedBundle {
    fn load(&self, identity: ScriptIdentity) -> Result<Option<String>, RatingError> {
        let source = match (identity.stage, identity.category) {
            (Stage::SumInsured, RiskCategory::Theft) => {
                include_str!("../../../scripts/sumInsured/THEFT.rhai")
            }
            (Stage::SumInsured, RiskCategory::Damage) => {
                include_str!("../../../scripts/sumInsured/DAMAGE.rhai")
            }
            (Stage::SumInsured, RiskCategory::ThirdPartyDamage) => {
                include_str!("../../../scripts/sumInsured/THIRD_PARTY_DAMAGE.rhai")
            }
            (Stage::Premiums, RiskCategory::Theft) => {
                include_str!("../../../scripts/premiums/THEFT.rhai")
            }
            (Stage::Premiums, RiskCategory::Damage) => {
                include_str!("../../../scripts/premiums/DAMAGE.rhai")
            }
            (Stage::Premiums, RiskCategory::ThirdPartyDamage) => {
                include_str!("../../../scripts/premiums/THIRD_PARTY_DAMAGE.rhai")
            }
        };
        Ok(Some(source.to_string()))
    }

    fn describe(&self) -> String {
        "embedded".to_string()
    }
}

/// In-memory scripts keyed by logical name (`premiums/THEFT`).
#[derive(Debug, Default, Clone)]
pub struct MemoryBundle {
    scripts: BTreeMap<String, String>,
}

impl MemoryBundle {
    pub fn new(scripts: BTreeMap<String, String>) -> Self {
        Self { scripts }
    }

    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|(name, source)| ((*name).to_string(), (*source).to_string()))
                .collect(),
        )
    }

    pub fn insert(&mut self, identity: ScriptIdentity, source: impl Into<String>) {
        self.scripts.insert(identity.name(), source.into());
    }
}

impl ScriptBundle for MemoryBundle {
    fn load(&self, identity: ScriptIdentity) -> Result<Option<String>, RatingError> {
        Ok(self.scripts.get(&identity.name()).cloned())
    }

    fn describe(&self) -> String {
        format!("memory({} scripts)", self.scripts.len())
    }
}

/// Scripts read from `<root>/<stage>/<CATEGORY>.rhai` on disk. The directory
/// is indexed once when opened; files are read on each load.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
    index: BTreeMap<String, PathBuf>,
}

impl DirectoryBundle {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RatingError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(RatingError::request(format!(
                "scripts-dir does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(RatingError::request(format!(
                "scripts-dir is not a directory: {}",
                root.display()
            )));
        }

        let known = ScriptIdentity::all()
            .map(|identity| identity.name())
            .collect::<Vec<_>>();
        let mut index = BTreeMap::new();

        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            let name = relative
                .with_extension("")
                .to_string_lossy()
                .replace('\\', "/");
            if known.contains(&name) {
                index.insert(name, path.to_path_buf());
            } else {
                warn!(path = %path.display(), "Ignoring script with no matching identity");
            }
        }

        debug!(root = %root.display(), scripts = index.len(), "Indexed scripts directory");
        Ok(Self { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl ScriptBundle for DirectoryBundle {
    fn load(&self, identity: ScriptIdentity) -> Result<Option<String>, RatingError> {
        let Some(path) = self.index.get(&identity.name()) else {
            return Ok(None);
        };
        fs::read_to_string(path).map(Some).map_err(|error| {
            RatingError::compile(
                identity,
                format!("failed to read {}: {}", path.display(), error),
            )
        })
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}
