use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RatingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskCategory {
    Theft,
    Damage,
    ThirdPartyDamage,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [
        RiskCategory::Theft,
        RiskCategory::Damage,
        RiskCategory::ThirdPartyDamage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Theft => "THEFT",
            Self::Damage => "DAMAGE",
            Self::ThirdPartyDamage => "THIRD_PARTY_DAMAGE",
        }
    }

    pub fn parse(name: &str) -> Result<Self, RatingError> {
        category_lookup()
            .get(name)
            .copied()
            .ok_or_else(|| RatingError::validation(format!("Invalid risk type provided: {}", name)))
    }
}

fn category_lookup() -> &'static HashMap<&'static str, RiskCategory> {
    static LOOKUP: OnceLock<HashMap<&'static str, RiskCategory>> = OnceLock::new();
    LOOKUP.get_or_init(|| {
        RiskCategory::ALL
            .iter()
            .map(|category| (category.name(), *category))
            .collect()
    })
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for RiskCategory {
    type Error = RatingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RiskCategory> for String {
    fn from(value: RiskCategory) -> Self {
        value.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageTier {
    Standard,
    Extra,
}

impl CoverageTier {
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Extra => "EXTRA",
        }
    }
}

/// Ordered script roles per risk category. The premium stage consumes the
/// value produced by the sum-insured stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    SumInsured,
    Premiums,
}

pub const SUM_INSURED_STAGE_VARIABLES: &[&str] = &[
    "item",
    "riskType",
    "itemAge",
    "sumInsured",
    "make",
    "model",
    "coverage",
    "riskCount",
];

pub const PREMIUM_STAGE_VARIABLES: &[&str] = &[
    "item",
    "riskType",
    "itemAge",
    "sumInsured",
    "make",
    "model",
    "coverage",
    "riskCount",
    "riskSumInsured",
];

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::SumInsured, Stage::Premiums];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::SumInsured => "sumInsured",
            Self::Premiums => "premiums",
        }
    }

    pub fn variable_names(self) -> &'static [&'static str] {
        match self {
            Self::SumInsured => SUM_INSURED_STAGE_VARIABLES,
            Self::Premiums => PREMIUM_STAGE_VARIABLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptIdentity {
    pub stage: Stage,
    pub category: RiskCategory,
}

impl ScriptIdentity {
    pub fn new(stage: Stage, category: RiskCategory) -> Self {
        Self { stage, category }
    }

    pub fn all() -> impl Iterator<Item = ScriptIdentity> {
        Stage::ALL.into_iter().flat_map(|stage| {
            RiskCategory::ALL
                .into_iter()
                .map(move |category| ScriptIdentity::new(stage, category))
        })
    }

    /// Logical name, e.g. `premiums/THEFT`.
    pub fn name(&self) -> String {
        format!("{}/{}", self.stage.prefix(), self.category.name())
    }
}

impl fmt::Display for ScriptIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stage.prefix(), self.category.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredItem {
    pub make: String,
    pub model: String,
    pub manufacture_year: i32,
    pub sum_insured: Decimal,
    pub coverage: CoverageTier,
    pub risks: Vec<RiskCategory>,
}

impl InsuredItem {
    /// Saturates instead of overflowing for years no request can carry.
    pub fn age(&self, current_year: i32) -> i32 {
        current_year.saturating_sub(self.manufacture_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub risk_type: RiskCategory,
    pub sum_insured: Decimal,
    pub premium: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    pub make: String,
    pub model: String,
    pub manufacture_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub coverage_type: CoverageTier,
    pub sum_insured: Decimal,
    pub premium: Decimal,
    pub risks: Vec<RiskResult>,
    pub attributes: ItemAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingResult {
    pub objects: Vec<ItemResult>,
    pub premium: Decimal,
}
