use std::sync::Arc;

use chrono::Datelike;
use pr_compiler::{EmbeddedBundle, SandboxPolicy, ScriptBundle, ScriptCompiler};
use pr_core::{
    round_money, InsuredItem, ItemAttributes, ItemResult, RatingError, RatingResult,
    RiskCategory, RiskResult, ScriptIdentity, Stage,
};
use pr_runtime::{build_context, ScriptInvoker};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

mod request;

pub use request::{
    ItemRequest, PremiumRequest, MAX_MANUFACTURE_YEAR, MAX_SUM_INSURED, MIN_MANUFACTURE_YEAR,
};

/// Items older than this many years are not insurable. The boundary itself
/// is accepted.
pub const MAX_ITEM_AGE: i32 = 10;

#[derive(Clone, Default)]
pub struct RatingEngineOptions {
    pub bundle: Option<Arc<dyn ScriptBundle>>,
    pub policy: Option<SandboxPolicy>,
    pub current_year: Option<i32>,
}

/// Prices insured items by running the sum-insured and premium rule scripts
/// for each of their risks.
///
/// One engine is meant to be shared by every worker: the compiled-script
/// cache is the only state it holds, and each call keeps its own totals.
#[derive(Debug)]
pub struct RatingEngine {
    compiler: ScriptCompiler,
    invoker: ScriptInvoker,
    current_year: Option<i32>,
}

impl RatingEngine {
    pub fn new(options: RatingEngineOptions) -> Self {
        let bundle = options
            .bundle
            .unwrap_or_else(|| Arc::new(EmbeddedBundle) as Arc<dyn ScriptBundle>);
        let compiler = ScriptCompiler::new(options.policy.unwrap_or_default(), bundle);
        let invoker = ScriptInvoker::new(compiler.engine());
        Self {
            compiler,
            invoker,
            current_year: options.current_year,
        }
    }

    pub fn compiler(&self) -> &ScriptCompiler {
        &self.compiler
    }

    /// The pinned year when one was configured, the local calendar year
    /// otherwise.
    pub fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Rates every item in order and fails on the first error. No partial
    /// result is ever returned.
    pub fn calculate_premium(&self, items: &[InsuredItem]) -> Result<RatingResult, RatingError> {
        let current_year = self.current_year();
        info!(items = items.len(), current_year, "Starting premium calculation");

        let mut objects = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;
        for item in items {
            let (object, premium) = self.rate_item(item, current_year)?;
            total = total
                .checked_add(premium)
                .ok_or_else(|| RatingError::validation("Total premium is out of range"))?;
            objects.push(object);
        }

        let premium = round_money(total);
        info!(items = objects.len(), premium = %premium, "Finished premium calculation");
        Ok(RatingResult { objects, premium })
    }

    /// Parses and validates a wire request, then rates it.
    pub fn rate_request(&self, request: PremiumRequest) -> Result<RatingResult, RatingError> {
        let items = request.into_items()?;
        self.calculate_premium(&items)
    }

    /// Returns the item result together with the unrounded item premium,
    /// which is what the grand total accumulates.
    #[instrument(level = "debug", skip_all, fields(make = %item.make, model = %item.model))]
    fn rate_item(
        &self,
        item: &InsuredItem,
        current_year: i32,
    ) -> Result<(ItemResult, Decimal), RatingError> {
        let age = item.age(current_year);
        if age > MAX_ITEM_AGE {
            return Err(RatingError::validation(format!(
                "Bicycle must be newer than {} years",
                MAX_ITEM_AGE
            )));
        }

        let mut risks = Vec::with_capacity(item.risks.len());
        let mut premium = Decimal::ZERO;
        for category in &item.risks {
            let risk_sum_insured =
                self.run_stage(item, *category, Stage::SumInsured, current_year, None)?;
            let risk_premium = self.run_stage(
                item,
                *category,
                Stage::Premiums,
                current_year,
                Some(risk_sum_insured),
            )?;
            debug!(
                risk = %category,
                sum_insured = %risk_sum_insured,
                premium = %risk_premium,
                "Rated risk"
            );

            premium = premium.checked_add(risk_premium).ok_or_else(|| {
                RatingError::execution(
                    ScriptIdentity::new(Stage::Premiums, *category),
                    "item premium overflowed",
                )
            })?;
            risks.push(RiskResult {
                risk_type: *category,
                sum_insured: round_money(risk_sum_insured),
                premium: round_money(risk_premium),
            });
        }

        let object = ItemResult {
            coverage_type: item.coverage,
            sum_insured: round_money(item.sum_insured),
            premium: round_money(premium),
            risks,
            attributes: ItemAttributes {
                make: item.make.clone(),
                model: item.model.clone(),
                manufacture_year: item.manufacture_year,
            },
        };
        Ok((object, premium))
    }

    fn run_stage(
        &self,
        item: &InsuredItem,
        category: RiskCategory,
        stage: Stage,
        current_year: i32,
        prior: Option<Decimal>,
    ) -> Result<Decimal, RatingError> {
        let unit = self
            .compiler
            .get_or_compile(ScriptIdentity::new(stage, category))?;
        let variables = build_context(item, category, stage, current_year, prior)?;
        self.invoker.run_decimal(&unit, variables)
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(RatingEngineOptions::default())
    }
}

#[cfg(test)]
mod tests;
