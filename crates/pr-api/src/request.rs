use pr_core::{CoverageTier, InsuredItem, RatingError, RiskCategory};
use rust_decimal::Decimal;
use serde::Deserialize;

pub const MIN_MANUFACTURE_YEAR: i32 = 1900;
pub const MAX_MANUFACTURE_YEAR: i32 = 2100;
pub const MAX_SUM_INSURED: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Inbound rating request as it arrives on the wire. Every field is optional
/// here so a missing one is reported by name instead of as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PremiumRequest {
    #[serde(default, alias = "bicycles")]
    pub items: Vec<ItemRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub manufacture_year: Option<i32>,
    pub sum_insured: Option<Decimal>,
    pub coverage: Option<CoverageTier>,
    pub risks: Option<Vec<String>>,
}

impl PremiumRequest {
    pub fn from_json(text: &str) -> Result<Self, RatingError> {
        serde_json::from_str(text)
            .map_err(|error| RatingError::request(format!("invalid request JSON: {}", error)))
    }

    /// Checks every item and converts the request into domain items, in
    /// request order. Stops at the first violation.
    pub fn into_items(self) -> Result<Vec<InsuredItem>, RatingError> {
        if self.items.is_empty() {
            return Err(RatingError::validation("Items list cannot be empty"));
        }
        self.items.into_iter().map(ItemRequest::into_item).collect()
    }
}

impl ItemRequest {
    pub fn into_item(self) -> Result<InsuredItem, RatingError> {
        let make = non_blank(self.make, "Make is mandatory")?;
        let model = non_blank(self.model, "Model is mandatory")?;

        let manufacture_year = self
            .manufacture_year
            .ok_or_else(|| RatingError::validation("Manufacture year is mandatory"))?;
        if manufacture_year < MIN_MANUFACTURE_YEAR {
            return Err(RatingError::validation(
                "Manufacture year cannot be before 1900",
            ));
        }
        if manufacture_year > MAX_MANUFACTURE_YEAR {
            return Err(RatingError::validation(
                "Manufacture year cannot be after 2100",
            ));
        }

        let sum_insured = self
            .sum_insured
            .ok_or_else(|| RatingError::validation("Sum insured is mandatory"))?;
        if sum_insured <= Decimal::ZERO {
            return Err(RatingError::validation("Sum insured must be positive"));
        }
        if sum_insured > MAX_SUM_INSURED {
            return Err(RatingError::validation(
                "Sum insured must be less than 10,000",
            ));
        }

        let coverage = self
            .coverage
            .ok_or_else(|| RatingError::validation("Coverage is mandatory"))?;

        let risk_names = self.risks.unwrap_or_default();
        if risk_names.is_empty() {
            return Err(RatingError::validation("Risks cannot be empty"));
        }
        let mut risks = Vec::with_capacity(risk_names.len());
        for name in &risk_names {
            if name.trim().is_empty() {
                return Err(RatingError::validation("Risk type cannot be blank"));
            }
            risks.push(RiskCategory::parse(name)?);
        }

        Ok(InsuredItem {
            make,
            model,
            manufacture_year,
            sum_insured,
            coverage,
            risks,
        })
    }
}

fn non_blank(value: Option<String>, message: &str) -> Result<String, RatingError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RatingError::validation(message)),
    }
}
