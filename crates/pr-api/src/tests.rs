use std::thread;

use pr_compiler::MemoryBundle;
use pr_core::CoverageTier;
use rust_decimal_macros::dec;

use super::*;

const YEAR: i32 = 2025;

fn engine_with(entries: &[(&str, &str)]) -> RatingEngine {
    RatingEngine::new(RatingEngineOptions {
        bundle: Some(Arc::new(MemoryBundle::from_entries(entries))),
        policy: None,
        current_year: Some(YEAR),
    })
}

fn item(make: &str, manufacture_year: i32, sum_insured: Decimal, risks: &[RiskCategory]) -> InsuredItem {
    InsuredItem {
        make: make.to_string(),
        model: "Gravel SL EVO".to_string(),
        manufacture_year,
        sum_insured,
        coverage: CoverageTier::Extra,
        risks: risks.to_vec(),
    }
}

#[test]
fn single_theft_risk_is_priced_from_both_stages() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", "riskSumInsured * 3 / 100"),
    ]);
    let result = engine
        .calculate_premium(&[item("Pearl", 2020, dec!(1000), &[RiskCategory::Theft])])
        .expect("rating should pass");

    assert_eq!(result.premium.to_string(), "30.00");
    assert_eq!(result.objects.len(), 1);
    let object = &result.objects[0];
    assert_eq!(object.coverage_type, CoverageTier::Extra);
    assert_eq!(object.sum_insured.to_string(), "1000.00");
    assert_eq!(object.premium.to_string(), "30.00");
    assert_eq!(
        object.risks,
        vec![RiskResult {
            risk_type: RiskCategory::Theft,
            sum_insured: dec!(1000.00),
            premium: dec!(30.00),
        }]
    );
    assert_eq!(object.attributes.make, "Pearl");
    assert_eq!(object.attributes.manufacture_year, 2020);
}

#[test]
fn zero_results_produce_zero_premium() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "0"),
        ("sumInsured/DAMAGE", "0"),
        ("premiums/THEFT", "0"),
        ("premiums/DAMAGE", "0"),
    ]);
    let result = engine
        .calculate_premium(&[item(
            "Pearl",
            2020,
            dec!(0),
            &[RiskCategory::Theft, RiskCategory::Damage],
        )])
        .expect("rating should pass");
    assert_eq!(result.premium.to_string(), "0.00");
    assert_eq!(result.objects[0].risks.len(), 2);
    assert!(result.objects[0]
        .risks
        .iter()
        .all(|risk| risk.premium.to_string() == "0.00"));
}

#[test]
fn age_limit_is_inclusive_and_checked_before_scripts() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", "1"),
    ]);
    engine
        .calculate_premium(&[item("Pearl", YEAR - MAX_ITEM_AGE, dec!(100), &[RiskCategory::Theft])])
        .expect("exactly ten years old is accepted");

    let empty = engine_with(&[]);
    let error = empty
        .calculate_premium(&[item(
            "Pearl",
            YEAR - MAX_ITEM_AGE - 1,
            dec!(100),
            &[RiskCategory::Theft],
        )])
        .expect_err("eleven years old is rejected");
    assert_eq!(
        error,
        RatingError::validation("Bicycle must be newer than 10 years")
    );
    assert!(empty.compiler().cache().is_empty());
}

#[test]
fn items_and_grand_total_are_summed_in_order() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("sumInsured/DAMAGE", "sumInsured"),
        ("premiums/THEFT", "24"),
        ("premiums/DAMAGE", r#"if make == "A" { 16 } else { 12 }"#),
    ]);
    let result = engine
        .calculate_premium(&[
            item("A", 2020, dec!(500), &[RiskCategory::Theft, RiskCategory::Damage]),
            item("B", 2021, dec!(300), &[RiskCategory::Damage]),
        ])
        .expect("rating should pass");

    assert_eq!(result.objects[0].premium.to_string(), "40.00");
    assert_eq!(result.objects[1].premium.to_string(), "12.00");
    assert_eq!(result.premium.to_string(), "52.00");
    let order = result.objects[0]
        .risks
        .iter()
        .map(|risk| risk.risk_type)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![RiskCategory::Theft, RiskCategory::Damage]);
}

#[test]
fn totals_accumulate_unrounded_premiums() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("sumInsured/DAMAGE", "sumInsured"),
        ("sumInsured/THIRD_PARTY_DAMAGE", "sumInsured"),
        ("premiums/THEFT", "riskSumInsured / 200000"),
        ("premiums/DAMAGE", "riskSumInsured / 200000"),
        ("premiums/THIRD_PARTY_DAMAGE", "riskSumInsured / 200000"),
    ]);
    let risks = [
        RiskCategory::Theft,
        RiskCategory::Damage,
        RiskCategory::ThirdPartyDamage,
    ];
    let result = engine
        .calculate_premium(&[
            item("A", 2020, dec!(1000), &risks),
            item("B", 2020, dec!(1000), &risks),
        ])
        .expect("rating should pass");

    // Each risk is 0.005: shown as 0.01, but the item sums 0.015 and the
    // request sums 0.030.
    let first = &result.objects[0];
    assert!(first.risks.iter().all(|risk| risk.premium == dec!(0.01)));
    assert_eq!(first.premium.to_string(), "0.02");
    assert_eq!(result.premium.to_string(), "0.03");
}

#[test]
fn non_numeric_result_aborts_the_request() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", r#""thirty""#),
    ]);
    let error = engine
        .calculate_premium(&[item("Pearl", 2020, dec!(1000), &[RiskCategory::Theft])])
        .expect_err("text result should fail");
    assert_eq!(error.code(), "SCRIPT_EXECUTION_ERROR");
    assert!(!error.is_client_error());
}

#[test]
fn unvalidated_extreme_year_is_rejected_by_age_check() {
    let engine = engine_with(&[]);
    let error = engine
        .calculate_premium(&[item("Pearl", i32::MIN, dec!(1000), &[RiskCategory::Theft])])
        .expect_err("item is far too old");
    assert_eq!(error.code(), "VALIDATION_ERROR");
}

const HUGE_PREMIUM: &str = "riskSumInsured * 1000000000000000000 * 10000000";

#[test]
fn item_premium_overflow_is_an_execution_error() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("sumInsured/DAMAGE", "sumInsured"),
        ("premiums/THEFT", HUGE_PREMIUM),
        ("premiums/DAMAGE", HUGE_PREMIUM),
    ]);
    let error = engine
        .calculate_premium(&[item(
            "Pearl",
            2020,
            dec!(5000),
            &[RiskCategory::Theft, RiskCategory::Damage],
        )])
        .expect_err("sum of two in-range premiums overflows");
    assert_eq!(
        error,
        RatingError::execution(
            ScriptIdentity::new(Stage::Premiums, RiskCategory::Damage),
            "item premium overflowed"
        )
    );
}

#[test]
fn grand_total_overflow_is_rejected() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", HUGE_PREMIUM),
    ]);
    let error = engine
        .calculate_premium(&[
            item("A", 2020, dec!(5000), &[RiskCategory::Theft]),
            item("B", 2020, dec!(5000), &[RiskCategory::Theft]),
        ])
        .expect_err("total overflows");
    assert_eq!(error.code(), "VALIDATION_ERROR");
    assert_eq!(error.to_string(), "Total premium is out of range");
}

#[test]
fn first_failure_aborts_remaining_items() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", "1"),
    ]);
    let error = engine
        .calculate_premium(&[
            item("A", 2020, dec!(100), &[RiskCategory::Theft]),
            item("B", 2020, dec!(100), &[RiskCategory::Damage]),
            item("C", 2020, dec!(100), &[RiskCategory::Theft]),
        ])
        .expect_err("missing damage script");
    assert_eq!(
        error,
        RatingError::ScriptNotFound {
            identity: ScriptIdentity::new(Stage::SumInsured, RiskCategory::Damage)
        }
    );
}

#[test]
fn compile_errors_surface_unchanged() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "import \"fs\" as fs; sumInsured"),
        ("premiums/THEFT", "1"),
    ]);
    let error = engine
        .calculate_premium(&[item("Pearl", 2020, dec!(100), &[RiskCategory::Theft])])
        .expect_err("sandbox violation");
    assert_eq!(error.code(), "SCRIPT_COMPILE_ERROR");
}

#[test]
fn bundled_scripts_price_every_risk() {
    let engine = RatingEngine::new(RatingEngineOptions {
        current_year: Some(YEAR),
        ..RatingEngineOptions::default()
    });
    let result = engine
        .calculate_premium(&[item(
            "Pearl",
            2019,
            dec!(1000),
            &[
                RiskCategory::Theft,
                RiskCategory::Damage,
                RiskCategory::ThirdPartyDamage,
            ],
        )])
        .expect("bundled scripts should rate");

    let premiums = result.objects[0]
        .risks
        .iter()
        .map(|risk| (risk.risk_type, risk.sum_insured, risk.premium))
        .collect::<Vec<_>>();
    assert_eq!(
        premiums,
        vec![
            (RiskCategory::Theft, dec!(1000.00), dec!(33.00)),
            (RiskCategory::Damage, dec!(500.00), dec!(30.00)),
            (RiskCategory::ThirdPartyDamage, dec!(200.00), dec!(6.00)),
        ]
    );
    assert_eq!(result.premium.to_string(), "69.00");
}

#[test]
fn wire_request_is_validated_then_rated() {
    let engine = engine_with(&[
        ("sumInsured/THEFT", "sumInsured"),
        ("premiums/THEFT", "riskSumInsured * 3 / 100"),
    ]);
    let request = PremiumRequest::from_json(
        r#"{"bicycles":[{"make":"Pearl","model":"Gravel SL EVO","coverage":"EXTRA",
            "manufactureYear":2015,"sumInsured":1000,"risks":["THEFT"]}]}"#,
    )
    .expect("parse");
    let result = engine.rate_request(request).expect("rating should pass");
    assert_eq!(result.premium.to_string(), "30.00");

    let invalid = PremiumRequest::from_json(r#"{"items":[]}"#).expect("parse");
    let error = engine.rate_request(invalid).expect_err("empty request");
    assert!(error.is_client_error());
}

#[test]
fn one_engine_serves_concurrent_requests() {
    let engine = RatingEngine::new(RatingEngineOptions {
        current_year: Some(YEAR),
        ..RatingEngineOptions::default()
    });
    let items = vec![
        item("A", 2020, dec!(800), &[RiskCategory::Theft, RiskCategory::Damage]),
        item("B", 2022, dec!(1200), &[RiskCategory::ThirdPartyDamage]),
    ];

    let results = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| scope.spawn(|| engine.calculate_premium(&items)))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .expect("worker should not panic")
                    .expect("rating should pass")
            })
            .collect::<Vec<_>>()
    });

    assert!(results.iter().all(|result| result == &results[0]));
    assert_eq!(engine.compiler().cache().len(), 6);
}

#[test]
fn current_year_defaults_to_the_clock() {
    let engine = RatingEngine::default();
    assert!(engine.current_year() >= 2024);
    assert_eq!(engine_with(&[]).current_year(), YEAR);
}
