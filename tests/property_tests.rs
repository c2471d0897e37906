/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs: detection bounds,
/// validator totality, merge-order behavior and decision determinism.
use credit_ai_core::aggregator::MultiSourceAggregator;
use credit_ai_core::bureau::BureauIdentifier;
use credit_ai_core::config::AnalysisConfig;
use credit_ai_core::models::{BureauLabel, ExtractedReport};
use credit_ai_core::tariff::TariffDecisionEngine;
use credit_ai_core::validator::FieldValidator;
use proptest::prelude::*;
use serde_json::json;

const LABELS: [BureauLabel; 6] = [
    BureauLabel::Nbki,
    BureauLabel::Okb,
    BureauLabel::ScoringBureau,
    BureauLabel::Equifax,
    BureauLabel::KbKiwi,
    BureauLabel::RussianStandardBki,
];

fn report_with_summary(
    name: &str,
    score: Option<u16>,
    debt: u32,
    active: u8,
    delinquency: u16,
) -> ExtractedReport {
    serde_json::from_value(json!({
        "metadata": {"bki_type": "НБКИ"},
        "subject": {"full_name": name},
        "accounts": [],
        "summary": {
            "credit_score": score,
            "total_debt": debt,
            "active_accounts": active,
            "max_delinquency_days": delinquency
        }
    }))
    .unwrap()
}

// Property: bureau detection is total and its confidence stays in [0, 1]
proptest! {
    #[test]
    fn detect_never_panics_and_confidence_bounded(text in "\\PC*") {
        let detection = BureauIdentifier::new().detect(&text);
        prop_assert!(detection.confidence >= 0.0);
        prop_assert!(detection.confidence <= 1.0);
        if detection.bureau == BureauLabel::Unknown {
            prop_assert_eq!(detection.confidence, 0.0);
        }
    }

    #[test]
    fn pattern_free_text_is_unknown(text in "[0-9 .,;:()-]{0,80}") {
        // No bureau pattern matches digits and punctuation alone
        let detection = BureauIdentifier::new().detect(&text);
        prop_assert_eq!(detection.bureau, BureauLabel::Unknown);
        prop_assert_eq!(detection.confidence, 0.0);
    }
}

// Property: validation never panics and never mutates its verdict logic
proptest! {
    #[test]
    fn validate_never_panics(
        birth_date in "\\PC{0,12}",
        series in "\\PC{0,6}",
        number in "\\PC{0,8}",
        limit in "\\PC{0,10}",
    ) {
        let report: ExtractedReport = serde_json::from_value(json!({
            "metadata": {},
            "subject": {
                "full_name": "Иванов И.И.",
                "birth_date": birth_date,
                "passport": {"series": series, "number": number}
            },
            "accounts": [{"amounts": {"limit": limit, "current_balance": 1000}}]
        })).unwrap();

        let result = FieldValidator::validate(&report);
        prop_assert_eq!(result.is_valid, result.errors.is_empty());
    }

    #[test]
    fn well_formed_dates_always_accepted(
        year in 1950i32..2049,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let date = format!("{:04}-{:02}-{:02}", year, month, day);
        prop_assert!(FieldValidator::validate_date(&date));
    }

    #[test]
    fn close_before_open_always_flagged(
        year in 1990i32..2020,
        month in 1u32..=12,
        day in 1u32..=28,
        gap_years in 1i32..10,
    ) {
        let report: ExtractedReport = serde_json::from_value(json!({
            "metadata": {"bki_type": "НБКИ"},
            "subject": {"full_name": "Иванов И.И."},
            "accounts": [{
                "dates": {
                    "open": format!("{:04}-{:02}-{:02}", year + gap_years, month, day),
                    "close": format!("{:04}-{:02}-{:02}", year, month, day)
                }
            }]
        })).unwrap();

        let result = FieldValidator::validate(&report);
        prop_assert!(!result.is_valid);
        prop_assert!(result.errors.iter().any(|e| e.starts_with("Счёт 0:")));
    }

    #[test]
    fn passport_requires_exact_digit_counts(series in "[0-9]{0,8}", number in "[0-9]{0,10}") {
        let valid = FieldValidator::validate_passport(Some(&series), Some(&number));
        prop_assert_eq!(valid, series.len() == 4 && number.len() == 6);
    }
}

// Property: merge aggregates are stable under input reordering, while the
// display name intentionally is not
proptest! {
    #[test]
    fn merged_sums_invariant_under_reversal(
        entries in prop::collection::vec(
            (prop::option::of(300u16..900), 0u32..3_000_000, 0u8..10, 0u16..400),
            2..6,
        )
    ) {
        let forward: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(i, (score, debt, active, delinquency))| {
                (
                    LABELS[i % LABELS.len()],
                    report_with_summary("Иванов И.И.", *score, *debt, *active, *delinquency),
                )
            })
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = MultiSourceAggregator::merge("client-1", &forward).unwrap();
        let b = MultiSourceAggregator::merge("client-1", &backward).unwrap();

        // Integral inputs keep the f64 sums exact in either order
        prop_assert_eq!(a.summary.total_debt, b.summary.total_debt);
        prop_assert_eq!(a.summary.total_active_accounts, b.summary.total_active_accounts);
        prop_assert_eq!(a.summary.max_delinquency_days, b.summary.max_delinquency_days);
        prop_assert_eq!(a.summary.has_overdue, b.summary.has_overdue);
    }

    #[test]
    fn merged_max_delinquency_never_below_any_input(
        delinquencies in prop::collection::vec(0u16..400, 2..6)
    ) {
        let reports: Vec<_> = delinquencies
            .iter()
            .enumerate()
            .map(|(i, d)| {
                (
                    LABELS[i % LABELS.len()],
                    report_with_summary("Иванов И.И.", Some(700), 0, 0, *d),
                )
            })
            .collect();

        let profile = MultiSourceAggregator::merge("client-1", &reports).unwrap();
        for d in &delinquencies {
            prop_assert!(profile.summary.max_delinquency_days >= u32::from(*d));
        }
    }

    #[test]
    fn merged_avg_score_within_input_range(
        scores in prop::collection::vec(300u16..900, 2..6)
    ) {
        let reports: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                (
                    LABELS[i % LABELS.len()],
                    report_with_summary("Иванов И.И.", Some(*s), 0, 0, 0),
                )
            })
            .collect();

        let profile = MultiSourceAggregator::merge("client-1", &reports).unwrap();
        let min = f64::from(*scores.iter().min().unwrap());
        let max = f64::from(*scores.iter().max().unwrap());
        prop_assert!(profile.summary.avg_credit_score >= min);
        prop_assert!(profile.summary.avg_credit_score <= max);
    }
}

// Property: decisions are a pure function of their input
proptest! {
    #[test]
    fn single_report_decision_deterministic(
        score in prop::option::of(300u16..900),
        debt in 0u32..3_000_000,
        delinquency in 0u16..60,
    ) {
        let report: ExtractedReport = serde_json::from_value(json!({
            "metadata": {"bki_type": "НБКИ"},
            "subject": {"full_name": "Иванов И.И."},
            "accounts": [{"status": {"delinquency_days": delinquency}}],
            "summary": {"credit_score": score, "total_debt": debt}
        })).unwrap();

        let engine = TariffDecisionEngine::new(AnalysisConfig::default());
        let first = engine.decide_report(&report);
        let second = engine.decide_report(&report);
        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn merged_decision_deterministic(
        scores in prop::collection::vec(prop::option::of(300u16..900), 2..5),
        debt in 0u32..2_000_000,
        delinquency in 0u16..60,
    ) {
        let reports: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                (
                    LABELS[i % LABELS.len()],
                    report_with_summary("Иванов И.И.", *s, debt, 1, delinquency),
                )
            })
            .collect();
        let profile = MultiSourceAggregator::merge("client-1", &reports).unwrap();

        let engine = TariffDecisionEngine::new(AnalysisConfig::default());
        let first = engine.decide_merged(&profile);
        let second = engine.decide_merged(&profile);
        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
