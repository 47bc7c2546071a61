use checkup_analysis::{
    aggregate_verdicts, analyze, analyze_records_str, build_trend_series, classify_value,
    map_risk, parse_reference_range,
};
use checkup_core::{
    AnalysisConfig, AnalysisError, MeasurementSample, ReferenceRange, RiskTier, ScoreBand, Verdict,
};
use chrono::{DateTime, Utc};

fn sample(label: &str, value: &str, spec: &str) -> MeasurementSample {
    MeasurementSample::new(label, value, spec)
}

fn ts(text: &str) -> DateTime<Utc> {
    text.parse().expect("timestamp literal is valid")
}

#[test]
fn normal_and_abnormal_counts_cover_the_total() {
    let verdicts = [
        Verdict::Normal,
        Verdict::Abnormal,
        Verdict::Unknown,
        Verdict::Normal,
    ];
    let aggregate = aggregate_verdicts(&verdicts);

    assert_eq!(aggregate.total, 4);
    assert_eq!(aggregate.normal + aggregate.abnormal, aggregate.total);
    assert_eq!(aggregate.normal, 3);
    assert_eq!(aggregate.abnormal, 1);
}

#[test]
fn threshold_boundaries_assign_the_higher_band() {
    let config = AnalysisConfig::default();

    let at_excellent = map_risk(0.90, &config);
    assert_eq!(at_excellent.band, ScoreBand::Excellent);
    assert_eq!(at_excellent.tier, RiskTier::Low);

    let at_good = map_risk(0.80, &config);
    assert_eq!(at_good.band, ScoreBand::Good);
    assert_eq!(at_good.tier, RiskTier::Low);

    let at_fair = map_risk(0.70, &config);
    assert_eq!(at_fair.band, ScoreBand::Fair);
    assert_eq!(at_fair.tier, RiskTier::Moderate);

    let below = map_risk(0.69, &config);
    assert_eq!(below.band, ScoreBand::NeedsImprovement);
    assert_eq!(below.tier, RiskTier::High);
}

#[test]
fn empty_input_yields_a_no_data_report() {
    let report = analyze(&[], &AnalysisConfig::default());

    assert_eq!(report.aggregate.total, 0);
    assert_eq!(report.aggregate.normalcy_rate, 0.0);
    assert!(report.risk.is_none());
    assert_eq!(report.narrative, "No examination data available.");
    assert!(report.recommendations.is_empty());
}

#[test]
fn numeric_range_classification() {
    let range = parse_reference_range("3.5-5.0");
    assert_eq!(range, ReferenceRange::Numeric { min: 3.5, max: 5.0 });

    assert_eq!(classify_value("4.2", &range), Verdict::Normal);
    assert_eq!(classify_value("6.0", &range), Verdict::Abnormal);
    assert_eq!(classify_value("abc", &range), Verdict::Unknown);
    assert_eq!(classify_value("3.5", &range), Verdict::Normal);
    assert_eq!(classify_value("5.0", &range), Verdict::Normal);
}

#[test]
fn missing_or_placeholder_specs_never_flag_values() {
    assert_eq!(parse_reference_range(""), ReferenceRange::Unbounded);
    assert_eq!(parse_reference_range("  "), ReferenceRange::Unbounded);
    assert_eq!(parse_reference_range("未知"), ReferenceRange::Unbounded);
    assert_eq!(parse_reference_range("Unknown"), ReferenceRange::Unbounded);
    assert_eq!(parse_reference_range("positive"), ReferenceRange::Unparseable);

    assert_eq!(
        classify_value("7.5", &ReferenceRange::Unbounded),
        Verdict::Unknown
    );
    assert_eq!(
        classify_value("7.5", &ReferenceRange::Unparseable),
        Verdict::Unknown
    );

    let aggregate = aggregate_verdicts(&[Verdict::Unknown, Verdict::Unknown]);
    assert_eq!(aggregate.normal, 2);
    assert_eq!(aggregate.normalcy_rate, 1.0);
}

#[test]
fn classification_is_deterministic() {
    for _ in 0..3 {
        let range = parse_reference_range("3.5-5.0");
        assert_eq!(classify_value("4.2", &range), Verdict::Normal);
    }
}

#[test]
fn inverted_ranges_flag_everything() {
    let range = parse_reference_range("5.0-3.5");
    assert_eq!(range, ReferenceRange::Numeric { min: 5.0, max: 3.5 });
    assert_eq!(classify_value("4.0", &range), Verdict::Abnormal);
}

#[test]
fn nine_of_ten_normal_scores_excellent_with_monitor_advice() {
    let mut samples: Vec<MeasurementSample> = (0..9)
        .map(|i| sample(&format!("item-{i}"), "5.0", "1-10"))
        .collect();
    samples.push(sample("item-9", "20", "1-10"));

    let report = analyze(&samples, &AnalysisConfig::default());

    assert_eq!(report.aggregate.normalcy_rate, 0.9);
    let risk = report
        .risk
        .expect("report with data carries a risk assessment");
    assert_eq!(risk.band, ScoreBand::Excellent);
    assert_eq!(risk.tier, RiskTier::Low);
    // recommendation tier is count-based, independent of the score band
    assert!(report
        .recommendations
        .contains("a few items need attention"));
}

#[test]
fn recommendation_tiers_follow_the_abnormal_count() {
    let config = AnalysisConfig::default();

    let all_normal = analyze(&[sample("a", "5.0", "1-10")], &config);
    assert!(all_normal.recommendations.contains("Congratulations"));

    let samples: Vec<MeasurementSample> = (0..3)
        .map(|i| sample(&format!("item-{i}"), "20", "1-10"))
        .collect();
    let three_abnormal = analyze(&samples, &config);
    assert!(three_abnormal
        .recommendations
        .contains("seek medical care promptly"));
}

#[test]
fn summary_percentages_sum_to_exactly_one_hundred() {
    let samples = vec![
        sample("a", "5.0", "1-10"),
        sample("b", "5.0", "1-10"),
        sample("c", "20", "1-10"),
    ];

    let report = analyze(&samples, &AnalysisConfig::default());

    assert!(report.narrative.contains("Normal items: 2 (66.7%)"));
    assert!(report.narrative.contains("Abnormal items: 1 (33.3%)"));
}

#[test]
fn trend_series_group_by_item_and_sort_by_date() {
    let mut glucose_old = sample("Fasting glucose", "5.1 mmol/L", "3.9-6.1");
    glucose_old.recorded_at = Some(ts("2023-03-01T08:00:00Z"));
    glucose_old.unit = Some("mmol/L".to_string());
    let mut glucose_new = sample("Fasting glucose", "6.8", "3.9-6.1");
    glucose_new.recorded_at = Some(ts("2024-03-01T08:00:00Z"));
    let mut hemoglobin = sample("Hemoglobin", "14.2", "12-16");
    hemoglobin.recorded_at = Some(ts("2023-06-01T08:00:00Z"));

    let series = build_trend_series(&[glucose_new, hemoglobin, glucose_old]);

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].item_label, "Fasting glucose");
    assert_eq!(series[0].unit.as_deref(), Some("mmol/L"));
    assert_eq!(series[0].points.len(), 2);
    assert_eq!(series[0].points[0].value, Some(5.1));
    assert_eq!(series[0].points[1].value, Some(6.8));
    assert_eq!(series[1].item_label, "Hemoglobin");
}

#[test]
fn record_documents_without_results_are_rejected() {
    let err = analyze_records_str(r#"{"appointmentId": 7}"#, &AnalysisConfig::default())
        .expect_err("document without results must be rejected");
    assert!(matches!(err, AnalysisError::MissingData));

    let err = analyze_records_str("not json", &AnalysisConfig::default())
        .expect_err("malformed JSON must be rejected");
    assert!(matches!(err, AnalysisError::Parse(_)));
}

#[test]
fn records_missing_names_fall_back_to_item_ids() {
    let doc = r#"{"results": [
        {"itemId": 12, "measuredValue": "4.2", "referenceVal": "3.5-5.0"},
        {"measuredValue": "1.0", "referenceVal": ""}
    ]}"#;

    let report = analyze_records_str(doc, &AnalysisConfig::default()).expect("valid document");

    assert_eq!(report.lines()[0].item_label, "item-12");
    assert_eq!(report.lines()[0].verdict, Verdict::Normal);
    assert_eq!(report.lines()[1].item_label, "item-unknown");
    assert_eq!(report.lines()[1].verdict, Verdict::Unknown);
}
