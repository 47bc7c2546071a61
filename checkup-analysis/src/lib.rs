//! Examination-record JSON to `AnalysisReport` interpretation engine.

use std::collections::HashMap;

use checkup_core::{
    AnalysisAggregate, AnalysisConfig, AnalysisError, AnalysisReport, MeasurementSample,
    ReferenceRange, ReportLine, RiskAssessment, RiskTier, ScoreBand, TrendPoint, TrendSeries,
    Verdict,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const NO_DATA_NARRATIVE: &str = "No examination data available.";

/// Generate an analysis report from an examination-record JSON string.
pub fn analyze_records_str(
    records_json: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let value: Value =
        serde_json::from_str(records_json).map_err(|err| AnalysisError::Parse(err.to_string()))?;
    analyze_records_value(&value, config)
}

/// Generate an analysis report from a `serde_json::Value` record document.
pub fn analyze_records_value(
    doc: &Value,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let samples = samples_from_records(doc)?;
    Ok(analyze(&samples, config))
}

/// Extract measurement samples from a record document.
///
/// Individual record fields degrade to placeholder labels and empty values,
/// but a document without a `results` array is rejected outright.
pub fn samples_from_records(doc: &Value) -> Result<Vec<MeasurementSample>, AnalysisError> {
    let results = doc
        .get("results")
        .and_then(Value::as_array)
        .ok_or(AnalysisError::MissingData)?;

    Ok(results.iter().map(sample_from_record).collect())
}

/// Run the interpretation pipeline over in-memory samples.
///
/// Infallible: malformed references and non-numeric values degrade to
/// `Verdict::Unknown` rather than aborting the report.
pub fn analyze(samples: &[MeasurementSample], config: &AnalysisConfig) -> AnalysisReport {
    let lines: Vec<ReportLine> = samples
        .iter()
        .map(|sample| {
            let range = parse_reference_range(&sample.reference_spec);
            ReportLine {
                item_label: sample.item_label.clone(),
                measured_value: sample.measured_value.clone(),
                reference_spec: sample.reference_spec.clone(),
                verdict: classify_value(&sample.measured_value, &range),
            }
        })
        .collect();

    let verdicts: Vec<Verdict> = lines.iter().map(|line| line.verdict).collect();
    let aggregate = aggregate_verdicts(&verdicts);
    let risk = (aggregate.total > 0).then(|| map_risk(aggregate.normalcy_rate, config));
    let narrative = render_narrative(samples, &verdicts, &aggregate);
    let recommendations = render_recommendations(&aggregate, config);

    AnalysisReport::new(lines, aggregate, risk, narrative, recommendations)
}

/// Parse a reference specification into a typed range.
///
/// Empty and placeholder specs yield `Unbounded`; a single `-` between two
/// floats yields an inclusive range kept in source order; everything else
/// is `Unparseable`.
pub fn parse_reference_range(spec: &str) -> ReferenceRange {
    let trimmed = spec.trim();
    if trimmed.is_empty() || is_unknown_placeholder(trimmed) {
        return ReferenceRange::Unbounded;
    }

    if let Some((low, high)) = trimmed.split_once('-') {
        if let (Ok(min), Ok(max)) = (low.trim().parse::<f64>(), high.trim().parse::<f64>()) {
            return ReferenceRange::Numeric { min, max };
        }
    }

    ReferenceRange::Unparseable
}

/// Classify one measured value against a parsed range.
pub fn classify_value(value: &str, range: &ReferenceRange) -> Verdict {
    match range {
        ReferenceRange::Unbounded | ReferenceRange::Unparseable => Verdict::Unknown,
        ReferenceRange::Numeric { min, max } => match value.trim().parse::<f64>() {
            Ok(v) if v >= *min && v <= *max => Verdict::Normal,
            Ok(_) => Verdict::Abnormal,
            Err(_) => Verdict::Unknown,
        },
    }
}

/// Reduce verdicts into counts and a normalcy rate.
///
/// `Unknown` counts toward the normal bucket; an empty input yields a
/// zeroed aggregate instead of dividing.
pub fn aggregate_verdicts(verdicts: &[Verdict]) -> AnalysisAggregate {
    let total = verdicts.len();
    if total == 0 {
        return AnalysisAggregate {
            total: 0,
            normal: 0,
            abnormal: 0,
            normalcy_rate: 0.0,
        };
    }

    let abnormal = verdicts
        .iter()
        .filter(|verdict| **verdict == Verdict::Abnormal)
        .count();
    let normal = total - abnormal;

    AnalysisAggregate {
        total,
        normal,
        abnormal,
        normalcy_rate: normal as f64 / total as f64,
    }
}

/// Map a normalcy rate onto the score-band and risk-tier tables.
///
/// Evaluated top-down, first match wins; boundaries are inclusive on the
/// upper side of each tier.
pub fn map_risk(rate: f64, config: &AnalysisConfig) -> RiskAssessment {
    if rate >= config.excellent_rate {
        RiskAssessment {
            band: ScoreBand::Excellent,
            tier: RiskTier::Low,
        }
    } else if rate >= config.good_rate {
        RiskAssessment {
            band: ScoreBand::Good,
            tier: RiskTier::Low,
        }
    } else if rate >= config.fair_rate {
        RiskAssessment {
            band: ScoreBand::Fair,
            tier: RiskTier::Moderate,
        }
    } else {
        RiskAssessment {
            band: ScoreBand::NeedsImprovement,
            tier: RiskTier::High,
        }
    }
}

/// Render the per-item report body and overall assessment.
pub fn render_narrative(
    samples: &[MeasurementSample],
    verdicts: &[Verdict],
    aggregate: &AnalysisAggregate,
) -> String {
    if aggregate.total == 0 {
        return NO_DATA_NARRATIVE.to_string();
    }

    let mut out = String::new();
    out.push_str("=== Examination Result Analysis ===\n\n");
    out.push_str(&format!(
        "This examination covered {} items:\n\n",
        aggregate.total
    ));

    for (sample, verdict) in samples.iter().zip(verdicts.iter()) {
        let value = match &sample.unit {
            Some(unit) => format!("{} {unit}", sample.measured_value),
            None => sample.measured_value.clone(),
        };
        let reference = match sample.reference_spec.trim() {
            "" => "unknown",
            spec => spec,
        };

        out.push_str(&format!(
            "• {}: {value} (reference: {reference})\n",
            sample.item_label
        ));
        match verdict {
            Verdict::Abnormal => out.push_str("  ⚠ needs attention\n\n"),
            Verdict::Normal | Verdict::Unknown => out.push_str("  ✓ within normal range\n\n"),
        }
    }

    // Abnormal% is derived from the rounded normal% so the pair always sums
    // to exactly 100.0.
    let normal_pct = round1(aggregate.normalcy_rate * 100.0);
    let abnormal_pct = 100.0 - normal_pct;

    out.push_str("=== Overall Assessment ===\n");
    out.push_str(&format!(
        "Normal items: {} ({normal_pct:.1}%)\n",
        aggregate.normal
    ));
    out.push_str(&format!(
        "Abnormal items: {} ({abnormal_pct:.1}%)\n",
        aggregate.abnormal
    ));

    out
}

/// Select the recommendation template for the report's abnormal count.
pub fn render_recommendations(aggregate: &AnalysisAggregate, config: &AnalysisConfig) -> String {
    if aggregate.total == 0 {
        return String::new();
    }

    let mut out = String::new();
    out.push_str("=== Health Recommendations ===\n\n");

    if aggregate.abnormal == 0 {
        out.push_str("Congratulations! Every examination result is within its normal range.\n\n");
        out.push_str("Recommendations:\n");
        out.push_str("• Keep up your current healthy lifestyle\n");
        out.push_str("• Schedule a routine examination at least once a year\n");
        out.push_str("• Maintain a balanced diet and regular exercise\n");
    } else if aggregate.abnormal <= config.monitor_abnormal_max {
        out.push_str("Most results are normal, but a few items need attention.\n\n");
        out.push_str("Recommendations:\n");
        out.push_str("• Discuss the flagged items with your doctor and agree on an improvement plan\n");
        out.push_str("• Adjust daily habits with a focus on the flagged indicators\n");
        out.push_str("• Re-examine the affected items in 3-6 months\n");
    } else {
        out.push_str("Several results are outside their normal ranges; please seek medical care promptly.\n\n");
        out.push_str("Recommendations:\n");
        out.push_str("• Consult a specialist soon for further examination\n");
        out.push_str("• Follow the prescribed treatment plan strictly\n");
        out.push_str("• Improve daily routines: stop smoking, limit alcohol, keep regular hours\n");
        out.push_str("• Re-examine regularly and monitor your condition closely\n");
    }

    out
}

/// Group samples into per-item measurement histories for charting.
///
/// Points are sorted oldest first within a series; series are sorted by
/// their most recent point. The first unit seen for an item wins.
pub fn build_trend_series(samples: &[MeasurementSample]) -> Vec<TrendSeries> {
    let mut accumulators: HashMap<String, TrendAccumulator> = HashMap::new();

    for sample in samples {
        let entry = accumulators
            .entry(sample.item_label.clone())
            .or_insert_with(TrendAccumulator::default);

        entry.push(
            TrendPoint {
                recorded_at: sample.recorded_at,
                value: leading_numeric(&sample.measured_value),
                display: sample.measured_value.clone(),
            },
            sample.unit.clone(),
        );
    }

    let mut series: Vec<TrendSeries> = accumulators
        .into_iter()
        .map(|(item_label, mut acc)| {
            acc.points.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
            TrendSeries {
                item_label,
                unit: acc.unit,
                points: acc.points,
            }
        })
        .collect();
    series.sort_by(|a, b| {
        let a_latest = a.points.iter().filter_map(|p| p.recorded_at).max();
        let b_latest = b.points.iter().filter_map(|p| p.recorded_at).max();
        b_latest.cmp(&a_latest)
    });

    series
}

#[derive(Default)]
struct TrendAccumulator {
    unit: Option<String>,
    points: Vec<TrendPoint>,
}

impl TrendAccumulator {
    fn push(&mut self, point: TrendPoint, unit: Option<String>) {
        if self.unit.is_none() && unit.is_some() {
            self.unit = unit;
        }
        self.points.push(point);
    }
}

fn sample_from_record(record: &Value) -> MeasurementSample {
    let item_label = record_text(record, "itemName")
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| fallback_label(record));

    MeasurementSample {
        item_label,
        measured_value: record_text(record, "measuredValue").unwrap_or_default(),
        reference_spec: record_text(record, "referenceVal").unwrap_or_default(),
        unit: record_text(record, "unit").filter(|unit| !unit.trim().is_empty()),
        recorded_at: record
            .get("recordedAt")
            .and_then(Value::as_str)
            .and_then(parse_datetime),
    }
}

fn fallback_label(record: &Value) -> String {
    match record.get("itemId").and_then(Value::as_i64) {
        Some(id) => format!("item-{id}"),
        None => "item-unknown".to_string(),
    }
}

fn record_text(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number.as_f64().map(format_numeric),
        _ => None,
    }
}

fn format_numeric(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else if (value * 10.0).fract().abs() < f64::EPSILON {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn is_unknown_placeholder(spec: &str) -> bool {
    spec == "未知" || spec.eq_ignore_ascii_case("unknown")
}

fn leading_numeric(value: &str) -> Option<f64> {
    let token = value.split_whitespace().next()?;
    let cleaned: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        cleaned.parse::<f64>().ok()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
