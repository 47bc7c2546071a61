//! Core value types for examination-result interpretation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thresholds steering score banding and recommendation selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Normalcy rate at or above which a report scores Excellent.
    pub excellent_rate: f64,
    /// Normalcy rate at or above which a report scores Good.
    pub good_rate: f64,
    /// Normalcy rate at or above which a report scores Fair.
    pub fair_rate: f64,
    /// Largest abnormal count still answered with the monitor-and-recheck message.
    pub monitor_abnormal_max: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excellent_rate: 0.90,
            good_rate: 0.80,
            fair_rate: 0.70,
            monitor_abnormal_max: 2,
        }
    }
}

/// One measured examination value together with its reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementSample {
    pub item_label: String,
    pub measured_value: String,
    pub reference_spec: String,
    pub unit: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl MeasurementSample {
    /// Build a sample from the three fields classification reads.
    pub fn new(item_label: &str, measured_value: &str, reference_spec: &str) -> Self {
        Self {
            item_label: item_label.to_string(),
            measured_value: measured_value.to_string(),
            reference_spec: reference_spec.to_string(),
            unit: None,
            recorded_at: None,
        }
    }
}

/// Parsed form of a reference specification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceRange {
    /// Inclusive numeric range, kept in source order even when min > max.
    Numeric { min: f64, max: f64 },
    /// Absent or placeholder specification; matches nothing, flags nothing.
    Unbounded,
    /// Non-empty specification that did not parse as a numeric range.
    Unparseable,
}

/// Per-sample classification outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Abnormal,
    Unknown,
}

/// Reduction of all verdicts in one report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisAggregate {
    pub total: usize,
    pub normal: usize,
    pub abnormal: usize,
    pub normalcy_rate: f64,
}

/// Discrete health-score band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent (90-100)",
            ScoreBand::Good => "Good (80-89)",
            ScoreBand::Fair => "Fair (70-79)",
            ScoreBand::NeedsImprovement => "Needs improvement (60-69)",
        }
    }
}

/// Coarse risk tier derived from the normalcy rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk",
            RiskTier::Moderate => "Moderate risk",
            RiskTier::High => "High risk",
        }
    }
}

/// Score band and risk tier assigned to one report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskAssessment {
    pub band: ScoreBand,
    pub tier: RiskTier,
}

/// One classified line of the report, in sample order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportLine {
    pub item_label: String,
    pub measured_value: String,
    pub reference_spec: String,
    pub verdict: Verdict,
}

/// The engine's sole output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<ReportLine>,
    pub aggregate: AnalysisAggregate,
    /// Absent exactly when no examination data was supplied.
    pub risk: Option<RiskAssessment>,
    pub narrative: String,
    pub recommendations: String,
}

impl AnalysisReport {
    /// Assemble a report from prepared parts, stamping the creation time.
    pub fn new(
        lines: Vec<ReportLine>,
        aggregate: AnalysisAggregate,
        risk: Option<RiskAssessment>,
        narrative: String,
        recommendations: String,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            lines,
            aggregate,
            risk,
            narrative,
            recommendations,
        }
    }

    /// Classified lines, preserving sample order.
    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }
}

/// One point in an item's measurement history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub recorded_at: Option<DateTime<Utc>>,
    pub value: Option<f64>,
    pub display: String,
}

/// Date-ordered measurement history for one check item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSeries {
    pub item_label: String,
    pub unit: Option<String>,
    pub points: Vec<TrendPoint>,
}

/// Errors raised while reading examination-record documents.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("record document has no results array")]
    MissingData,
    #[error("could not read record data: {0}")]
    Parse(String),
}
