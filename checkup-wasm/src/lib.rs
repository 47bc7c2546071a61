//! Framework-neutral WASM <-> JavaScript bridge for the analysis engine.

use checkup_core::{AnalysisConfig, AnalysisError};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsAnalysisConfig {
    #[serde(default)]
    excellent_rate: Option<f64>,
    #[serde(default)]
    good_rate: Option<f64>,
    #[serde(default)]
    fair_rate: Option<f64>,
    #[serde(default)]
    monitor_abnormal_max: Option<usize>,
}

impl From<JsAnalysisConfig> for AnalysisConfig {
    fn from(cfg: JsAnalysisConfig) -> Self {
        let mut base = AnalysisConfig::default();
        if let Some(rate) = cfg.excellent_rate {
            base.excellent_rate = rate;
        }
        if let Some(rate) = cfg.good_rate {
            base.good_rate = rate;
        }
        if let Some(rate) = cfg.fair_rate {
            base.fair_rate = rate;
        }
        if let Some(count) = cfg.monitor_abnormal_max {
            base.monitor_abnormal_max = count;
        }
        base
    }
}

#[wasm_bindgen]
pub fn analyze_records(
    input_records: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let doc = from_value::<serde_json::Value>(input_records)
        .map_err(|err| JsValue::from_str(&format!("could not read records JSON: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsAnalysisConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("could not read config: {err}")))?;
            AnalysisConfig::from(cfg)
        }
        None => AnalysisConfig::default(),
    };

    let report = checkup_analysis::analyze_records_value(&doc, &cfg)
        .map_err(|err| JsValue::from_str(&format_analysis_error(err)))?;

    to_value(&report).map_err(|err| JsValue::from_str(&format!("could not serialize report: {err}")))
}

fn format_analysis_error(err: AnalysisError) -> String {
    format!("Analysis error: {err}")
}
