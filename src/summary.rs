// src/summary.rs
use serde_json::Value;
use std::fmt;

use crate::models::Report;

const RATIONALE_PREVIEW_CHARS: usize = 100;

/// One line of the prioritized detector list.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorLine {
    pub priority: Option<i64>,
    pub name: String,
    pub risk_level: Option<String>,
    pub rationale: Option<String>,
}

/// Human-oriented digest of a report, printed after a successful analysis.
/// Every field is optional since the backend owns the report schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSummary {
    pub report_id: Option<String>,
    pub application_name: Option<String>,
    pub summary: Option<String>,
    pub timing_ms: Option<f64>,
    pub detectors: Vec<DetectorLine>,
}

impl ReportSummary {
    pub fn from_report(report: &Report) -> Self {
        let value = report.as_value();

        let mut detectors: Vec<DetectorLine> = value
            .get("prioritized_detectors")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(detector_line).collect())
            .unwrap_or_default();
        // Unranked detectors go last; sort is stable for equal priorities.
        detectors.sort_by_key(|d| d.priority.unwrap_or(i64::MAX));

        Self {
            report_id: text_field(value, "report_id"),
            application_name: text_field(value, "application_name"),
            summary: text_field(value, "summary"),
            timing_ms: value.get("timing_ms").and_then(Value::as_f64),
            detectors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.report_id.is_none()
            && self.application_name.is_none()
            && self.summary.is_none()
            && self.detectors.is_empty()
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn detector_line(item: &Value) -> Option<DetectorLine> {
    let name = text_field(item, "detector_name")?;
    let priority = match item.get("priority") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Some(DetectorLine {
        priority,
        name,
        risk_level: text_field(item, "risk_level"),
        rationale: text_field(item, "rationale").or_else(|| text_field(item, "risk_rationale")),
    })
}

fn preview(text: &str) -> String {
    if text.chars().count() <= RATIONALE_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(RATIONALE_PREVIEW_CHARS).collect();
    format!("{}...", cut)
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.report_id {
            writeln!(f, "Report ID: {}", id)?;
        }
        if let Some(name) = &self.application_name {
            writeln!(f, "Application: {}", name)?;
        }
        if let Some(ms) = self.timing_ms {
            writeln!(f, "Analysis time: {:.0}ms", ms)?;
        }
        if let Some(summary) = &self.summary {
            writeln!(f, "\nSummary: {}", summary)?;
        }
        if !self.detectors.is_empty() {
            writeln!(f, "\n--- Prioritized detectors ---")?;
            for (index, detector) in self.detectors.iter().enumerate() {
                let rank = detector
                    .priority
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| (index + 1).to_string());
                let risk = detector.risk_level.as_deref().unwrap_or("n/a");
                writeln!(f, "\n{}. {} [Risk: {}]", rank, detector.name, risk)?;
                if let Some(rationale) = &detector.rationale {
                    writeln!(f, "   Rationale: {}", preview(rationale))?;
                }
            }
        }
        Ok(())
    }
}
