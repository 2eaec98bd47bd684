//! Health-sample model
//!
//! During a delivery the companion service is polled for a simulated
//! fatigue/wellness reading. The wire format is a free-form status string;
//! the client maps it onto a fixed five-point scale. Unrecognized strings
//! fall back to the middle level but keep the raw label for display, which
//! matches what riders actually see in the field when a device misreports.

use core::fmt;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Health Status Scale
// ----------------------------------------------------------------------------

/// The five recognized wellness readings, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthStatus {
    VeryNegative,
    Negative,
    Medium,
    Positive,
    VeryPositive,
}

impl HealthStatus {
    /// Numeric level on the 1..=5 scale shown in the health bar.
    pub fn level(&self) -> u8 {
        match self {
            HealthStatus::VeryNegative => 1,
            HealthStatus::Negative => 2,
            HealthStatus::Medium => 3,
            HealthStatus::Positive => 4,
            HealthStatus::VeryPositive => 5,
        }
    }

    /// Wire label as the companion service emits it.
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::VeryNegative => "VERY NEGATIVE",
            HealthStatus::Negative => "NEGATIVE",
            HealthStatus::Medium => "MEDIUM",
            HealthStatus::Positive => "POSITIVE",
            HealthStatus::VeryPositive => "VERY POSITIVE",
        }
    }

    /// Parse a status report case-insensitively. Returns `None` for
    /// unrecognized strings; the caller decides the fallback.
    pub fn parse_report(report: &str) -> Option<Self> {
        match report.trim().to_uppercase().as_str() {
            "VERY NEGATIVE" => Some(HealthStatus::VeryNegative),
            "NEGATIVE" => Some(HealthStatus::Negative),
            "MEDIUM" => Some(HealthStatus::Medium),
            "POSITIVE" => Some(HealthStatus::Positive),
            "VERY POSITIVE" => Some(HealthStatus::VeryPositive),
            _ => None,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ----------------------------------------------------------------------------
// Health Sample
// ----------------------------------------------------------------------------

/// The most recent wellness reading, as displayed to the rider.
///
/// `label` is the raw wire string (upper-cased); when the report is not one
/// of the five known readings the label is kept as received while the level
/// falls back to 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSample {
    pub level: u8,
    pub label: String,
}

impl HealthSample {
    /// Build a sample from a raw companion-service report.
    pub fn from_report(report: &str) -> Self {
        let label = report.trim().to_uppercase();
        let level = HealthStatus::parse_report(report)
            .map(|s| s.level())
            .unwrap_or(HealthStatus::Medium.level());
        Self { level, label }
    }

    /// Whether the label is one of the five recognized readings.
    pub fn is_recognized(&self) -> bool {
        HealthStatus::parse_report(&self.label).is_some()
    }
}

impl Default for HealthSample {
    fn default() -> Self {
        Self {
            level: HealthStatus::Medium.level(),
            label: HealthStatus::Medium.label().to_string(),
        }
    }
}

impl fmt::Display for HealthSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/5)", self.label, self.level)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(
            HealthStatus::parse_report("positive"),
            Some(HealthStatus::Positive)
        );
        assert_eq!(
            HealthStatus::parse_report("Very Negative"),
            Some(HealthStatus::VeryNegative)
        );
        assert_eq!(
            HealthStatus::parse_report("  medium  "),
            Some(HealthStatus::Medium)
        );
    }

    #[test]
    fn unrecognized_report_defaults_to_level_three() {
        let sample = HealthSample::from_report("FOO");
        assert_eq!(sample.level, 3);
        assert_eq!(sample.label, "FOO");
        assert!(!sample.is_recognized());
    }

    #[test]
    fn levels_span_the_scale() {
        assert_eq!(HealthSample::from_report("VERY NEGATIVE").level, 1);
        assert_eq!(HealthSample::from_report("negative").level, 2);
        assert_eq!(HealthSample::from_report("MEDIUM").level, 3);
        assert_eq!(HealthSample::from_report("positive").level, 4);
        assert_eq!(HealthSample::from_report("VERY POSITIVE").level, 5);
    }

    #[test]
    fn default_sample_is_medium() {
        let sample = HealthSample::default();
        assert_eq!(sample.level, 3);
        assert_eq!(sample.label, "MEDIUM");
    }

    #[test]
    fn valid_then_invalid_sequence() {
        let first = HealthSample::from_report("VERY POSITIVE");
        assert_eq!(first.level, 5);
        let second = HealthSample::from_report("UNKNOWN");
        assert_eq!(second.level, 3);
        assert_eq!(second.label, "UNKNOWN");
    }
}
