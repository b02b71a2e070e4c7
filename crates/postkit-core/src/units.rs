//! Unit conversion utilities
//!
//! Toolpath documents store lengths in millimetres and feed rates in
//! millimetres per second. Programs are written either in metric (mm, mm/min)
//! or imperial (in, in/min) units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MM_PER_INCH: f64 = 25.4;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Measurement system of the generated program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm, G21)
    #[default]
    Metric,
    /// Imperial system (inches, G20)
    Imperial,
}

impl MeasurementSystem {
    /// Program directive selecting this unit system
    pub fn unit_directive(self) -> &'static str {
        match self {
            Self::Metric => "G21",
            Self::Imperial => "G20",
        }
    }

    /// Feed rate unit label ("mm/min" or "in/min")
    pub fn feed_label(self) -> &'static str {
        match self {
            Self::Metric => "mm/min",
            Self::Imperial => "in/min",
        }
    }

    /// Number of decimals used when the configuration does not set one
    pub fn default_precision(self) -> usize {
        match self {
            Self::Metric => 3,
            Self::Imperial => 4,
        }
    }

    /// Convert a length in millimetres to this system
    pub fn length(self, value_mm: f64) -> f64 {
        match self {
            Self::Metric => value_mm,
            Self::Imperial => value_mm / MM_PER_INCH,
        }
    }

    /// Convert a feed rate in mm/s to this system's per-minute unit
    pub fn feed_rate(self, value_mm_per_sec: f64) -> f64 {
        self.length(value_mm_per_sec * SECONDS_PER_MINUTE)
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Format a value with a fixed number of decimals
pub fn format_decimal(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// Format a length (given in mm) for the target system
pub fn format_length(value_mm: f64, system: MeasurementSystem, precision: usize) -> String {
    format_decimal(system.length(value_mm), precision)
}

/// Format a feed rate (given in mm/s) for the target system
pub fn format_feed_rate(
    value_mm_per_sec: f64,
    system: MeasurementSystem,
    precision: usize,
) -> String {
    format_decimal(system.feed_rate(value_mm_per_sec), precision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_length() {
        assert_eq!(format_length(10.5, MeasurementSystem::Metric, 3), "10.500");
        assert_eq!(format_length(-1.0, MeasurementSystem::Metric, 3), "-1.000");
    }

    #[test]
    fn test_imperial_length() {
        assert_eq!(format_length(25.4, MeasurementSystem::Imperial, 4), "1.0000");
        assert_eq!(format_length(12.7, MeasurementSystem::Imperial, 3), "0.500");
    }

    #[test]
    fn test_precision_only_changes_digit_count() {
        let three = format_length(12.3456789, MeasurementSystem::Metric, 3);
        let four = format_length(12.3456789, MeasurementSystem::Metric, 4);
        assert_eq!(three, "12.346");
        assert_eq!(four, "12.3457");
    }

    #[test]
    fn test_feed_rate_conversion() {
        // 10 mm/s = 600 mm/min
        assert_eq!(format_feed_rate(10.0, MeasurementSystem::Metric, 3), "600.000");
        // 25.4 mm/s = 60 in/min
        assert_eq!(format_feed_rate(25.4, MeasurementSystem::Imperial, 4), "60.0000");
    }

    #[test]
    fn test_labels_and_directives() {
        assert_eq!(MeasurementSystem::Metric.unit_directive(), "G21");
        assert_eq!(MeasurementSystem::Imperial.unit_directive(), "G20");
        assert_eq!(MeasurementSystem::Metric.feed_label(), "mm/min");
        assert_eq!(MeasurementSystem::Imperial.feed_label(), "in/min");
        assert_eq!(MeasurementSystem::Imperial.default_precision(), 4);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("mm".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!("Inch".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("furlong".parse::<MeasurementSystem>().is_err());
    }
}
