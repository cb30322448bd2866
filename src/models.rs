use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// How often the person wears a continuous glucose monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CgmUsage {
    Never,
    Sometimes,
    Always,
}

impl CgmUsage {
    pub fn label(self) -> &'static str {
        match self {
            CgmUsage::Never => "Never",
            CgmUsage::Sometimes => "Sometimes",
            CgmUsage::Always => "Always",
        }
    }
}

impl fmt::Display for CgmUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CgmUsage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "never" | "no" => Ok(CgmUsage::Never),
            "sometimes" => Ok(CgmUsage::Sometimes),
            "always" | "yes" => Ok(CgmUsage::Always),
            other => Err(format!(
                "unknown CGM usage '{other}' (expected never/no, sometimes, always/yes)"
            )),
        }
    }
}

/// The three values a gauge evaluation is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskInputs {
    pub hba1c: f64,
    pub tests_per_day: f64,
    pub cgm: CgmUsage,
}

impl Default for RiskInputs {
    fn default() -> Self {
        Self {
            hba1c: 5.0,
            tests_per_day: 5.0,
            cgm: CgmUsage::Never,
        }
    }
}

/// Perceived importance of CGM use, finger-prick tests and HbA1c, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImportanceWeights {
    pub cgm: f64,
    pub tests: f64,
    pub hba1c: f64,
}

impl ImportanceWeights {
    pub fn new(cgm: f64, tests: f64, hba1c: f64) -> Self {
        Self { cgm, tests, hba1c }
    }

    /// Gauge default: every factor counts once.
    pub fn uniform() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Divides each rating by the sum of all three.
    pub fn from_ratings(cgm: f64, tests: f64, hba1c: f64) -> Self {
        let total = cgm + tests + hba1c;
        Self::new(cgm / total, tests / total, hba1c / total)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.cgm * factor, self.tests * factor, self.hba1c * factor)
    }

    pub fn sum(&self) -> f64 {
        self.cgm + self.tests + self.hba1c
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.cgm, self.tests, self.hba1c]
    }
}

impl FromStr for ImportanceWeights {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!(
                "expected three comma-separated weights (cgm,tests,hba1c), got '{value}'"
            ));
        }

        let mut parsed = [0.0f64; 3];
        for (slot, part) in parsed.iter_mut().zip(parts.iter()) {
            let number: f64 = part
                .parse()
                .map_err(|_| format!("weight '{part}' is not a number"))?;
            if !number.is_finite() || number < 0.0 {
                return Err(format!("weight '{part}' must be a finite, non-negative number"));
            }
            *slot = number;
        }

        Ok(Self::new(parsed[0], parsed[1], parsed[2]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBand {
    Lower,
    Medium,
    Higher,
}

impl RiskBand {
    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Lower => "Lower risk",
            RiskBand::Medium => "Medium risk",
            RiskBand::Higher => "Higher risk",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskEvaluation {
    pub inputs: RiskInputs,
    pub weights: ImportanceWeights,
    pub score: f64,
    pub band: RiskBand,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientRecord {
    #[serde(rename = "Patient ID")]
    pub id: String,
    #[serde(rename = "Blood Glucose Control (HbA1c)")]
    pub hba1c: f64,
    #[serde(rename = "Do you use CGM?")]
    pub cgm: CgmUsage,
    #[serde(rename = "Other Health Conditions")]
    pub other_conditions: bool,
    #[serde(rename = "Body Mass Index")]
    pub bmi: f64,
    #[serde(rename = "Finger prick tests per day")]
    pub tests_per_day: f64,
}

impl PatientRecord {
    pub fn risk_inputs(&self) -> RiskInputs {
        RiskInputs {
            hba1c: self.hba1c,
            tests_per_day: self.tests_per_day,
            cgm: self.cgm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureImportance {
    pub label: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlucoseReading {
    pub time: NaiveTime,
    pub mmol_per_l: f64,
}

#[derive(Debug, Clone)]
pub struct GlucoseDay {
    pub day: usize,
    pub readings: Vec<GlucoseReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: usize,
    pub reading_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub percent_below: f64,
    pub percent_in_range: f64,
    pub percent_above: f64,
}
