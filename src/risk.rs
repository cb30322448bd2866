use thiserror::Error;

use crate::models::{CgmUsage, ImportanceWeights, RiskBand, RiskEvaluation, RiskInputs};

pub const BASELINE_RISK: f64 = 0.2;
pub const HBA1C_MIN: f64 = 5.0;
pub const HBA1C_MAX: f64 = 15.0;
pub const TESTS_MIN: f64 = 0.0;
pub const TESTS_MAX: f64 = 10.0;
/// Finest HbA1c step the slider offers.
pub const SWEEP_MIN_STEP: f64 = 0.01;

#[derive(Debug, Error, PartialEq)]
pub enum InputRangeError {
    #[error("HbA1c must be between 5 and 15, got {0}")]
    HbA1c(f64),
    #[error("finger prick tests per day must be between 0 and 10, got {0}")]
    Tests(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum SweepError {
    #[error("sweep step must be a finite number of at least {min}, got {step}")]
    InvalidStep { step: f64, min: f64 },
}

impl RiskInputs {
    /// Checks the slider domains. The formula itself accepts anything.
    pub fn validate(&self) -> Result<(), InputRangeError> {
        if !(HBA1C_MIN..=HBA1C_MAX).contains(&self.hba1c) {
            return Err(InputRangeError::HbA1c(self.hba1c));
        }
        if !(TESTS_MIN..=TESTS_MAX).contains(&self.tests_per_day) {
            return Err(InputRangeError::Tests(self.tests_per_day));
        }
        Ok(())
    }
}

pub fn device_coefficient(cgm: CgmUsage) -> f64 {
    match cgm {
        CgmUsage::Never => 0.2,
        CgmUsage::Sometimes => 0.1,
        CgmUsage::Always => 0.0,
    }
}

pub fn risk_score(inputs: &RiskInputs, weights: &ImportanceWeights) -> f64 {
    let f = (inputs.hba1c - HBA1C_MIN) / 10.0;
    let g = inputs.tests_per_day * 0.03;
    let raw = BASELINE_RISK + f * 0.6 * weights.hba1c + device_coefficient(inputs.cgm) * weights.cgm
        - g * weights.tests;
    raw.clamp(0.0, 1.0)
}

pub fn risk_band(score: f64) -> RiskBand {
    if score < 1.0 / 3.0 {
        RiskBand::Lower
    } else if score < 2.0 / 3.0 {
        RiskBand::Medium
    } else {
        RiskBand::Higher
    }
}

pub fn evaluate(inputs: RiskInputs, weights: ImportanceWeights) -> RiskEvaluation {
    let score = risk_score(&inputs, &weights);
    log::debug!(
        "risk {:.3} for hba1c={} tests={} cgm={} weights={:?}",
        score,
        inputs.hba1c,
        inputs.tests_per_day,
        inputs.cgm,
        weights
    );
    RiskEvaluation {
        inputs,
        weights,
        score,
        band: risk_band(score),
    }
}

/// Evaluates the formula across the HbA1c slider with the other inputs held fixed.
pub fn sweep_hba1c(
    tests_per_day: f64,
    cgm: CgmUsage,
    weights: ImportanceWeights,
    step: f64,
) -> Result<Vec<RiskEvaluation>, SweepError> {
    if !step.is_finite() || step < SWEEP_MIN_STEP {
        return Err(SweepError::InvalidStep {
            step,
            min: SWEEP_MIN_STEP,
        });
    }
    let steps = ((HBA1C_MAX - HBA1C_MIN) / step).floor() as usize;
    let mut values: Vec<RiskEvaluation> = (0..=steps)
        .map(|index| {
            let hba1c = HBA1C_MIN + index as f64 * step;
            evaluate(
                RiskInputs {
                    hba1c,
                    tests_per_day,
                    cgm,
                },
                weights,
            )
        })
        .collect();

    let reached_end = values
        .last()
        .map(|last| (last.inputs.hba1c - HBA1C_MAX).abs() < 1e-9)
        .unwrap_or(false);
    if !reached_end {
        values.push(evaluate(
            RiskInputs {
                hba1c: HBA1C_MAX,
                tests_per_day,
                cgm,
            },
            weights,
        ));
    }
    Ok(values)
}
