use std::fmt::Write;

use crate::chart;
use crate::glucose;
use crate::importance::UpdatedImportances;
use crate::models::{GlucoseDay, ImportanceWeights, PatientRecord, RiskEvaluation};
use crate::risk;

pub fn welcome_banner() -> String {
    let message = "Hello and welcome to the notebook!";
    let inner = message.len() + 2;
    let mut output = String::new();
    let _ = writeln!(output, "{}", "*".repeat(inner + 2));
    let _ = writeln!(output, "*{}*", " ".repeat(inner));
    let _ = writeln!(output, "* {message} *");
    let _ = writeln!(output, "*{}*", " ".repeat(inner));
    let _ = writeln!(output, "{}", "*".repeat(inner + 2));
    output
}

pub fn describe_evaluation(evaluation: &RiskEvaluation) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "HbA1c {:.2}, {} finger prick tests per day, CGM: {}",
        evaluation.inputs.hba1c, evaluation.inputs.tests_per_day, evaluation.inputs.cgm
    );
    let _ = writeln!(
        output,
        "Weights (cgm, tests, hba1c): {:.2}, {:.2}, {:.2}",
        evaluation.weights.cgm, evaluation.weights.tests, evaluation.weights.hba1c
    );
    let _ = writeln!(
        output,
        "Risk score {:.2} ({})",
        evaluation.score,
        evaluation.band.label()
    );
    output.push_str(&chart::render_gauge(evaluation.score));
    output
}

pub fn patient_table(patients: &[PatientRecord], weights: Option<&ImportanceWeights>) -> String {
    let mut output = String::new();
    let mut header = String::from(
        "| Patient ID | Blood Glucose Control (HbA1c) | Do you use CGM? | Other Health Conditions | Body Mass Index | Finger prick tests per day |",
    );
    let mut divider = String::from("|---|---|---|---|---|---|");
    if weights.is_some() {
        header.push_str(" Risk score |");
        divider.push_str("---|");
    }
    let _ = writeln!(output, "{header}");
    let _ = writeln!(output, "{divider}");

    for patient in patients {
        let _ = write!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            patient.id,
            patient.hba1c,
            patient.cgm,
            patient.other_conditions,
            patient.bmi,
            patient.tests_per_day
        );
        if let Some(weights) = weights {
            let score = risk::risk_score(&patient.risk_inputs(), weights);
            let _ = write!(output, " {:.2} ({}) |", score, risk::risk_band(score).label());
        }
        let _ = writeln!(output);
    }

    output
}

/// The first feature in the table is drawn at the bottom.
pub fn importance_chart(updated: &UpdatedImportances) -> anyhow::Result<String> {
    let bars: Vec<chart::Bar> = updated
        .features
        .iter()
        .enumerate()
        .rev()
        .map(|(index, feature)| chart::Bar {
            label: feature.label.clone(),
            value: 100.0 * feature.importance,
            highlighted: updated.adjusted.contains(&index),
        })
        .collect();
    let mut output = String::from("What things put you more at risk?\n");
    output.push_str(&chart::render_bars(&bars, Some(30.0), "%")?);
    Ok(output)
}

pub fn day_summary(day: &GlucoseDay) -> String {
    let summary = glucose::summarize_day(day);
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Day {}: {} readings, mean {:.1} mmol/L (min {:.1}, max {:.1})",
        summary.day, summary.reading_count, summary.mean, summary.min, summary.max
    );
    let _ = writeln!(
        output,
        "Time below range {:.0}%, in range {:.0}%, above range {:.0}%",
        summary.percent_below, summary.percent_in_range, summary.percent_above
    );
    output
}

pub struct ReportInputs<'a> {
    pub evaluation: &'a RiskEvaluation,
    pub patients: &'a [PatientRecord],
    pub importances: Option<&'a UpdatedImportances>,
    pub glucose_days: Option<&'a [GlucoseDay]>,
}

pub fn build_report(inputs: &ReportInputs<'_>) -> anyhow::Result<String> {
    let mut output = String::new();

    let _ = writeln!(output, "# Diabetes Risk Explorer Report");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Score");
    let _ = writeln!(output, "```");
    output.push_str(&describe_evaluation(inputs.evaluation));
    let _ = writeln!(output, "```");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Example Patients");
    output.push_str(&patient_table(
        inputs.patients,
        Some(&inputs.evaluation.weights),
    ));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Feature Importance");
    match inputs.importances {
        Some(updated) => {
            let _ = writeln!(output, "```");
            output.push_str(&importance_chart(updated)?);
            let _ = writeln!(output, "```");
        }
        None => {
            let _ = writeln!(output, "No feature importances available.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Blood Glucose Days");
    match inputs.glucose_days {
        Some(days) if !days.is_empty() => {
            for day in days {
                let _ = writeln!(output, "- {}", day_summary(day).trim_end().replace('\n', "; "));
            }
        }
        _ => {
            let _ = writeln!(output, "No CGM days available.");
        }
    }

    Ok(output)
}
