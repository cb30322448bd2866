use std::fmt::Write;

use thiserror::Error;

use crate::glucose::{AXIS_MAX, TARGET_HIGH, TARGET_LOW};
use crate::models::{GlucoseDay, RiskBand};
use crate::risk;

pub const BAR_WIDTH: usize = 40;
pub const GAUGE_WIDTH: usize = 60;
pub const STRIP_WIDTH: usize = 46;
/// The strip shows at most this many rows; longer days are sampled evenly.
pub const STRIP_MAX_ROWS: usize = 24;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("got {labels} labels but {values} values")]
    LengthMismatch { labels: usize, values: usize },
    #[error("bar '{label}' has invalid value {value}")]
    InvalidValue { label: String, value: f64 },
    #[error("nothing to plot")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub highlighted: bool,
}

/// Horizontal bars, drawn top to bottom in the given order. Values past `axis_max`
/// run to the edge of the chart.
pub fn render_bars(bars: &[Bar], axis_max: Option<f64>, unit: &str) -> Result<String, ChartError> {
    if bars.is_empty() {
        return Err(ChartError::Empty);
    }
    if let Some(bad) = bars.iter().find(|bar| !bar.value.is_finite() || bar.value < 0.0) {
        return Err(ChartError::InvalidValue {
            label: bad.label.clone(),
            value: bad.value,
        });
    }

    let largest = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);
    let axis_max = axis_max.filter(|max| *max > 0.0).unwrap_or(largest);
    let label_width = bars.iter().map(|bar| bar.label.chars().count()).max().unwrap_or(0);

    let mut output = String::new();
    for bar in bars {
        let cells = if axis_max > 0.0 {
            ((bar.value / axis_max).min(1.0) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let fill = if bar.highlighted { '#' } else { '=' };
        let _ = writeln!(
            output,
            "{:>label_width$} | {:<bar_width$} {:.1}{}",
            bar.label,
            fill.to_string().repeat(cells),
            bar.value,
            unit,
            bar_width = BAR_WIDTH
        );
    }

    if let Some(axis) = axis_label(axis_max, unit) {
        let _ = writeln!(output, "{:>label_width$}   {}", "", axis);
    }
    Ok(output)
}

fn axis_label(axis_max: f64, unit: &str) -> Option<String> {
    if axis_max <= 0.0 {
        return None;
    }
    let left = format!("0{unit}");
    let right = format!("{axis_max:.0}{unit}");
    let gap = BAR_WIDTH.saturating_sub(left.len() + right.len());
    Some(format!("{left}{}{right}", " ".repeat(gap)))
}

/// Free-form chart: the first label is drawn at the top.
pub fn render_custom_chart(labels: &[String], values: &[f64]) -> Result<String, ChartError> {
    if labels.len() != values.len() {
        return Err(ChartError::LengthMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }

    let bars: Vec<Bar> = labels
        .iter()
        .zip(values)
        .map(|(label, &value)| Bar {
            label: label.clone(),
            value,
            highlighted: false,
        })
        .collect();
    render_bars(&bars, None, "")
}

fn band_fill(position: f64) -> char {
    match risk::risk_band(position) {
        RiskBand::Lower => '-',
        RiskBand::Medium => '=',
        RiskBand::Higher => '#',
    }
}

pub fn marker_column(score: f64, width: usize) -> usize {
    (score.clamp(0.0, 1.0) * (width - 1) as f64).round() as usize
}

pub fn render_gauge(score: f64) -> String {
    let marker = marker_column(score, GAUGE_WIDTH);
    let track: String = (0..GAUGE_WIDTH)
        .map(|column| {
            if column == marker {
                '|'
            } else {
                band_fill(column as f64 / (GAUGE_WIDTH - 1) as f64)
            }
        })
        .collect();

    let lower = RiskBand::Lower.label();
    let medium = RiskBand::Medium.label();
    let higher = RiskBand::Higher.label();
    let medium_start = GAUGE_WIDTH / 2 - medium.len() / 2;
    let mut labels = String::from(lower);
    labels.push_str(&" ".repeat(medium_start.saturating_sub(lower.len())));
    labels.push_str(medium);
    labels.push_str(
        &" ".repeat(GAUGE_WIDTH.saturating_sub(labels.len() + higher.len())),
    );
    labels.push_str(higher);

    let mut output = String::new();
    let _ = writeln!(output, "Risk score");
    let _ = writeln!(output, "[{track}]");
    let _ = writeln!(output, " {labels}");
    output
}

fn strip_row(value: f64) -> String {
    let marker = ((value / AXIS_MAX).clamp(0.0, 1.0) * (STRIP_WIDTH - 1) as f64).round() as usize;
    (0..STRIP_WIDTH)
        .map(|column| {
            let level = column as f64 / (STRIP_WIDTH - 1) as f64 * AXIS_MAX;
            if column == marker {
                '*'
            } else if (TARGET_LOW..=TARGET_HIGH).contains(&level) {
                ':'
            } else {
                ' '
            }
        })
        .collect()
}

/// Time-of-day strip for one day, with the target range shaded.
pub fn render_glucose_strip(day: &GlucoseDay) -> String {
    let stride = day.readings.len().div_ceil(STRIP_MAX_ROWS).max(1);
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Blood Glucose through the day (Day {}, mmol/L, target {:.1}-{:.1})",
        day.day, TARGET_LOW, TARGET_HIGH
    );

    for reading in day.readings.iter().step_by(stride) {
        let _ = writeln!(
            output,
            "{} |{}| {:>5.1}",
            reading.time.format("%H:%M"),
            strip_row(reading.mmol_per_l),
            reading.mmol_per_l
        );
    }

    let right = format!("{AXIS_MAX:.1}");
    let _ = writeln!(
        output,
        "       0{}{}",
        " ".repeat(STRIP_WIDTH.saturating_sub(1 + right.len())),
        right
    );
    output
}
