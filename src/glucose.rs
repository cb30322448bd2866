use crate::models::{DaySummary, GlucoseDay};

/// mg/dL to mmol/L.
pub const MGDL_PER_MMOL: f64 = 18.0;
pub const TARGET_LOW: f64 = 70.0 / MGDL_PER_MMOL;
pub const TARGET_HIGH: f64 = 270.0 / MGDL_PER_MMOL;
pub const AXIS_MAX: f64 = 410.0 / MGDL_PER_MMOL;

/// Only one day is shown at a time; `day` is 1-based.
pub fn select_day(days: &[GlucoseDay], day: usize) -> anyhow::Result<&GlucoseDay> {
    days.iter()
        .find(|candidate| candidate.day == day)
        .ok_or_else(|| anyhow::anyhow!("day {day} is not available (choose 1-{})", days.len()))
}

pub fn summarize_day(day: &GlucoseDay) -> DaySummary {
    let count = day.readings.len();
    let mut below = 0usize;
    let mut above = 0usize;
    let mut total = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for reading in &day.readings {
        let value = reading.mmol_per_l;
        total += value;
        min = min.min(value);
        max = max.max(value);
        if value < TARGET_LOW {
            below += 1;
        } else if value > TARGET_HIGH {
            above += 1;
        }
    }

    let percent = |part: usize| {
        if count == 0 {
            0.0
        } else {
            100.0 * part as f64 / count as f64
        }
    };
    let in_range = count - below - above;

    DaySummary {
        day: day.day,
        reading_count: count,
        min: if count == 0 { 0.0 } else { min },
        max: if count == 0 { 0.0 } else { max },
        mean: if count == 0 { 0.0 } else { total / count as f64 },
        percent_below: percent(below),
        percent_in_range: percent(in_range),
        percent_above: percent(above),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlucoseReading;
    use chrono::NaiveTime;

    fn day(number: usize, values: &[f64]) -> GlucoseDay {
        GlucoseDay {
            day: number,
            readings: values
                .iter()
                .enumerate()
                .map(|(index, &mmol_per_l)| GlucoseReading {
                    time: NaiveTime::from_hms_opt(index as u32, 0, 0).unwrap(),
                    mmol_per_l,
                })
                .collect(),
        }
    }

    #[test]
    fn target_range_matches_mgdl_bounds() {
        assert!((TARGET_LOW - 3.888_888).abs() < 1e-5);
        assert!((TARGET_HIGH - 15.0).abs() < 1e-12);
        assert!((AXIS_MAX - 22.777_777).abs() < 1e-5);
    }

    #[test]
    fn summary_splits_readings_by_target_range() {
        let summary = summarize_day(&day(2, &[3.0, 5.0, 10.0, 15.0, 18.0]));
        assert_eq!(summary.day, 2);
        assert_eq!(summary.reading_count, 5);
        assert_eq!(summary.min, 3.0);
        assert_eq!(summary.max, 18.0);
        assert!((summary.mean - 10.2).abs() < 1e-12);
        assert!((summary.percent_below - 20.0).abs() < 1e-12);
        assert!((summary.percent_in_range - 60.0).abs() < 1e-12);
        assert!((summary.percent_above - 20.0).abs() < 1e-12);
        let total = summary.percent_below + summary.percent_in_range + summary.percent_above;
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_day_summarizes_to_zero() {
        let summary = summarize_day(&day(1, &[]));
        assert_eq!(summary.reading_count, 0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.percent_in_range, 0.0);
    }

    #[test]
    fn select_day_picks_one_series() {
        let days = vec![day(1, &[5.0]), day(2, &[6.0]), day(3, &[7.0])];
        assert_eq!(select_day(&days, 3).unwrap().readings[0].mmol_per_l, 7.0);
        assert!(select_day(&days, 0).is_err());
        assert!(select_day(&days, 4).is_err());
    }
}
