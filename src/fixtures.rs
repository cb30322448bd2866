use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveTime;

use crate::models::{CgmUsage, FeatureImportance, GlucoseDay, GlucoseReading, PatientRecord};

pub const FEATURE_IMPORTANCES_FILE: &str = "feature_importances.csv";
pub const CGM_DAYS_FILE: &str = "summary_cgm_days_mmol.csv";
pub const DAY_COUNT: usize = 3;

pub fn default_path(data_dir: &Path, file: &str) -> PathBuf {
    data_dir.join(file)
}

pub fn example_patients() -> Vec<PatientRecord> {
    let patients = vec![
        ("1", 5.0, CgmUsage::Always, true, 18.0, 2.0),
        ("2", 13.0, CgmUsage::Never, false, 20.0, 9.0),
        ("3", 12.0, CgmUsage::Always, true, 28.0, 3.0),
        ("4", 7.0, CgmUsage::Always, true, 17.0, 7.0),
        ("5", 9.0, CgmUsage::Never, false, 25.0, 5.0),
    ];

    patients
        .into_iter()
        .map(
            |(id, hba1c, cgm, other_conditions, bmi, tests_per_day)| PatientRecord {
                id: id.to_string(),
                hba1c,
                cgm,
                other_conditions,
                bmi,
                tests_per_day,
            },
        )
        .collect()
}

pub fn export_patients(patients: &[PatientRecord], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for patient in patients {
        writer.serialize(patient)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_feature_importances(path: &Path) -> anyhow::Result<Vec<FeatureImportance>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open feature importances at {}", path.display()))?;
    let mut features = Vec::new();

    for result in reader.deserialize::<FeatureImportance>() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        if !row.importance.is_finite() || row.importance < 0.0 {
            anyhow::bail!(
                "feature '{}' has invalid importance {} in {}",
                row.label,
                row.importance,
                path.display()
            );
        }
        features.push(row);
    }

    log::info!("loaded {} feature importances from {}", features.len(), path.display());
    Ok(features)
}

pub fn parse_time_of_day(value: &str) -> anyhow::Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("invalid time of day '{value}'"))
}

pub fn load_glucose_days(path: &Path) -> anyhow::Result<Vec<GlucoseDay>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        time: String,
        y1: f64,
        y2: f64,
        y3: f64,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open CGM days at {}", path.display()))?;
    let mut days: Vec<GlucoseDay> = (1..=DAY_COUNT)
        .map(|day| GlucoseDay {
            day,
            readings: Vec::new(),
        })
        .collect();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.with_context(|| format!("malformed row in {}", path.display()))?;
        let time = parse_time_of_day(&row.time)?;
        for (day, value) in days.iter_mut().zip([row.y1, row.y2, row.y3]) {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!(
                    "day {} has invalid reading {} at {} in {}",
                    day.day,
                    value,
                    time.format("%H:%M"),
                    path.display()
                );
            }
            day.readings.push(GlucoseReading {
                time,
                mmol_per_l: value,
            });
        }
    }

    if days[0].readings.is_empty() {
        anyhow::bail!("no readings found in {}", path.display());
    }

    log::info!(
        "loaded {} readings per day from {}",
        days[0].readings.len(),
        path.display()
    );
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn example_patients_match_table() {
        let patients = example_patients();
        assert_eq!(patients.len(), 5);
        assert_eq!(patients[1].id, "2");
        assert_eq!(patients[1].hba1c, 13.0);
        assert_eq!(patients[1].cgm, CgmUsage::Never);
        assert_eq!(patients[2].bmi, 28.0);
        assert!(patients[3].other_conditions);
        assert_eq!(patients[4].tests_per_day, 5.0);
    }

    #[test]
    fn loads_feature_importances() {
        let file = write_fixture("label,importance\nAge,0.12\nHbA1c,0.2\n");
        let features = load_feature_importances(file.path()).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1].label, "HbA1c");
        assert_eq!(features[1].importance, 0.2);
    }

    #[test]
    fn rejects_negative_importance() {
        let file = write_fixture("label,importance\nAge,-0.1\n");
        assert!(load_feature_importances(file.path()).is_err());
    }

    #[test]
    fn loads_three_glucose_days() {
        let file = write_fixture("time,y1,y2,y3\n00:00,5.5,7.1,9.0\n00:15:00,5.8,7.4,8.7\n");
        let days = load_glucose_days(file.path()).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[2].day, 3);
        assert_eq!(days[2].readings.len(), 2);
        assert_eq!(days[1].readings[1].mmol_per_l, 7.4);
        assert_eq!(
            days[0].readings[1].time,
            NaiveTime::from_hms_opt(0, 15, 0).unwrap()
        );
    }

    #[test]
    fn empty_glucose_file_is_an_error() {
        let file = write_fixture("time,y1,y2,y3\n");
        assert!(load_glucose_days(file.path()).is_err());
    }

    #[test]
    fn rejects_non_finite_and_negative_readings() {
        let file = write_fixture("time,y1,y2,y3\n00:00,NaN,6,5\n00:15,6,6,6\n");
        let err = load_glucose_days(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("day 1"));
        assert!(message.contains("00:00"));

        let file = write_fixture("time,y1,y2,y3\n00:00,6,6,6\n00:15,6,-4,6\n");
        let err = load_glucose_days(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("day 2"));
        assert!(message.contains("00:15"));
    }

    #[test]
    fn bad_time_is_reported() {
        let file = write_fixture("time,y1,y2,y3\nnoon,5.5,7.1,9.0\n");
        let err = load_glucose_days(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("noon"));
    }

    #[test]
    fn exported_patients_have_table_headers() {
        let file = NamedTempFile::new().expect("tempfile");
        export_patients(&example_patients(), file.path()).unwrap();
        let written = std::fs::read_to_string(file.path()).unwrap();
        let header = written.lines().next().unwrap();
        assert!(header.starts_with("Patient ID,Blood Glucose Control (HbA1c),Do you use CGM?"));
        assert_eq!(written.lines().count(), 6);
        assert!(written.contains("2,13.0,Never,false,20.0,9.0"));
    }
}
