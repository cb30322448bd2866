use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod chart;
mod fixtures;
mod glucose;
mod importance;
mod models;
mod prompt;
mod report;
mod risk;

use models::{CgmUsage, ImportanceWeights, RiskInputs};

const DATA_DIR_ENV: &str = "RISK_EXPLORER_DATA";

#[derive(Parser)]
#[command(name = "risk-explorer")]
#[command(about = "Interactive diabetes risk education tools", long_about = None)]
struct Cli {
    /// Directory holding the feature importance and CGM day fixtures
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the welcome banner
    Welcome,
    /// Evaluate the risk gauge for one set of inputs
    Score {
        #[arg(long, default_value_t = 5.0)]
        hba1c: f64,
        #[arg(long, default_value_t = 5.0)]
        tests: f64,
        #[arg(long, default_value = "never")]
        cgm: CgmUsage,
        /// Importance weights as cgm,tests,hba1c
        #[arg(long, default_value = "1,1,1")]
        weights: ImportanceWeights,
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the gauge across the whole HbA1c slider
    Sweep {
        #[arg(long, default_value_t = 5.0)]
        tests: f64,
        #[arg(long, default_value = "never")]
        cgm: CgmUsage,
        #[arg(long, default_value = "1,1,1")]
        weights: ImportanceWeights,
        #[arg(long, default_value_t = 1.0)]
        step: f64,
    },
    /// Ask for importance ratings and print the resulting weights
    Weights {
        #[arg(long)]
        json: bool,
    },
    /// Ask for importance ratings and redraw the model's feature importances
    Importance {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show one day of blood glucose readings
    Glucose {
        #[arg(long, default_value_t = 1)]
        day: usize,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the example patient table
    Patients {
        /// Add a risk column computed with these weights (cgm,tests,hba1c)
        #[arg(long)]
        weights: Option<ImportanceWeights>,
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Draw a bar chart from your own labels and values
    Chart {
        #[arg(long, value_delimiter = ',', required = true)]
        labels: Vec<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value_t = 5.0)]
        hba1c: f64,
        #[arg(long, default_value_t = 5.0)]
        tests: f64,
        #[arg(long, default_value = "never")]
        cgm: CgmUsage,
        #[arg(long, default_value = "1,1,1")]
        weights: ImportanceWeights,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn checked_inputs(hba1c: f64, tests: f64, cgm: CgmUsage) -> anyhow::Result<RiskInputs> {
    let inputs = RiskInputs {
        hba1c,
        tests_per_day: tests,
        cgm,
    };
    inputs.validate()?;
    Ok(inputs)
}

fn elicit_from_terminal() -> anyhow::Result<ImportanceWeights> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt::elicit_importance(&mut input, &mut output).context("failed to read importance ratings")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);
    log::debug!("using data directory {}", data_dir.display());

    match cli.command {
        Commands::Welcome => {
            print!("{}", report::welcome_banner());
        }
        Commands::Score {
            hba1c,
            tests,
            cgm,
            weights,
            json,
        } => {
            let evaluation = risk::evaluate(checked_inputs(hba1c, tests, cgm)?, weights);
            if json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                print!("{}", report::describe_evaluation(&evaluation));
            }
        }
        Commands::Sweep {
            tests,
            cgm,
            weights,
            step,
        } => {
            checked_inputs(risk::HBA1C_MIN, tests, cgm)?;
            println!("HbA1c sweep with {tests} tests per day, CGM: {cgm}");
            for evaluation in risk::sweep_hba1c(tests, cgm, weights, step)? {
                println!(
                    "- HbA1c {:>5.2}: score {:.2} ({})",
                    evaluation.inputs.hba1c,
                    evaluation.score,
                    evaluation.band.label()
                );
            }
        }
        Commands::Weights { json } => {
            let weights = elicit_from_terminal()?;
            let slider = weights.scaled(importance::SLIDER_SCALE);
            if json {
                let payload = serde_json::json!({
                    "normalized": weights,
                    "slider": slider,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Normalized weights (cgm, tests, hba1c): {:.3}, {:.3}, {:.3}",
                    weights.cgm, weights.tests, weights.hba1c
                );
                println!(
                    "Pass to the gauge with --weights {:.3},{:.3},{:.3}",
                    slider.cgm, slider.tests, slider.hba1c
                );
            }
        }
        Commands::Importance { csv } => {
            let path =
                csv.unwrap_or_else(|| fixtures::default_path(&data_dir, fixtures::FEATURE_IMPORTANCES_FILE));
            let features = fixtures::load_feature_importances(&path)?;
            let weights = elicit_from_terminal()?;
            let updated = importance::apply_weights(&features, &weights)?;
            print!("{}", report::importance_chart(&updated)?);
            let slider = updated.slider_weights;
            println!(
                "Pass to the gauge with --weights {:.3},{:.3},{:.3}",
                slider.cgm, slider.tests, slider.hba1c
            );
        }
        Commands::Glucose { day, csv, json } => {
            let path = csv.unwrap_or_else(|| fixtures::default_path(&data_dir, fixtures::CGM_DAYS_FILE));
            let days = fixtures::load_glucose_days(&path)?;
            let selected = glucose::select_day(&days, day)?;
            if json {
                let summary = glucose::summarize_day(selected);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", chart::render_glucose_strip(selected));
                print!("{}", report::day_summary(selected));
            }
        }
        Commands::Patients { weights, export } => {
            let patients = fixtures::example_patients();
            print!("{}", report::patient_table(&patients, weights.as_ref()));
            if let Some(path) = export {
                fixtures::export_patients(&patients, &path)?;
                println!("Patients written to {}.", path.display());
            }
        }
        Commands::Chart { labels, values } => {
            print!("{}", chart::render_custom_chart(&labels, &values)?);
        }
        Commands::Report {
            hba1c,
            tests,
            cgm,
            weights,
            out,
        } => {
            let evaluation = risk::evaluate(checked_inputs(hba1c, tests, cgm)?, weights);
            let patients = fixtures::example_patients();

            let importances = match fixtures::load_feature_importances(&fixtures::default_path(
                &data_dir,
                fixtures::FEATURE_IMPORTANCES_FILE,
            )) {
                Ok(features) => {
                    // Report weights are gauge-scale; bars use the normalized share.
                    let total = weights.sum();
                    let normalized = if total > 0.0 {
                        weights.scaled(1.0 / total)
                    } else {
                        ImportanceWeights::from_ratings(1.0, 1.0, 1.0)
                    };
                    Some(importance::apply_weights(&features, &normalized)?)
                }
                Err(err) => {
                    log::warn!("skipping feature importances: {err:#}");
                    None
                }
            };
            let glucose_days = match fixtures::load_glucose_days(&fixtures::default_path(
                &data_dir,
                fixtures::CGM_DAYS_FILE,
            )) {
                Ok(days) => Some(days),
                Err(err) => {
                    log::warn!("skipping CGM days: {err:#}");
                    None
                }
            };

            let report = report::build_report(&report::ReportInputs {
                evaluation: &evaluation,
                patients: &patients,
                importances: importances.as_ref(),
                glucose_days: glucose_days.as_deref(),
            })?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn score_defaults_match_gauge_defaults() {
        let cli = Cli::try_parse_from(["risk-explorer", "score"]).unwrap();
        match cli.command {
            Commands::Score {
                hba1c,
                tests,
                cgm,
                weights,
                json,
            } => {
                let defaults = RiskInputs::default();
                assert_eq!(hba1c, defaults.hba1c);
                assert_eq!(tests, defaults.tests_per_day);
                assert_eq!(cgm, defaults.cgm);
                assert_eq!(weights, ImportanceWeights::uniform());
                assert!(!json);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn chart_accepts_comma_lists() {
        let cli = Cli::try_parse_from([
            "risk-explorer",
            "chart",
            "--labels",
            "Diet,Exercise,Sleep",
            "--values",
            "3,5.5,2",
        ])
        .unwrap();
        match cli.command {
            Commands::Chart { labels, values } => {
                assert_eq!(labels, vec!["Diet", "Exercise", "Sleep"]);
                assert_eq!(values, vec![3.0, 5.5, 2.0]);
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn cgm_flag_uses_widget_labels() {
        let cli = Cli::try_parse_from(["risk-explorer", "score", "--cgm", "yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Score {
                cgm: CgmUsage::Always,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["risk-explorer", "score", "--cgm", "often"]).is_err());
    }

    #[test]
    fn glucose_json_flag_parses() {
        let cli = Cli::try_parse_from(["risk-explorer", "glucose", "--day", "2", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Glucose {
                day: 2,
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn off_slider_inputs_are_rejected() {
        assert!(checked_inputs(16.0, 2.0, CgmUsage::Never).is_err());
        assert!(checked_inputs(7.0, 2.0, CgmUsage::Never).is_ok());
    }

    #[test]
    fn data_dir_flag_wins() {
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/tmp/fixtures"))),
            PathBuf::from("/tmp/fixtures")
        );
    }
}
