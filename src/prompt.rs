use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::models::ImportanceWeights;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

pub const INTRO: &str = "How important would you rate the following for managing diabetes?";
pub const CGM_PROMPT: &str = "\nUsage of CGM devices (1-10) :";
pub const TESTS_PROMPT: &str = "\nNumber of finger prick tests a day (1-10) :";
pub const HBA1C_PROMPT: &str = "\nHbA1c test result (1-10) :";

/// Why a typed rating was turned away. Both are answered by asking again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("Please enter a number!")]
    NotNumeric,
    #[error("Please enter a number 1-10!")]
    OutOfRange,
}

pub fn parse_rating(line: &str) -> Result<f64, RatingError> {
    let value: f64 = line.trim().parse().map_err(|_| RatingError::NotNumeric)?;
    if (RATING_MIN..=RATING_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(RatingError::OutOfRange)
    }
}

/// Asks until a rating in [1, 10] is typed. Running out of input is an error.
pub fn request_rating<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<f64> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a rating was entered",
            ));
        }

        match parse_rating(&line) {
            Ok(value) => return Ok(value),
            Err(err) => {
                log::debug!("rejected rating {:?}: {:?}", line.trim(), err);
                writeln!(output, "{err}")?;
            }
        }
    }
}

pub fn elicit_importance<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<ImportanceWeights> {
    writeln!(output, "{INTRO}")?;
    let cgm = request_rating(input, output, CGM_PROMPT)?;
    let tests = request_rating(input, output, TESTS_PROMPT)?;
    let hba1c = request_rating(input, output, HBA1C_PROMPT)?;
    writeln!(output)?;

    let weights = ImportanceWeights::from_ratings(cgm, tests, hba1c);
    log::info!("elicited ratings cgm={cgm} tests={tests} hba1c={hba1c} -> {weights:?}");
    Ok(weights)
}
