//! Error types for the personnel cost engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading tariff data or
//! projecting costs.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Grade;

/// A single problem found while reading tariff input.
///
/// Format errors are collected over the whole input and reported together
/// through [`EngineError::TariffFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatError {
    /// The 1-based line number in the source (0 when not line-oriented).
    pub line: usize,
    /// A description of the problem.
    pub message: String,
}

impl FormatError {
    /// Creates a new format error for the given line.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// The main error type for the personnel cost engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use abakus::error::EngineError;
/// use abakus::models::Grade;
///
/// let error = EngineError::NoSalaryData { grade: Grade::E13 };
/// assert_eq!(error.to_string(), "No salary data for grade E13");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Tariff input contained malformed rows.
    #[error("Invalid tariff data ({} error(s)): {}", .errors.len(), join_errors(.errors))]
    TariffFormat {
        /// Every problem found in the input, in input order.
        errors: Vec<FormatError>,
    },

    /// A salary record for this year and grade already exists.
    #[error("Duplicate salary record for grade {grade} in {year}")]
    DuplicateSalaryRecord {
        /// The year of the rejected record.
        year: i32,
        /// The grade of the rejected record.
        grade: Grade,
    },

    /// No salary data exists for the grade in any year.
    #[error("No salary data for grade {grade}")]
    NoSalaryData {
        /// The grade that was requested.
        grade: Grade,
    },

    /// A salary record contained out-of-range values.
    #[error("Invalid salary record: {message}")]
    InvalidSalaryRecord {
        /// A description of what made the record invalid.
        message: String,
    },

    /// A position contained inconsistent data.
    #[error("Invalid position field '{field}': {message}")]
    InvalidPosition {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The temporal ordering of dates in a request was violated.
    #[error("Precondition violated: {message}")]
    Precondition {
        /// A description of the violated ordering.
        message: String,
    },

    /// A step anniversary could not be represented as a calendar date.
    #[error("Cannot shift {date} forward by {years} year(s)")]
    InvalidDate {
        /// The date that was shifted.
        date: NaiveDate,
        /// The number of years it was shifted by.
        years: u32,
    },

    /// The bonus reference base was requested for a year without employment.
    #[error("No employment months before December in {year}")]
    NoEmploymentInYear {
        /// The bonus year.
        year: i32,
    },
}

fn join_errors(errors: &[FormatError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
