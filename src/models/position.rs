//! Positions and automatic step advancement.
//!
//! A [`Position`] is a grade/step pair together with the date from which it
//! applies and a part-time percentage. [`Position::at`] evaluates the position
//! as of a later date, advancing through the steps whose waiting periods have
//! elapsed by then.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::{Grade, GradeStep, Step};

/// A grade/step held since a given date at a given part-time percentage.
///
/// # Example
///
/// ```
/// use abakus::models::{Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
///
/// let since = NaiveDate::from_ymd_opt(2019, 7, 1).unwrap();
/// let position = Position::full_time(GradeStep::new(Grade::E10, Step::One), since);
///
/// let later = position.at(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()).unwrap();
/// assert_eq!(later.grade_step().step, Step::Two);
/// assert_eq!(later.since(), NaiveDate::from_ymd_opt(2020, 7, 1).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PositionFields")]
pub struct Position {
    grade_step: GradeStep,
    since: NaiveDate,
    part_time_percent: Decimal,
}

#[derive(Deserialize)]
struct PositionFields {
    grade_step: GradeStep,
    since: NaiveDate,
    part_time_percent: Decimal,
}

impl TryFrom<PositionFields> for Position {
    type Error = EngineError;

    fn try_from(fields: PositionFields) -> Result<Self, Self::Error> {
        Position::new(fields.grade_step, fields.since, fields.part_time_percent)
    }
}

impl Position {
    /// Creates a position, rejecting part-time percentages outside (0, 100].
    pub fn new(
        grade_step: GradeStep,
        since: NaiveDate,
        part_time_percent: Decimal,
    ) -> EngineResult<Self> {
        if part_time_percent <= Decimal::ZERO || part_time_percent > Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidPosition {
                field: "part_time_percent".to_string(),
                message: format!("{} is outside (0, 100]", part_time_percent),
            });
        }

        Ok(Self {
            grade_step,
            since,
            part_time_percent,
        })
    }

    /// Creates a full-time (100%) position.
    pub fn full_time(grade_step: GradeStep, since: NaiveDate) -> Self {
        Self {
            grade_step,
            since,
            part_time_percent: Decimal::ONE_HUNDRED,
        }
    }

    /// The grade/step held.
    pub fn grade_step(&self) -> GradeStep {
        self.grade_step
    }

    /// The grade held.
    pub fn grade(&self) -> Grade {
        self.grade_step.grade
    }

    /// The step held.
    pub fn step(&self) -> Step {
        self.grade_step.step
    }

    /// The date from which the current step applies.
    pub fn since(&self) -> NaiveDate {
        self.since
    }

    /// The part-time percentage, in (0, 100].
    pub fn part_time_percent(&self) -> Decimal {
        self.part_time_percent
    }

    /// The date of the next step advancement, or `None` at the terminal step.
    ///
    /// Fails with [`EngineError::InvalidDate`] when the anniversary does not
    /// exist (a 29 February `since` shifted into a non-leap year).
    pub fn next_advancement(&self) -> EngineResult<Option<NaiveDate>> {
        match self.step().years_until_next() {
            None => Ok(None),
            Some(years) => shift_years(self.since, years).map(Some),
        }
    }

    /// Evaluates this position as of `date`.
    ///
    /// Every advancement date on or before `date` is crossed. The result keeps
    /// the part-time percentage and takes the last crossed advancement date as
    /// its `since`. When nothing is crossed the position is returned unchanged.
    ///
    /// Fails with [`EngineError::Precondition`] if `date` lies before `since`.
    pub fn at(&self, date: NaiveDate) -> EngineResult<Position> {
        if date < self.since {
            return Err(EngineError::Precondition {
                message: format!(
                    "position {} since {} evaluated at earlier date {}",
                    self.grade_step, self.since, date
                ),
            });
        }

        let mut grade_step = self.grade_step;
        let mut since = self.since;

        while let Some(years) = grade_step.step.years_until_next() {
            let next = shift_years(since, years)?;
            if next > date {
                break;
            }
            let Some(advanced) = grade_step.advanced() else {
                break;
            };
            debug!(from = %grade_step, to = %advanced, on = %next, "Step advancement");
            grade_step = advanced;
            since = next;
        }

        if grade_step == self.grade_step {
            return Ok(self.clone());
        }

        Ok(Position {
            grade_step,
            since,
            part_time_percent: self.part_time_percent,
        })
    }
}

/// Shifts a date forward by whole years, keeping month and day.
fn shift_years(date: NaiveDate, years: u32) -> EngineResult<NaiveDate> {
    i32::try_from(years)
        .ok()
        .and_then(|y| date.year().checked_add(y))
        .and_then(|year| date.with_year(year))
        .ok_or(EngineError::InvalidDate { date, years })
}
