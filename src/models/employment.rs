//! Employment spans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Position;

/// An initial position tracked over a bounded window of dates.
///
/// Both bounds are inclusive. Construction enforces
/// `position.since() <= start <= end`.
///
/// # Example
///
/// ```
/// use abakus::models::{EmploymentSpan, Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
///
/// let since = NaiveDate::from_ymd_opt(2019, 7, 1).unwrap();
/// let position = Position::full_time(GradeStep::new(Grade::E10, Step::Three), since);
///
/// let span = EmploymentSpan::new(position.clone(), since, NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
/// assert!(span.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentSpan {
    position: Position,
    start: NaiveDate,
    end: NaiveDate,
}

impl EmploymentSpan {
    /// Creates a span, checking the ordering of the position's `since`, `start`
    /// and `end`.
    pub fn new(position: Position, start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if position.since() > start {
            return Err(EngineError::Precondition {
                message: format!(
                    "position {} begins {}, after the start date {}",
                    position.grade_step(),
                    position.since(),
                    start
                ),
            });
        }
        if start > end {
            return Err(EngineError::Precondition {
                message: format!("start date {} is after the end date {}", start, end),
            });
        }

        Ok(Self {
            position,
            start,
            end,
        })
    }

    /// The position at the beginning of the span.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// First day of the span.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the span.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, GradeStep, Step};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn position() -> Position {
        Position::full_time(GradeStep::new(Grade::E10, Step::Three), date(2019, 7, 1))
    }

    #[test]
    fn test_valid_span() {
        let span = EmploymentSpan::new(position(), date(2019, 7, 1), date(2019, 7, 1)).unwrap();
        assert_eq!(span.start(), span.end());
        assert_eq!(span.position(), &position());
    }

    #[test]
    fn test_position_starting_after_window_rejected() {
        match EmploymentSpan::new(position(), date(2019, 5, 1), date(2019, 8, 1)) {
            Err(EngineError::Precondition { message }) => {
                assert!(message.contains("after the start date"), "got: {}", message);
            }
            other => panic!("Expected Precondition, got {:?}", other),
        }
    }

    #[test]
    fn test_start_after_end_rejected() {
        match EmploymentSpan::new(position(), date(2019, 8, 1), date(2019, 7, 1)) {
            Err(EngineError::Precondition { message }) => {
                assert!(message.contains("after the end date"), "got: {}", message);
            }
            other => panic!("Expected Precondition, got {:?}", other),
        }
    }
}
