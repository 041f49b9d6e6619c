//! Request types for the cost projection API.
//!
//! This module defines the JSON request structures for the `/calculate` endpoint.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::EmploymentTimeline;
use crate::error::EngineResult;
use crate::models::{Grade, GradeStep, Position, Step};

/// Request body for the `/calculate` endpoint.
///
/// Describes the initial position and the projection window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The position held at the start of the window.
    pub position: PositionRequest,
    /// The first day of the window (inclusive).
    pub start: NaiveDate,
    /// The last day of the window (inclusive).
    pub end: NaiveDate,
}

/// Position information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    /// The pay grade (e.g., "E10").
    pub grade: Grade,
    /// The step within the grade, 1 to 6.
    pub step: Step,
    /// The date the step was reached.
    pub since: NaiveDate,
    /// Part-time percentage in (0, 100]. Defaults to full time.
    #[serde(default = "full_time")]
    pub part_time_percent: Decimal,
}

fn full_time() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl TryFrom<PositionRequest> for Position {
    type Error = crate::error::EngineError;

    fn try_from(req: PositionRequest) -> Result<Self, Self::Error> {
        Position::new(
            GradeStep::new(req.grade, req.step),
            req.since,
            req.part_time_percent,
        )
    }
}

impl CalculationRequest {
    /// Builds the employment timeline this request describes.
    pub fn into_timeline(self) -> EngineResult<EmploymentTimeline> {
        let position = Position::try_from(self.position)?;
        EmploymentTimeline::new(position, self.start, self.end)
    }
}
