//! Core data models for the personnel cost engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employment;
mod grade;
mod position;
mod projection;
mod salary;

pub use employment::EmploymentSpan;
pub use grade::{Grade, GradeStep, Step};
pub use position::Position;
pub use projection::{
    AuditStep, AuditTrace, AuditWarning, CostProjection, MonthlyCostEntry,
};
pub use salary::SalaryRecord;
