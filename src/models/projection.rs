//! Cost projection result models.
//!
//! This module contains the [`CostProjection`] type and its associated structures
//! that capture all outputs of a cost calculation, including monthly entries,
//! totals, warnings about substituted salary data, and audit traces.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Position;

/// The cost of one month of employment.
///
/// Entries are produced by [`CostAggregator`](crate::calculation::CostAggregator)
/// only, one per month-end in the projected window.
///
/// # Example
///
/// ```
/// use abakus::models::{Grade, GradeStep, MonthlyCostEntry, Position, Step};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let month_end = NaiveDate::from_ymd_opt(2019, 7, 31).unwrap();
/// let entry = MonthlyCostEntry {
///     month_end,
///     position: Position::full_time(GradeStep::new(Grade::E10, Step::Three), month_end),
///     base_cost: Decimal::from_str("5068.43").unwrap(),
///     bonus: Decimal::ZERO,
/// };
/// assert_eq!(entry.month_end, month_end);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCostEntry {
    /// The last day of the month this entry covers.
    pub month_end: NaiveDate,
    /// The position valid on `month_end`.
    pub position: Position,
    /// Base salary plus employer surcharge, scaled by the part-time percentage.
    pub base_cost: Decimal,
    /// The special payment due this month, zero outside November.
    pub bonus: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate degraded results that did not prevent the calculation,
/// such as salary data substituted from another year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The result of projecting costs over an employment timeline.
///
/// `total` sums the monthly base costs only. November special payments are
/// recorded on their entries and summed separately into `bonus_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostProjection {
    /// Sum of `base_cost` over all entries.
    pub total: Decimal,
    /// Sum of `bonus` over all entries.
    pub bonus_total: Decimal,
    /// One entry per month-end, in chronological order.
    pub entries: Vec<MonthlyCostEntry>,
    /// Calculation decisions and degraded-lookup warnings.
    pub audit_trace: AuditTrace,
}

impl CostProjection {
    /// Returns true if any salary lookup had to fall back to another year.
    pub fn is_degraded(&self) -> bool {
        !self.audit_trace.warnings.is_empty()
    }

    /// `total` plus `bonus_total`.
    pub fn grand_total(&self) -> Decimal {
        self.total + self.bonus_total
    }
}
