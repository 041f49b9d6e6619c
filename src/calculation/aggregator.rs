//! Cost aggregation over an employment timeline.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::SalaryTable;
use crate::error::EngineResult;
use crate::models::{AuditTrace, AuditWarning, CostProjection, MonthlyCostEntry};

use super::{EmploymentTimeline, YearFallback, calculate_bonus, calculate_monthly_cost};

/// Warning code attached to projections that used another year's salary data.
pub const SALARY_YEAR_FALLBACK: &str = "SALARY_YEAR_FALLBACK";

/// Combines a [`SalaryTable`] with an [`EmploymentTimeline`] into monthly costs.
///
/// The aggregator borrows the table and holds no other state, so one instance
/// can serve any number of timelines.
///
/// # Example
///
/// ```
/// use abakus::calculation::{CostAggregator, EmploymentTimeline};
/// use abakus::config::TariffLoader;
/// use abakus::models::{Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
///
/// let table = TariffLoader::parse_text("2019 E10 75 1 2 12 4 5 6").unwrap();
/// let date = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();
/// let position = Position::full_time(GradeStep::new(Grade::E10, Step::Three), date(1, 1));
/// let timeline = EmploymentTimeline::new(position, date(1, 1), date(12, 31)).unwrap();
///
/// let projection = CostAggregator::new(&table).calc(&timeline).unwrap();
/// assert_eq!(projection.entries.len(), 12);
/// assert_eq!(projection.total.to_string(), "187.20");
/// assert_eq!(projection.bonus_total.to_string(), "11.70");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CostAggregator<'a> {
    table: &'a SalaryTable,
}

impl<'a> CostAggregator<'a> {
    /// Creates an aggregator reading from `table`.
    pub fn new(table: &'a SalaryTable) -> Self {
        Self { table }
    }

    /// Returns the salary table this aggregator reads from.
    pub fn table(&self) -> &'a SalaryTable {
        self.table
    }

    /// Projects the cost of every month in `timeline`.
    ///
    /// `total` sums the monthly base costs. The November special payment is
    /// stored on its entry and summed into `bonus_total` instead.
    ///
    /// # Errors
    ///
    /// Fails without a partial result if any salary lookup finds no data for
    /// the grade, or if the special payment has no reference month.
    pub fn calc(&self, timeline: &EmploymentTimeline) -> EngineResult<CostProjection> {
        let snapshots = timeline.month_end_snapshots();
        let mut entries = Vec::with_capacity(snapshots.len());
        let mut audit_trace = AuditTrace::default();
        let mut fallbacks = BTreeSet::new();
        let mut total = Decimal::ZERO;
        let mut bonus_total = Decimal::ZERO;
        let mut step_number: u32 = 1;

        for (month_end, position) in timeline {
            let cost = calculate_monthly_cost(self.table, *month_end, position, step_number)?;
            audit_trace.steps.push(cost.audit_step);
            step_number += 1;
            fallbacks.extend(cost.fallback);

            let bonus = match calculate_bonus(self.table, *month_end, timeline, step_number)? {
                Some(result) => {
                    audit_trace.steps.push(result.audit_step);
                    step_number += 1;
                    fallbacks.extend(result.fallbacks);
                    result.amount
                }
                None => Decimal::ZERO,
            };

            total += cost.base_cost;
            bonus_total += bonus;
            entries.push(MonthlyCostEntry {
                month_end: *month_end,
                position: position.clone(),
                base_cost: cost.base_cost,
                bonus,
            });
        }

        audit_trace.warnings = fallbacks.iter().map(fallback_warning).collect();

        debug!(
            months = entries.len(),
            total = %total,
            bonus_total = %bonus_total,
            warnings = audit_trace.warnings.len(),
            "Cost projection completed"
        );

        Ok(CostProjection {
            total,
            bonus_total,
            entries,
            audit_trace,
        })
    }

    /// Returns the special payment due in the month ending on `date`.
    ///
    /// `None` unless `date` falls in November. Zero if the timeline ends before
    /// 1 December of that year.
    pub fn calc_bonus(
        &self,
        date: NaiveDate,
        timeline: &EmploymentTimeline,
    ) -> EngineResult<Option<Decimal>> {
        Ok(calculate_bonus(self.table, date, timeline, 1)?.map(|result| result.amount))
    }
}

fn fallback_warning(fallback: &YearFallback) -> AuditWarning {
    warn!(
        grade = %fallback.grade,
        requested_year = fallback.requested_year,
        source_year = fallback.source_year,
        "Salary data substituted from another year"
    );
    AuditWarning {
        code: SALARY_YEAR_FALLBACK.to_string(),
        message: format!(
            "No salary data for {} in {}; used {} instead",
            fallback.grade, fallback.requested_year, fallback.source_year
        ),
        severity: "medium".to_string(),
    }
}
