//! Monthly cost calculation.
//!
//! This module computes the cost of one month of employment: the monthly base
//! salary including the employer surcharge, scaled by the part-time percentage.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::SalaryTable;
use crate::error::EngineResult;
use crate::models::{AuditStep, Grade, Position};

use super::round_currency;

/// A salary lookup that used another year's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearFallback {
    /// The grade looked up.
    pub grade: Grade,
    /// The year asked for.
    pub requested_year: i32,
    /// The year whose data was used.
    pub source_year: i32,
}

/// The result of a monthly cost calculation, including the amount and audit step.
#[derive(Debug, Clone)]
pub struct MonthlyCostResult {
    /// The cost of the month, rounded half-up to cents.
    pub base_cost: Decimal,
    /// Set when the salary data of another year was used.
    pub fallback: Option<YearFallback>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the cost of the month ending on `month_end` for `position`.
///
/// `base_cost = part_time_percent / 100 * monthly_base(year, grade_step)`,
/// rounded half-up to two decimals, where `monthly_base` already includes the
/// employer surcharge.
///
/// # Errors
///
/// Returns [`EngineError::NoSalaryData`](crate::error::EngineError::NoSalaryData)
/// if the table has no data for the position's grade.
///
/// # Examples
///
/// ```
/// use abakus::calculation::calculate_monthly_cost;
/// use abakus::config::TariffLoader;
/// use abakus::models::{Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let table = TariffLoader::parse_text("2019 E10 75 1 2 8 4 5 6").unwrap();
/// let month_end = NaiveDate::from_ymd_opt(2019, 7, 31).unwrap();
/// let position = Position::new(
///     GradeStep::new(Grade::E10, Step::Three),
///     NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
///     Decimal::from(40),
/// )
/// .unwrap();
///
/// let result = calculate_monthly_cost(&table, month_end, &position, 1).unwrap();
/// assert_eq!(result.base_cost.to_string(), "4.16");
/// ```
pub fn calculate_monthly_cost(
    table: &SalaryTable,
    month_end: NaiveDate,
    position: &Position,
    step_number: u32,
) -> EngineResult<MonthlyCostResult> {
    let year = month_end.year();
    let lookup = table.lookup(year, position.grade())?;
    let monthly_base = lookup.monthly_base(position.step());
    let base_cost =
        round_currency(position.part_time_percent() / Decimal::ONE_HUNDRED * monthly_base);

    let fallback = lookup.is_fallback().then_some(YearFallback {
        grade: position.grade(),
        requested_year: lookup.requested_year,
        source_year: lookup.source_year,
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "monthly_cost".to_string(),
        rule_name: "Monthly Cost".to_string(),
        input: serde_json::json!({
            "month_end": month_end.to_string(),
            "grade_step": position.grade_step().to_string(),
            "part_time_percent": position.part_time_percent().to_string(),
            "salary_year": lookup.source_year
        }),
        output: serde_json::json!({
            "monthly_base": monthly_base.to_string(),
            "base_cost": base_cost.to_string()
        }),
        reasoning: format!(
            "{} in {}: {}% x {} EUR = {} EUR",
            position.grade_step(),
            month_end.format("%Y-%m"),
            position.part_time_percent().normalize(),
            monthly_base,
            base_cost
        ),
    };

    Ok(MonthlyCostResult {
        base_cost,
        fallback,
        audit_step,
    })
}
