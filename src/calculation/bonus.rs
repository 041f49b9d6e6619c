//! Annual special payment (Jahressonderzahlung) calculation.
//!
//! The special payment is due with the November salary. It is paid only if the
//! employment continues into December, and it is prorated by the number of
//! months employed in that year.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::SalaryTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Position};

use super::{EmploymentTimeline, YearFallback, round_currency};

/// The month in which the special payment is due.
pub const BONUS_MONTH: u32 = 11;

/// The result of a special payment calculation.
#[derive(Debug, Clone)]
pub struct BonusResult {
    /// The special payment, rounded half-up to cents.
    pub amount: Decimal,
    /// The positions the payment was averaged over (empty when not payable).
    pub references: Vec<Position>,
    /// Salary lookups that used another year's data.
    pub fallbacks: Vec<YearFallback>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the special payment for the month ending on `month_end`.
///
/// Returns `None` unless `month_end` falls in November. Returns a zero amount
/// if the timeline ends before 1 December of that year. Otherwise, for each
/// reference position (see
/// [`EmploymentTimeline::reference_base_for_bonus`]) the amount
/// `monthly_base * bonus_percent / 100` is computed; their average is scaled by
/// `months_employed / 12`. Only the final amount is rounded.
///
/// # Examples
///
/// ```
/// use abakus::calculation::{EmploymentTimeline, calculate_bonus};
/// use abakus::config::TariffLoader;
/// use abakus::models::{Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
///
/// let table = TariffLoader::parse_text("2019 E10 75 1 2 12 4 5 6").unwrap();
/// let date = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();
/// let position = Position::full_time(GradeStep::new(Grade::E10, Step::Three), date(1, 1));
/// let timeline = EmploymentTimeline::new(position, date(1, 1), date(12, 31)).unwrap();
///
/// let bonus = calculate_bonus(&table, date(11, 30), &timeline, 1).unwrap().unwrap();
/// assert_eq!(bonus.amount.to_string(), "11.70");
/// ```
pub fn calculate_bonus(
    table: &SalaryTable,
    month_end: NaiveDate,
    timeline: &EmploymentTimeline,
    step_number: u32,
) -> EngineResult<Option<BonusResult>> {
    if month_end.month() != BONUS_MONTH {
        return Ok(None);
    }

    let year = month_end.year();
    let december_first =
        NaiveDate::from_ymd_opt(year, 12, 1).ok_or_else(|| EngineError::Precondition {
            message: format!("year {} is outside the supported date range", year),
        })?;

    if timeline.end() < december_first {
        let audit_step = AuditStep {
            step_number,
            rule_id: "special_payment".to_string(),
            rule_name: "Special Payment".to_string(),
            input: serde_json::json!({
                "year": year,
                "employment_end": timeline.end().to_string()
            }),
            output: serde_json::json!({
                "amount": Decimal::ZERO.to_string(),
                "payable": false
            }),
            reasoning: format!(
                "No special payment for {} - employment ends {}, before December",
                year,
                timeline.end()
            ),
        };
        return Ok(Some(BonusResult {
            amount: Decimal::ZERO,
            references: Vec::new(),
            fallbacks: Vec::new(),
            audit_step,
        }));
    }

    let references = timeline.reference_base_for_bonus(year)?;

    let mut fallbacks = BTreeSet::new();
    let mut reference_amounts = Vec::with_capacity(references.len());
    for position in &references {
        let grade_step = position.grade_step();
        let lookup = table.lookup(year, grade_step.grade)?;
        if lookup.is_fallback() {
            fallbacks.insert(YearFallback {
                grade: grade_step.grade,
                requested_year: lookup.requested_year,
                source_year: lookup.source_year,
            });
        }

        let monthly_base = lookup.monthly_base(grade_step.step);
        reference_amounts.push(monthly_base * lookup.bonus_percent() / Decimal::ONE_HUNDRED);
    }

    let months = timeline.months_employed(year);
    let sum: Decimal = reference_amounts.iter().copied().sum();
    let count = Decimal::from(reference_amounts.len());
    // average * months / 12, with a single division so the share stays exact
    let amount = round_currency(sum * Decimal::from(months) / (count * Decimal::from(12)));

    let audit_step = AuditStep {
        step_number,
        rule_id: "special_payment".to_string(),
        rule_name: "Special Payment".to_string(),
        input: serde_json::json!({
            "year": year,
            "references": references
                .iter()
                .map(|p| p.grade_step().to_string())
                .collect::<Vec<_>>(),
            "months_employed": months
        }),
        output: serde_json::json!({
            "reference_amounts": reference_amounts
                .iter()
                .map(|a| a.normalize().to_string())
                .collect::<Vec<_>>(),
            "amount": amount.to_string(),
            "payable": true
        }),
        reasoning: format!(
            "Average of {} reference amount(s) x {}/12 months = {} EUR",
            reference_amounts.len(),
            months,
            amount
        ),
    };

    Ok(Some(BonusResult {
        amount,
        references,
        fallbacks: fallbacks.into_iter().collect(),
        audit_step,
    }))
}
