//! Calculation logic for personnel cost projections.
//!
//! This module contains the month-end employment timeline, the monthly cost
//! calculation, the annual special payment, and the [`CostAggregator`] that
//! combines them into a [`CostProjection`](crate::models::CostProjection).
//!
//! Amounts are rounded half-up to cents at exactly two points: the monthly
//! base salary (in [`SalaryTable::monthly_base`](crate::config::SalaryTable::monthly_base))
//! and each monthly cost or special payment. Intermediate values stay exact.

mod aggregator;
mod bonus;
mod monthly_cost;
mod timeline;

use rust_decimal::{Decimal, RoundingStrategy};

pub use aggregator::CostAggregator;
pub use bonus::{BONUS_MONTH, BonusResult, calculate_bonus};
pub use monthly_cost::{MonthlyCostResult, YearFallback, calculate_monthly_cost};
pub use timeline::{
    BONUS_REFERENCE_MONTHS, EmploymentTimeline, last_day_of_month, last_day_of_next_month,
};

/// Rounds a currency amount to two decimal places, half away from zero.
///
/// The result always carries a scale of two, so `11.7` renders as `11.70`.
///
/// # Examples
///
/// ```
/// use abakus::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("4.875").unwrap()).to_string(), "4.88");
/// assert_eq!(round_currency(Decimal::from_str("3.432").unwrap()).to_string(), "3.43");
/// assert_eq!(round_currency(Decimal::from(12)).to_string(), "12.00");
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
