//! Salary data for one grade in one year.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Step;

/// Gross monthly base salaries per step plus the bonus percentage, for one
/// (year, grade) combination.
///
/// Amounts exclude the employer surcharge; see
/// [`SalaryTable::monthly_base`](crate::config::SalaryTable::monthly_base).
///
/// # Example
///
/// ```
/// use abakus::models::{SalaryRecord, Step};
/// use rust_decimal::Decimal;
///
/// let record = SalaryRecord::new(
///     Decimal::new(75, 0),
///     [1, 2, 3, 4, 5, 6].map(|n| Decimal::new(n * 100_000, 2)),
/// )
/// .unwrap();
/// assert_eq!(record.base(Step::Three), Decimal::new(300_000, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SalaryRecordFields")]
pub struct SalaryRecord {
    bonus_percent: Decimal,
    base_by_step: [Decimal; 6],
}

#[derive(Deserialize)]
struct SalaryRecordFields {
    bonus_percent: Decimal,
    base_by_step: [Decimal; 6],
}

impl TryFrom<SalaryRecordFields> for SalaryRecord {
    type Error = EngineError;

    fn try_from(fields: SalaryRecordFields) -> Result<Self, Self::Error> {
        SalaryRecord::new(fields.bonus_percent, fields.base_by_step)
    }
}

impl SalaryRecord {
    /// Creates a record, checking that the bonus percentage lies in [0, 100]
    /// and that no salary is negative.
    pub fn new(bonus_percent: Decimal, base_by_step: [Decimal; 6]) -> EngineResult<Self> {
        if bonus_percent < Decimal::ZERO || bonus_percent > Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidSalaryRecord {
                message: format!("bonus percentage {} is outside [0, 100]", bonus_percent),
            });
        }

        if let Some((idx, amount)) = base_by_step
            .iter()
            .enumerate()
            .find(|(_, amount)| **amount < Decimal::ZERO)
        {
            return Err(EngineError::InvalidSalaryRecord {
                message: format!("salary {} for step {} is negative", amount, idx + 1),
            });
        }

        Ok(Self {
            bonus_percent,
            base_by_step,
        })
    }

    /// Gross monthly base salary for a step.
    pub fn base(&self, step: Step) -> Decimal {
        self.base_by_step[step.index()]
    }

    /// The special payment percentage for this year and grade.
    pub fn bonus_percent(&self) -> Decimal {
        self.bonus_percent
    }

    /// All six base salaries in step order.
    pub fn bases(&self) -> &[Decimal; 6] {
        &self.base_by_step
    }
}
