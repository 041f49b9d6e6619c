//! The salary table: wage data per year and grade.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculation::round_currency;
use crate::error::{EngineError, EngineResult};
use crate::models::{Grade, GradeStep, SalaryRecord, Step};

/// Employer overhead applied on top of the gross base salary (30%).
pub const EMPLOYER_SURCHARGE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// The outcome of resolving a (year, grade) pair against the table.
///
/// When the requested year has no record the table substitutes the record of
/// the largest year on file for that grade; [`SalaryLookup::is_fallback`]
/// reports that substitution.
#[derive(Debug, Clone, Copy)]
pub struct SalaryLookup<'a> {
    /// The year that was asked for.
    pub requested_year: i32,
    /// The year whose record was used.
    pub source_year: i32,
    /// The record that was used.
    pub record: &'a SalaryRecord,
}

impl SalaryLookup<'_> {
    /// Returns true if another year's data stood in for the requested year.
    pub fn is_fallback(&self) -> bool {
        self.requested_year != self.source_year
    }

    /// Monthly base salary for `step` including the employer surcharge,
    /// rounded half-up to cents.
    pub fn monthly_base(&self, step: Step) -> Decimal {
        round_currency(self.record.base(step) * (Decimal::ONE + EMPLOYER_SURCHARGE))
    }

    /// The special payment percentage of the resolved record.
    pub fn bonus_percent(&self) -> Decimal {
        self.record.bonus_percent()
    }
}

/// All salary records, keyed by grade and year.
///
/// The table is populated once and only read afterwards, so a shared
/// reference can serve any number of concurrent calculations.
///
/// # Example
///
/// ```
/// use abakus::config::SalaryTable;
/// use abakus::models::{Grade, GradeStep, SalaryRecord, Step};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let mut table = SalaryTable::new();
/// let record = SalaryRecord::new(
///     Decimal::from(75),
///     ["1.00", "2.00", "4.00", "5.00", "6.00", "7.00"].map(|s| Decimal::from_str(s).unwrap()),
/// )
/// .unwrap();
/// table.add_salary(2012, Grade::E10, record).unwrap();
///
/// // 2099 is not on file, so the 2012 data is used
/// let base = table.monthly_base(2099, GradeStep::new(Grade::E10, Step::Three)).unwrap();
/// assert_eq!(base, Decimal::from_str("5.20").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SalaryTable {
    records: BTreeMap<(Grade, i32), SalaryRecord>,
}

impl SalaryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the record for `year` and `grade`.
    ///
    /// Fails with [`EngineError::DuplicateSalaryRecord`] if one is already present.
    pub fn add_salary(&mut self, year: i32, grade: Grade, record: SalaryRecord) -> EngineResult<()> {
        if self.records.contains_key(&(grade, year)) {
            return Err(EngineError::DuplicateSalaryRecord { year, grade });
        }
        self.records.insert((grade, year), record);
        Ok(())
    }

    /// Resolves the record for `year` and `grade`, falling back to the largest
    /// year on file for the grade.
    ///
    /// Fails with [`EngineError::NoSalaryData`] if the grade has no records.
    pub fn lookup(&self, year: i32, grade: Grade) -> EngineResult<SalaryLookup<'_>> {
        if let Some(record) = self.records.get(&(grade, year)) {
            return Ok(SalaryLookup {
                requested_year: year,
                source_year: year,
                record,
            });
        }

        let ((_, source_year), record) = self
            .records
            .range((grade, i32::MIN)..=(grade, i32::MAX))
            .next_back()
            .ok_or(EngineError::NoSalaryData { grade })?;

        debug!(%grade, requested_year = year, source_year, "Salary year fallback");

        Ok(SalaryLookup {
            requested_year: year,
            source_year: *source_year,
            record,
        })
    }

    /// Monthly base salary including the employer surcharge, rounded half-up
    /// to cents.
    pub fn monthly_base(&self, year: i32, grade_step: GradeStep) -> EngineResult<Decimal> {
        Ok(self.lookup(year, grade_step.grade)?.monthly_base(grade_step.step))
    }

    /// The special payment percentage for the grade in `year`.
    pub fn bonus_percent(&self, year: i32, grade_step: GradeStep) -> EngineResult<Decimal> {
        Ok(self.lookup(year, grade_step.grade)?.bonus_percent())
    }

    /// Years with at least one record, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.keys().map(|(_, year)| *year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Grades with at least one record, ascending.
    pub fn grades(&self) -> Vec<Grade> {
        let mut grades: Vec<Grade> = self.records.keys().map(|(grade, _)| *grade).collect();
        grades.dedup();
        grades
    }

    /// Number of (year, grade) records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(bonus: &str, step3: &str) -> SalaryRecord {
        SalaryRecord::new(
            dec(bonus),
            [dec("1.00"), dec("2.00"), dec(step3), dec("5.00"), dec("6.00"), dec("7.00")],
        )
        .unwrap()
    }

    fn e10_3() -> GradeStep {
        GradeStep::new(Grade::E10, Step::Three)
    }

    #[test]
    fn test_surcharge_is_thirty_percent() {
        assert_eq!(EMPLOYER_SURCHARGE, dec("0.30"));
    }

    #[test]
    fn test_monthly_base_applies_surcharge() {
        let mut table = SalaryTable::new();
        table.add_salary(2019, Grade::E10, record("75", "8.00")).unwrap();

        assert_eq!(table.monthly_base(2019, e10_3()).unwrap(), dec("10.40"));
        assert_eq!(table.bonus_percent(2019, e10_3()).unwrap(), dec("75"));
    }

    #[test]
    fn test_monthly_base_rounds_half_up() {
        let mut table = SalaryTable::new();
        // 0.05 * 1.3 = 0.065 -> 0.07
        table.add_salary(2019, Grade::E10, record("75", "0.05")).unwrap();
        assert_eq!(table.monthly_base(2019, e10_3()).unwrap(), dec("0.07"));
    }

    #[test]
    fn test_duplicate_record_rejected() {
        let mut table = SalaryTable::new();
        table.add_salary(2019, Grade::E10, record("75", "8.00")).unwrap();
        let result = table.add_salary(2019, Grade::E10, record("80", "9.00"));

        match result {
            Err(EngineError::DuplicateSalaryRecord { year, grade }) => {
                assert_eq!(year, 2019);
                assert_eq!(grade, Grade::E10);
            }
            other => panic!("Expected DuplicateSalaryRecord, got {:?}", other),
        }
        // the first record is kept
        assert_eq!(table.monthly_base(2019, e10_3()).unwrap(), dec("10.40"));
    }

    #[test]
    fn test_fallback_to_only_year() {
        let mut table = SalaryTable::new();
        table.add_salary(2012, Grade::E10, record("75", "4.00")).unwrap();

        let lookup = table.lookup(2099, Grade::E10).unwrap();
        assert!(lookup.is_fallback());
        assert_eq!(lookup.source_year, 2012);
        assert_eq!(table.monthly_base(2099, e10_3()).unwrap(), dec("5.20"));
    }

    #[test]
    fn test_fallback_uses_largest_year_even_when_later_than_request() {
        let mut table = SalaryTable::new();
        table.add_salary(2015, Grade::E10, record("60", "4.00")).unwrap();
        table.add_salary(2021, Grade::E10, record("70", "6.00")).unwrap();
        table.add_salary(2019, Grade::E10, record("65", "5.00")).unwrap();

        let lookup = table.lookup(2016, Grade::E10).unwrap();
        assert_eq!(lookup.source_year, 2021);
        assert_eq!(table.bonus_percent(2016, e10_3()).unwrap(), dec("70"));
    }

    #[test]
    fn test_fallback_ignores_other_grades() {
        let mut table = SalaryTable::new();
        table.add_salary(2012, Grade::E10, record("75", "4.00")).unwrap();
        table.add_salary(2030, Grade::E13, record("50", "9.00")).unwrap();

        assert_eq!(table.lookup(2020, Grade::E10).unwrap().source_year, 2012);
    }

    #[test]
    fn test_lookup_amounts_come_from_resolved_record() {
        let mut table = SalaryTable::new();
        table.add_salary(2015, Grade::E10, record("60", "4.00")).unwrap();
        table.add_salary(2019, Grade::E10, record("65", "5.00")).unwrap();

        let lookup = table.lookup(2030, Grade::E10).unwrap();
        assert_eq!(lookup.source_year, 2019);
        assert_eq!(lookup.monthly_base(Step::Three), dec("6.50"));
        assert_eq!(lookup.bonus_percent(), dec("65"));
        assert_eq!(
            lookup.monthly_base(Step::Three),
            table.monthly_base(2030, e10_3()).unwrap()
        );
    }

    #[test]
    fn test_exact_year_is_not_fallback() {
        let mut table = SalaryTable::new();
        table.add_salary(2019, Grade::E10, record("75", "8.00")).unwrap();
        assert!(!table.lookup(2019, Grade::E10).unwrap().is_fallback());
    }

    #[test]
    fn test_grade_without_data_is_an_error() {
        let mut table = SalaryTable::new();
        table.add_salary(2019, Grade::E10, record("75", "8.00")).unwrap();

        let result = table.monthly_base(2019, GradeStep::new(Grade::E13, Step::One));
        assert!(matches!(
            result,
            Err(EngineError::NoSalaryData { grade: Grade::E13 })
        ));
    }

    #[test]
    fn test_years_and_grades() {
        let mut table = SalaryTable::new();
        assert!(table.is_empty());
        table.add_salary(2020, Grade::E13, record("50", "9.00")).unwrap();
        table.add_salary(2019, Grade::E10, record("75", "8.00")).unwrap();
        table.add_salary(2020, Grade::E10, record("75", "8.50")).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.years(), vec![2019, 2020]);
        assert_eq!(table.grades(), vec![Grade::E10, Grade::E13]);
    }
}
