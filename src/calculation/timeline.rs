//! Employment timelines.
//!
//! An [`EmploymentTimeline`] expands a position over a window of dates into
//! month-end snapshots and selects the positions that form the base of the
//! November special payment.

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmploymentSpan, Position};

/// The months whose positions form the special payment base, in slot order.
pub const BONUS_REFERENCE_MONTHS: [u32; 3] = [7, 8, 9];

/// Returns the last calendar day of the month containing `date`.
///
/// ```
/// use abakus::calculation::last_day_of_month;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2020, 2, 10).unwrap();
/// assert_eq!(last_day_of_month(d), NaiveDate::from_ymd_opt(2020, 2, 29));
/// ```
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = (date.year(), date.month());
    let days = match month {
        4 | 6 | 9 | 11 => 30,
        2 if date.leap_year() => 29,
        2 => 28,
        _ => 31,
    };
    NaiveDate::from_ymd_opt(year, month, days)
}

/// Returns the last calendar day of the month after the one containing `date`.
pub fn last_day_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() < 12 {
        (date.year(), date.month() + 1)
    } else {
        (date.year().checked_add(1)?, 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).and_then(last_day_of_month)
}

/// A position's history over an employment span, one snapshot per month-end.
///
/// Snapshots are materialized eagerly at construction. Each snapshot holds the
/// position valid on that month-end, so step advancements accumulate over the
/// timeline. A trailing partial month (window ending before its month-end) is
/// not included.
///
/// # Example
///
/// ```
/// use abakus::calculation::EmploymentTimeline;
/// use abakus::models::{Grade, GradeStep, Position, Step};
/// use chrono::NaiveDate;
///
/// let date = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();
/// let position = Position::full_time(GradeStep::new(Grade::E10, Step::Three), date(7, 1));
///
/// let timeline = EmploymentTimeline::new(position.clone(), date(7, 1), date(9, 13)).unwrap();
/// assert_eq!(
///     timeline.month_end_snapshots(),
///     &[(date(7, 31), position.clone()), (date(8, 31), position)]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EmploymentTimeline {
    span: EmploymentSpan,
    snapshots: Vec<(NaiveDate, Position)>,
}

impl EmploymentTimeline {
    /// Builds the timeline of `position` from `start` to `end` (both inclusive).
    ///
    /// Fails with [`EngineError::Precondition`] unless
    /// `position.since() <= start <= end`.
    pub fn new(position: Position, start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        Self::from_span(EmploymentSpan::new(position, start, end)?)
    }

    /// Builds the timeline of an already validated span.
    pub fn from_span(span: EmploymentSpan) -> EngineResult<Self> {
        let out_of_range = |date: NaiveDate| EngineError::Precondition {
            message: format!("month end after {} is outside the supported date range", date),
        };

        let mut snapshots = Vec::new();
        let mut current = span.position().clone();
        let mut month_end = last_day_of_month(span.start()).ok_or_else(|| out_of_range(span.start()))?;

        while month_end <= span.end() {
            current = current.at(month_end)?;
            snapshots.push((month_end, current.clone()));
            month_end = last_day_of_next_month(month_end).ok_or_else(|| out_of_range(month_end))?;
        }

        Ok(Self { span, snapshots })
    }

    /// The span this timeline was built from.
    pub fn span(&self) -> &EmploymentSpan {
        &self.span
    }

    /// The initial position.
    pub fn position(&self) -> &Position {
        self.span.position()
    }

    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        self.span.start()
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        self.span.end()
    }

    /// Month-end dates with the position valid on each, in chronological order.
    pub fn month_end_snapshots(&self) -> &[(NaiveDate, Position)] {
        &self.snapshots
    }

    /// Iterates over the month-end snapshots.
    pub fn iter(&self) -> std::slice::Iter<'_, (NaiveDate, Position)> {
        self.snapshots.iter()
    }

    /// Number of month-ends of this timeline falling in `year` (0 to 12).
    pub fn months_employed(&self, year: i32) -> u32 {
        let count = self.snapshots.iter().filter(|(d, _)| d.year() == year).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Selects the positions averaged for the special payment of `year`.
    ///
    /// Looks at the month-ends of `year` before December. The positions of
    /// July, August and September fill one slot each. If none of them is
    /// covered, the latest month-end before December is the only base. Equal
    /// positions in several slots are all returned.
    ///
    /// Fails with [`EngineError::NoEmploymentInYear`] if there is no month-end
    /// before December in `year`.
    pub fn reference_base_for_bonus(&self, year: i32) -> EngineResult<Vec<Position>> {
        let most_recent_first: Vec<&(NaiveDate, Position)> = self
            .snapshots
            .iter()
            .filter(|(d, _)| d.year() == year && d.month() < 12)
            .rev()
            .collect();

        let Some((_, latest)) = most_recent_first.first() else {
            return Err(EngineError::NoEmploymentInYear { year });
        };

        let mut slots: [Option<&Position>; 3] = [None; 3];
        for (month_end, position) in &most_recent_first {
            for (slot, month) in slots.iter_mut().zip(BONUS_REFERENCE_MONTHS) {
                if slot.is_none() && month_end.month() == month {
                    *slot = Some(position);
                }
            }
            if slots.iter().all(Option::is_some) {
                break;
            }
        }

        if slots.iter().all(Option::is_none) {
            return Ok(vec![latest.clone()]);
        }

        Ok(slots.into_iter().flatten().cloned().collect())
    }
}

impl<'a> IntoIterator for &'a EmploymentTimeline {
    type Item = &'a (NaiveDate, Position);
    type IntoIter = std::slice::Iter<'a, (NaiveDate, Position)>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grade, GradeStep, Step};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn e10(step: Step, since: NaiveDate) -> Position {
        Position::full_time(GradeStep::new(Grade::E10, step), since)
    }

    #[test]
    fn test_last_day_of_month_handles_leap_years() {
        assert_eq!(last_day_of_month(date(2019, 2, 1)), Some(date(2019, 2, 28)));
        assert_eq!(last_day_of_month(date(2020, 2, 1)), Some(date(2020, 2, 29)));
        assert_eq!(last_day_of_month(date(1900, 2, 1)), Some(date(1900, 2, 28)));
        assert_eq!(last_day_of_month(date(2000, 2, 1)), Some(date(2000, 2, 29)));
        assert_eq!(last_day_of_month(date(2019, 9, 13)), Some(date(2019, 9, 30)));
        assert_eq!(last_day_of_month(date(2019, 12, 31)), Some(date(2019, 12, 31)));
    }

    #[test]
    fn test_last_day_of_next_month_wraps_year() {
        assert_eq!(last_day_of_next_month(date(2019, 12, 31)), Some(date(2020, 1, 31)));
        assert_eq!(last_day_of_next_month(date(2020, 1, 31)), Some(date(2020, 2, 29)));
    }

    #[test]
    fn test_partial_last_month_excluded() {
        let s = e10(Step::Three, date(2019, 7, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 7, 1), date(2019, 9, 13)).unwrap();
        assert_eq!(
            timeline.month_end_snapshots(),
            &[(date(2019, 7, 31), s.clone()), (date(2019, 8, 31), s)]
        );
    }

    #[test]
    fn test_window_ending_on_month_end_included() {
        let s = e10(Step::Three, date(2019, 7, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 7, 1), date(2019, 8, 31)).unwrap();
        assert_eq!(
            timeline.month_end_snapshots(),
            &[(date(2019, 7, 31), s.clone()), (date(2019, 8, 31), s)]
        );
    }

    #[test]
    fn test_year_change() {
        let s = e10(Step::Three, date(2019, 7, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 12, 1), date(2020, 2, 29)).unwrap();
        assert_eq!(
            timeline.month_end_snapshots(),
            &[
                (date(2019, 12, 31), s.clone()),
                (date(2020, 1, 31), s.clone()),
                (date(2020, 2, 29), s)
            ]
        );
    }

    #[test]
    fn test_window_inside_single_month_is_empty() {
        let s = e10(Step::Three, date(2019, 7, 1));
        let timeline = EmploymentTimeline::new(s, date(2019, 7, 1), date(2019, 7, 30)).unwrap();
        assert!(timeline.month_end_snapshots().is_empty());
        assert_eq!(timeline.months_employed(2019), 0);
    }

    #[test]
    fn test_invalid_arguments() {
        let s = e10(Step::Three, date(2019, 7, 1));

        match EmploymentTimeline::new(s.clone(), date(2019, 5, 1), date(2019, 8, 1)) {
            Err(EngineError::Precondition { message }) => {
                assert!(message.contains("after the start date"), "got: {}", message)
            }
            other => panic!("Expected Precondition, got {:?}", other),
        }
        match EmploymentTimeline::new(s, date(2019, 8, 1), date(2019, 7, 1)) {
            Err(EngineError::Precondition { message }) => {
                assert!(message.contains("after the end date"), "got: {}", message)
            }
            other => panic!("Expected Precondition, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshots_accumulate_advancement() {
        let s = e10(Step::One, date(2019, 8, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 8, 1), date(2020, 9, 30)).unwrap();
        let snapshots = timeline.month_end_snapshots();

        assert_eq!(snapshots.len(), 14);
        assert_eq!(snapshots[0].1, s);
        // July 2020 is still in step 1, August 2020 crosses the anniversary
        assert_eq!(snapshots[11], (date(2020, 7, 31), s));
        assert_eq!(snapshots[12].1.step(), Step::Two);
        assert_eq!(snapshots[12].1.since(), date(2020, 8, 1));
    }

    #[test]
    fn test_months_employed() {
        let s = e10(Step::Three, date(2019, 3, 1));
        let timeline = EmploymentTimeline::new(s, date(2019, 3, 1), date(2021, 4, 30)).unwrap();
        assert_eq!(timeline.months_employed(2019), 10);
        assert_eq!(timeline.months_employed(2020), 12);
        assert_eq!(timeline.months_employed(2021), 4);
        assert_eq!(timeline.months_employed(2022), 0);
    }

    #[test]
    fn test_reference_base_full_year() {
        let s = e10(Step::Three, date(2019, 1, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 1, 1), date(2020, 3, 31)).unwrap();
        assert_eq!(
            timeline.reference_base_for_bonus(2019).unwrap(),
            vec![s.clone(), s.clone(), s]
        );
    }

    #[test]
    fn test_reference_base_only_november() {
        let s = e10(Step::Three, date(2019, 11, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 11, 1), date(2020, 3, 31)).unwrap();
        assert_eq!(timeline.reference_base_for_bonus(2019).unwrap(), vec![s]);
    }

    #[test]
    fn test_reference_base_falls_back_to_latest_month_before_december() {
        // October and November are covered, none of July to September
        let s = e10(Step::Five, date(2014, 11, 1));
        let timeline = EmploymentTimeline::new(s, date(2019, 10, 1), date(2020, 1, 31)).unwrap();
        let refs = timeline.reference_base_for_bonus(2019).unwrap();

        assert_eq!(refs.len(), 1);
        // the step advances on 2019-11-01, so the November position differs
        assert_eq!(refs[0].step(), Step::Six);
    }

    #[test]
    fn test_reference_base_with_step_change_in_august() {
        let s1 = e10(Step::One, date(2019, 8, 1));
        let s2 = e10(Step::Two, date(2020, 8, 1));
        let timeline = EmploymentTimeline::new(s1.clone(), date(2019, 8, 1), date(2021, 3, 31)).unwrap();
        assert_eq!(
            timeline.reference_base_for_bonus(2020).unwrap(),
            vec![s1, s2.clone(), s2]
        );
    }

    #[test]
    fn test_reference_base_partial_summer() {
        // starts in August: only the August and September slots are filled
        let s = e10(Step::Three, date(2019, 8, 1));
        let timeline = EmploymentTimeline::new(s.clone(), date(2019, 8, 1), date(2019, 12, 31)).unwrap();
        assert_eq!(
            timeline.reference_base_for_bonus(2019).unwrap(),
            vec![s.clone(), s]
        );
    }

    #[test]
    fn test_reference_base_without_data_is_an_error() {
        let s = e10(Step::Three, date(2019, 12, 1));
        let timeline = EmploymentTimeline::new(s, date(2019, 12, 1), date(2020, 1, 31)).unwrap();
        assert!(matches!(
            timeline.reference_base_for_bonus(2019),
            Err(EngineError::NoEmploymentInYear { year: 2019 })
        ));
    }

    #[test]
    fn test_iterates_in_order() {
        let s = e10(Step::Three, date(2019, 1, 1));
        let timeline = EmploymentTimeline::new(s, date(2019, 1, 1), date(2019, 6, 30)).unwrap();
        let months: Vec<u32> = (&timeline).into_iter().map(|(d, _)| d.month()).collect();
        assert_eq!(months, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(timeline.iter().count(), 6);
    }
}
