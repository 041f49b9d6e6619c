//! Pay grades, steps, and the grade/step lookup key.
//!
//! Both [`Grade`] and [`Step`] are closed enumerations. Each step carries the
//! number of years an employee stays in it before advancing to the next one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pay grade (Entgeltgruppe) of the wage agreement.
///
/// # Example
///
/// ```
/// use abakus::models::Grade;
///
/// assert_eq!("E 10".parse::<Grade>().unwrap(), Grade::E10);
/// assert_eq!("e_13".parse::<Grade>().unwrap(), Grade::E13);
/// assert!("E99".parse::<Grade>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grade {
    /// Entgeltgruppe 10.
    E10,
    /// Entgeltgruppe 13.
    E13,
}

impl Grade {
    /// All known grades in ascending order.
    pub const ALL: [Grade; 2] = [Grade::E10, Grade::E13];

    /// Returns the canonical identifier, e.g. `"E10"`.
    pub fn code(self) -> &'static str {
        match self {
            Grade::E10 => "E10",
            Grade::E13 => "E13",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = String;

    /// Accepts `E10`, `e10`, `E 10` and `E_10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != ' ' && *c != '_')
            .collect::<String>()
            .to_uppercase();

        Grade::ALL
            .into_iter()
            .find(|grade| grade.code() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Grade::ALL.iter().map(|g| g.code()).collect();
                format!("unknown grade '{}' (known: {})", s, known.join(", "))
            })
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.code().to_string()
    }
}

/// A seniority step (Stufe) within a grade.
///
/// Steps advance automatically; [`Step::Six`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    /// Step 1, one year until step 2.
    One,
    /// Step 2, two years until step 3.
    Two,
    /// Step 3, three years until step 4.
    Three,
    /// Step 4, four years until step 5.
    Four,
    /// Step 5, five years until step 6.
    Five,
    /// Step 6, terminal.
    Six,
}

impl Step {
    /// All steps in ascending order.
    pub const ALL: [Step; 6] = [
        Step::One,
        Step::Two,
        Step::Three,
        Step::Four,
        Step::Five,
        Step::Six,
    ];

    /// Returns the step number, 1 to 6.
    pub fn number(self) -> u8 {
        match self {
            Step::One => 1,
            Step::Two => 2,
            Step::Three => 3,
            Step::Four => 4,
            Step::Five => 5,
            Step::Six => 6,
        }
    }

    /// Returns the zero-based position of this step, usable as an array index.
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// Returns the step for a number in 1..=6.
    pub fn from_number(number: u8) -> Option<Step> {
        match number {
            1 => Some(Step::One),
            2 => Some(Step::Two),
            3 => Some(Step::Three),
            4 => Some(Step::Four),
            5 => Some(Step::Five),
            6 => Some(Step::Six),
            _ => None,
        }
    }

    /// Years spent in this step before advancing, or `None` for the terminal step.
    ///
    /// ```
    /// use abakus::models::Step;
    ///
    /// assert_eq!(Step::One.years_until_next(), Some(1));
    /// assert_eq!(Step::Five.years_until_next(), Some(5));
    /// assert_eq!(Step::Six.years_until_next(), None);
    /// ```
    pub fn years_until_next(self) -> Option<u32> {
        match self {
            Step::One => Some(1),
            Step::Two => Some(2),
            Step::Three => Some(3),
            Step::Four => Some(4),
            Step::Five => Some(5),
            Step::Six => None,
        }
    }

    /// The following step, or `None` for the terminal step.
    pub fn successor(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    /// Returns true for the last step.
    pub fn is_terminal(self) -> bool {
        self.years_until_next().is_none()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Step::from_number(value).ok_or_else(|| format!("step must be between 1 and 6, got {}", value))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

/// The (grade, step) pair used to index salary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeStep {
    /// The pay grade.
    pub grade: Grade,
    /// The step within the grade.
    pub step: Step,
}

impl GradeStep {
    /// Creates a new grade/step pair.
    pub fn new(grade: Grade, step: Step) -> Self {
        Self { grade, step }
    }

    /// Returns the pair one step further, or `None` at the terminal step.
    pub fn advanced(self) -> Option<GradeStep> {
        self.step.successor().map(|step| GradeStep::new(self.grade, step))
    }
}

impl fmt::Display for GradeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.grade, self.step)
    }
}
