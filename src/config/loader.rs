//! Tariff loading functionality.
//!
//! This module provides the [`TariffLoader`] type for populating a
//! [`SalaryTable`] from a YAML tariff directory or from the line-oriented
//! text tariff format.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult, FormatError};
use crate::models::{Grade, SalaryRecord};

use super::SalaryTable;
use super::types::{SalaryFile, TariffConfig, TariffMetadata};

/// Number of whitespace-separated fields in a text tariff row:
/// year, grade, bonus percentage and six step salaries.
pub const TEXT_FIELD_COUNT: usize = 3 + 6;

/// Loads tariff data into a [`SalaryTable`].
///
/// # Directory Structure
///
/// A YAML tariff directory has the following structure:
/// ```text
/// config/tv-l/
/// ├── tariff.yaml         # Tariff metadata
/// └── salaries/
///     └── 2019.yaml       # Salaries per grade for one year
/// ```
///
/// # Text Format
///
/// One row per line, whitespace-separated:
/// ```text
/// # year grade bonus%  step1   step2   step3   step4   step5   step6
/// 2019   E10   80,69   3441,69 3748,51 3898,79 4039,28 4542,97 4661,52
/// ```
/// Blank lines and lines starting with `#` are skipped. Amounts may be written
/// plainly (`3441.69`) or in German notation (`3.441,69`).
///
/// # Example
///
/// ```
/// use abakus::config::TariffLoader;
/// use abakus::models::{Grade, GradeStep, Step};
///
/// let table = TariffLoader::parse_text("2019 E10 75 1 2 8 4 5 6\n").unwrap();
/// let base = table.monthly_base(2019, GradeStep::new(Grade::E10, Step::Three)).unwrap();
/// assert_eq!(base.to_string(), "10.40");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TariffLoader;

impl TariffLoader {
    /// Loads a salary table from a YAML directory or a text tariff file,
    /// depending on what `path` points to.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<SalaryTable> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(Self::load_dir(path)?.into_table())
        } else {
            Self::load_text_file(path)
        }
    }

    /// Loads a YAML tariff directory.
    ///
    /// Returns an error if:
    /// - `tariff.yaml` or the `salaries` directory is missing
    /// - any file contains invalid YAML
    /// - any grade entry has a step count other than six or out-of-range values
    /// - two files carry the same year for a grade
    pub fn load_dir<P: AsRef<Path>>(path: P) -> EngineResult<TariffConfig> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<TariffMetadata>(&path.join("tariff.yaml"))?;

        let salaries_dir = path.join("salaries");
        let files = Self::load_salary_files(&salaries_dir)?;

        let mut table = SalaryTable::new();
        let mut errors = Vec::new();

        for (file_name, file) in files {
            for (grade, salaries) in file.grades {
                let record = <[Decimal; 6]>::try_from(salaries.steps.as_slice())
                    .map_err(|_| {
                        format!(
                            "{}: grade {} has {} steps, expected 6",
                            file_name,
                            grade,
                            salaries.steps.len()
                        )
                    })
                    .and_then(|bases| {
                        SalaryRecord::new(salaries.bonus_percent, bases)
                            .map_err(|e| format!("{}: grade {}: {}", file_name, grade, e))
                    })
                    .and_then(|record| {
                        table
                            .add_salary(file.year, grade, record)
                            .map_err(|e| format!("{}: {}", file_name, e))
                    });

                if let Err(message) = record {
                    errors.push(FormatError::new(0, message));
                }
            }
        }

        if !errors.is_empty() {
            return Err(EngineError::TariffFormat { errors });
        }

        info!(
            tariff = %metadata.code,
            records = table.len(),
            years = ?table.years(),
            "Loaded tariff directory"
        );

        Ok(TariffConfig::new(metadata, table))
    }

    /// Loads a text tariff file.
    pub fn load_text_file<P: AsRef<Path>>(path: P) -> EngineResult<SalaryTable> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path.display().to_string(),
        })?;

        let table = Self::parse_text(&content)?;
        info!(path = %path.display(), records = table.len(), "Loaded text tariff");
        Ok(table)
    }

    /// Parses text tariff rows.
    ///
    /// Every malformed row is recorded with its line number and skipped, and
    /// scanning continues to the end of the input. If anything was recorded,
    /// the complete list is returned as [`EngineError::TariffFormat`] and no
    /// table is produced.
    pub fn parse_text(input: &str) -> EngineResult<SalaryTable> {
        let mut table = SalaryTable::new();
        let mut errors = Vec::new();

        for (idx, raw_line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let fields: Vec<&str> = raw_line.split_whitespace().collect();

            if fields.first().is_none_or(|first| first.starts_with('#')) {
                continue;
            }

            if fields.len() != TEXT_FIELD_COUNT {
                errors.push(FormatError::new(
                    line_no,
                    format!(
                        "expected {} fields, found {}: {:?}",
                        TEXT_FIELD_COUNT,
                        fields.len(),
                        fields
                    ),
                ));
                continue;
            }

            let Some((year, grade, record)) = parse_row(line_no, &fields, &mut errors) else {
                continue;
            };

            if let Err(e) = table.add_salary(year, grade, record) {
                errors.push(FormatError::new(line_no, e.to_string()));
            }
        }

        if !errors.is_empty() {
            debug!(count = errors.len(), "Text tariff rejected");
            return Err(EngineError::TariffFormat { errors });
        }

        Ok(table)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all salary files from the salaries directory, ordered by file name.
    fn load_salary_files(salaries_dir: &Path) -> EngineResult<Vec<(String, SalaryFile)>> {
        let dir_str = salaries_dir.display().to_string();

        let entries = fs::read_dir(salaries_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no salary files found)", dir_str),
            });
        }

        paths.sort();
        paths
            .into_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Self::load_yaml::<SalaryFile>(&path).map(|file| (name, file))
            })
            .collect()
    }
}

/// Parses the nine fields of a row, recording one error per bad field.
fn parse_row(
    line_no: usize,
    fields: &[&str],
    errors: &mut Vec<FormatError>,
) -> Option<(i32, Grade, SalaryRecord)> {
    let year = check_field(
        errors,
        line_no,
        fields,
        0,
        fields[0].parse::<i32>().map_err(|_| "invalid year".to_string()),
    );
    let grade = check_field(errors, line_no, fields, 1, Grade::from_str(fields[1]));
    let bonus_percent = check_field(errors, line_no, fields, 2, parse_percent(fields[2]));
    let bases: Vec<Option<Decimal>> = (3..TEXT_FIELD_COUNT)
        .map(|idx| check_field(errors, line_no, fields, idx, parse_salary(fields[idx])))
        .collect();

    let (year, grade, bonus_percent) = (year?, grade?, bonus_percent?);
    let bases: Vec<Decimal> = bases.into_iter().collect::<Option<_>>()?;
    let bases = <[Decimal; 6]>::try_from(bases).ok()?;

    match SalaryRecord::new(bonus_percent, bases) {
        Ok(record) => Some((year, grade, record)),
        Err(e) => {
            errors.push(FormatError::new(line_no, e.to_string()));
            None
        }
    }
}

fn check_field<T>(
    errors: &mut Vec<FormatError>,
    line_no: usize,
    fields: &[&str],
    idx: usize,
    parsed: Result<T, String>,
) -> Option<T> {
    parsed
        .map_err(|message| {
            errors.push(FormatError::new(
                line_no,
                format!("field {}: {} '{}'", idx + 1, message, fields[idx]),
            ))
        })
        .ok()
}

/// Parses a plain (`1234.56`) or German (`1.234,56`, `1.234`) decimal.
///
/// Without a comma, dots that each separate a group of exactly three digits
/// are thousands separators, so `3.441` is 3441 while `3441.69` and `75.5`
/// keep their dot as the decimal point.
fn parse_amount(s: &str) -> Result<Decimal, String> {
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else if has_thousands_groups(s) {
        s.replace('.', "")
    } else {
        s.to_string()
    };
    Decimal::from_str(&normalized).map_err(|_| "not a number".to_string())
}

/// Returns true for `1.234`, `-12.345.678` and the like.
fn has_thousands_groups(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());

    match digits.split_once('.') {
        Some((lead, rest)) => {
            (1..=3).contains(&lead.len())
                && all_digits(lead)
                && rest.split('.').all(|group| group.len() == 3 && all_digits(group))
        }
        None => false,
    }
}

fn parse_percent(s: &str) -> Result<Decimal, String> {
    let value = parse_amount(s).map_err(|_| "invalid bonus percentage".to_string())?;
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("bonus percentage outside [0, 100]".to_string());
    }
    Ok(value)
}

fn parse_salary(s: &str) -> Result<Decimal, String> {
    let value = parse_amount(s).map_err(|_| "invalid gross salary".to_string())?;
    if value < Decimal::ZERO {
        return Err("negative gross salary".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradeStep, Step};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config_path() -> &'static str {
        "./config/tv-l"
    }

    fn format_errors(result: EngineResult<SalaryTable>) -> Vec<FormatError> {
        match result {
            Err(EngineError::TariffFormat { errors }) => errors,
            other => panic!("Expected TariffFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_text_with_comments_and_blank_lines() {
        let input = "\
# year grade bonus step1..step6
2019 E10 75 1 2 8 4 5 6

2019 E13 51,78 4.074,37 4.407,26 4.644,49 5.100,55 5.731,40 5.995,25
";
        let table = TariffLoader::parse_text(input).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table
                .bonus_percent(2019, GradeStep::new(Grade::E13, Step::One))
                .unwrap(),
            dec("51.78")
        );
        assert_eq!(
            table
                .monthly_base(2019, GradeStep::new(Grade::E13, Step::One))
                .unwrap(),
            dec("5296.68")
        );
    }

    #[test]
    fn test_wrong_field_count_reported_with_line_number() {
        let input = "2019 E10 75 1 2 3\n2019 E13 50 1 2 3 4 5 6\n";
        let errors = format_errors(TariffLoader::parse_text(input));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 1);
        assert!(errors[0].message.contains("expected 9 fields, found 6"));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let input = "\
20x9 E10 75 1 2 3 4 5 6
2019 E99 75 1 2 3 4 5 6
2019 E10 101 1 2 3 4 5 6
2019 E13 75 1 2 -3 4 5 abc
2019 E10 75 1 2 3 4 5 6
";
        let errors = format_errors(TariffLoader::parse_text(input));
        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 4]);
        assert!(errors[0].message.contains("field 1: invalid year"));
        assert!(errors[1].message.contains("unknown grade 'E99'"));
        assert!(errors[2].message.contains("field 3"));
        assert!(errors[3].message.contains("field 6: negative gross salary"));
        assert!(errors[4].message.contains("field 9: invalid gross salary 'abc'"));
    }

    #[test]
    fn test_duplicate_rows_are_rejected() {
        let input = "2019 E10 75 1 2 3 4 5 6\n2019 E10 80 1 2 3 4 5 6\n";
        let errors = format_errors(TariffLoader::parse_text(input));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].message.contains("Duplicate salary record"));
    }

    #[test]
    fn test_parse_amount_notations() {
        assert_eq!(parse_amount("3441.69").unwrap(), dec("3441.69"));
        assert_eq!(parse_amount("3.441,69").unwrap(), dec("3441.69"));
        assert_eq!(parse_amount("75,5").unwrap(), dec("75.5"));
        assert_eq!(parse_amount("75.5").unwrap(), dec("75.5"));
        assert!(parse_amount("drei").is_err());
    }

    #[test]
    fn test_parse_amount_german_whole_numbers() {
        assert_eq!(parse_amount("3.441").unwrap(), dec("3441"));
        assert_eq!(parse_amount("4.000").unwrap(), dec("4000"));
        assert_eq!(parse_amount("1.234.567").unwrap(), dec("1234567"));
        // groups other than three digits keep the dot as decimal point
        assert_eq!(parse_amount("3441.6").unwrap(), dec("3441.6"));
        assert_eq!(parse_amount("3.4410").unwrap(), dec("3.4410"));
        assert_eq!(parse_amount("1234.567").unwrap(), dec("1234.567"));
    }

    #[test]
    fn test_german_whole_amount_matches_decimal_comma_form() {
        let whole = TariffLoader::parse_text("2019 E10 80 3.441 1 1 1 1 1").unwrap();
        let with_cents = TariffLoader::parse_text("2019 E10 80 3.441,00 1 1 1 1 1").unwrap();
        let gs = GradeStep::new(Grade::E10, Step::One);

        assert_eq!(whole.monthly_base(2019, gs).unwrap(), dec("4473.30"));
        assert_eq!(
            whole.monthly_base(2019, gs).unwrap(),
            with_cents.monthly_base(2019, gs).unwrap()
        );
    }

    #[test]
    fn test_load_valid_directory() {
        let config = TariffLoader::load_dir(config_path()).unwrap();
        assert_eq!(config.metadata().code, "TV-L");
        assert_eq!(config.table().years(), vec![2019, 2020, 2021]);
        assert_eq!(config.table().grades(), vec![Grade::E10, Grade::E13]);
    }

    #[test]
    fn test_directory_and_text_file_agree() {
        let from_dir = TariffLoader::load(config_path()).unwrap();
        let from_text = TariffLoader::load("./config/tv-l.txt").unwrap();

        for year in from_dir.years() {
            for grade in from_dir.grades() {
                for step in Step::ALL {
                    let gs = GradeStep::new(grade, step);
                    assert_eq!(
                        from_dir.monthly_base(year, gs).unwrap(),
                        from_text.monthly_base(year, gs).unwrap(),
                        "{} {}",
                        year,
                        gs
                    );
                    assert_eq!(
                        from_dir.bonus_percent(year, gs).unwrap(),
                        from_text.bonus_percent(year, gs).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = TariffLoader::load_dir("/nonexistent/path");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("tariff.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    fn fixture(name: &str) -> String {
        format!("./tests/fixtures/tariffs/{}", name)
    }

    fn dir_format_errors(name: &str) -> Vec<FormatError> {
        match TariffLoader::load_dir(fixture(name)) {
            Err(EngineError::TariffFormat { errors }) => errors,
            other => panic!("Expected TariffFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_with_wrong_step_count() {
        let errors = dir_format_errors("bad-steps");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "2019.yaml: grade E10 has 5 steps, expected 6"
        );
    }

    #[test]
    fn test_directory_with_out_of_range_values_reports_each_grade() {
        let errors = dir_format_errors("bad-values");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.starts_with("2019.yaml: grade E10:"), "{}", errors[0].message);
        assert!(errors[0].message.contains("bonus percentage 100.50 is outside [0, 100]"));
        assert!(errors[1].message.starts_with("2019.yaml: grade E13:"), "{}", errors[1].message);
        assert!(errors[1].message.contains("salary -4644.49 for step 3 is negative"));
    }

    #[test]
    fn test_directory_with_same_year_in_two_files() {
        let errors = dir_format_errors("duplicate-year");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "2019b.yaml: Duplicate salary record for grade E10 in 2019"
        );
    }

    #[test]
    fn test_directory_with_invalid_yaml() {
        match TariffLoader::load_dir(fixture("invalid-yaml")) {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert!(path.ends_with("2019.yaml"), "{}", path);
                assert!(!message.is_empty());
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_dispatches_directory_errors() {
        assert!(matches!(
            TariffLoader::load(fixture("bad-steps")),
            Err(EngineError::TariffFormat { .. })
        ));
    }

    #[test]
    fn test_load_missing_text_file_returns_error() {
        assert!(matches!(
            TariffLoader::load("/nonexistent/tariff.txt"),
            Err(EngineError::ConfigNotFound { .. })
        ));
    }
}
