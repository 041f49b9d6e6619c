//! Configuration types for tariff data.
//!
//! This module contains the strongly-typed structures that are deserialized
//! from YAML tariff directories.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::Grade;

use super::SalaryTable;

/// Metadata about the wage agreement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TariffMetadata {
    /// The short code of the agreement (e.g., "TV-L").
    pub code: String,
    /// The human-readable name of the agreement.
    pub name: String,
    /// URL to the published salary tables.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Salary data of one grade in a salary file.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeSalaries {
    /// Special payment percentage, 0 to 100.
    pub bonus_percent: Decimal,
    /// Gross monthly salaries for steps 1 to 6.
    pub steps: Vec<Decimal>,
}

/// One `salaries/<year>.yaml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryFile {
    /// The calendar year the salaries apply to.
    pub year: i32,
    /// Salary data per grade.
    pub grades: BTreeMap<Grade, GradeSalaries>,
}

/// A tariff loaded from a YAML directory: its metadata and salary table.
#[derive(Debug, Clone)]
pub struct TariffConfig {
    metadata: TariffMetadata,
    table: SalaryTable,
}

impl TariffConfig {
    /// Creates a new TariffConfig from its component parts.
    pub fn new(metadata: TariffMetadata, table: SalaryTable) -> Self {
        Self { metadata, table }
    }

    /// Returns the tariff metadata.
    pub fn metadata(&self) -> &TariffMetadata {
        &self.metadata
    }

    /// Returns the salary table.
    pub fn table(&self) -> &SalaryTable {
        &self.table
    }

    /// Consumes the config, keeping only the salary table.
    pub fn into_table(self) -> SalaryTable {
        self.table
    }
}
