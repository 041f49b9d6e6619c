//! Tariff data loading and the salary table.
//!
//! Salary data is read once at start-up, either from a YAML tariff directory
//! or from the whitespace-separated text format, into a [`SalaryTable`] that
//! is read-only from then on.
//!
//! # Example
//!
//! ```no_run
//! use abakus::config::TariffLoader;
//!
//! let tariff = TariffLoader::load_dir("./config/tv-l").unwrap();
//! println!("Loaded tariff: {}", tariff.metadata().name);
//! ```

mod loader;
mod salary_table;
mod types;

pub use loader::{TEXT_FIELD_COUNT, TariffLoader};
pub use salary_table::{EMPLOYER_SURCHARGE, SalaryLookup, SalaryTable};
pub use types::{GradeSalaries, SalaryFile, TariffConfig, TariffMetadata};
