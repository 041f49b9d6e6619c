//! Application state for the cost projection API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::SalaryTable;

/// Shared application state.
///
/// Holds the salary table loaded at start-up. The table is never mutated
/// afterwards; publishing new data means building a new state.
#[derive(Clone)]
pub struct AppState {
    /// The loaded salary table.
    table: Arc<SalaryTable>,
}

impl AppState {
    /// Creates a new application state serving the given salary table.
    pub fn new(table: SalaryTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Returns a reference to the salary table.
    pub fn table(&self) -> &SalaryTable {
        &self.table
    }
}
