//! Personnel cost projection for step-based collective wage agreements
//!
//! This crate projects the monthly employer cost of a position over a date
//! window: step advancement by seniority, salary lookup with employer
//! surcharge, part-time scaling, and the annual special payment.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
