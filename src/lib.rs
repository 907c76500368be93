//! Salary tax engine for Indian income tax
//!
//! This crate computes gross-to-net salary breakdowns under the old and new
//! income-tax regimes, applying slab rates, the section 87A rebate,
//! surcharge with marginal relief, cess, exemptions, chapter VI-A deductions
//! and state professional tax from versioned per-financial-year rule books.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
