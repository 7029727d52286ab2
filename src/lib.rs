//! Shift billing engine for airport ground-assistance partners.
//!
//! This crate turns column-mapped schedule rows into billed shift blocks:
//! free-text shift parsing, forward fill, block consolidation, and per-partner
//! tariffs (base, overtime, night, holiday), followed by period totals,
//! reconciliation against source values and collaborator payouts.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
