//! Core data models for the shift billing engine.
//!
//! Rows flow in as [`RawRow`]s grouped by [`SourceSheet`], are consolidated
//! into [`Block`]s, and leave as the relations in [`BillingOutput`].

mod billing_result;
mod block;
mod raw_row;
mod shift_interval;

pub use billing_result::{
    AuditStep, AuditWarning, BillingOutput, CollaboratorPayout, ComputedBlock, DiscrepancyRecord,
    PeriodKind, PeriodTotal, QuantityDelta, RunSummary,
};
pub use block::{Block, BlockKey};
pub use raw_row::{Provenance, ProvidedValues, RawRow, SourceSheet};
pub use shift_interval::ShiftInterval;
