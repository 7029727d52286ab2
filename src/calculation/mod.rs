//! Calculation logic for the shift billing engine.
//!
//! Rows pass through the pipeline stages in order: cell and descriptor
//! parsing, forward fill, normalization, block aggregation. Each block is
//! then priced by the tariff rules (base amount, overtime, night surcharge,
//! ancillary services, holiday uplift) before the run-level reports are
//! built: period totals, reconciliation and collaborator payouts.

mod ancillary;
mod base_amount;
mod block_aggregator;
mod block_tariff;
mod cell_values;
mod collaborator;
mod engine;
mod forward_fill;
mod holiday_uplift;
mod holidays;
mod interval;
mod night_surcharge;
mod overtime;
mod period_totals;
mod reconciliation;
mod rounding;
mod row_normalizer;
mod time_range;

pub use ancillary::{BoardingCardResult, calculate_boarding_cards};
pub use base_amount::{BaseAmountResult, BaseInput, calculate_base_amount, match_service, tier_amount};
pub use block_aggregator::BlockAggregator;
pub use block_tariff::{EMPTY_INTERVAL_ERROR, MISSING_INTERVAL_ERROR, compute_block};
pub use cell_values::{
    AIRPORT_CODES, canonical_location, is_truthy_holiday, parse_date_cell, parse_eur,
    parse_minutes_cell,
};
pub use collaborator::{
    DEFAULT_COLLABORATOR_NIGHT, calculate_payout, collaborator_payouts, find_tariff,
    parse_night_label,
};
pub use engine::run_billing;
pub use forward_fill::{FillState, FilledRow, forward_fill_sheet};
pub use holiday_uplift::{ComponentAmounts, HolidayUpliftResult, apply_holiday_uplift};
pub use holidays::{FIXED_HOLIDAYS, HolidayCalendar, easter_sunday, italian_public_holidays};
pub use interval::{night_overlap_minutes, overnight_correct};
pub use night_surcharge::{NightSurchargeResult, calculate_night_surcharge, night_segments};
pub use overtime::{
    NO_ANCHOR_WARNING, NO_REFERENCE_WARNING, OvertimeResult, calculate_overtime, resolve_reference,
    select_anchor,
};
pub use period_totals::{FIRST_HALF_LAST_DAY, calculate_period_totals, half_of_month};
pub use reconciliation::{discrepancy_for, reconcile};
pub use rounding::{RoundingMode, RoundingPolicy, round_money};
pub use row_normalizer::{
    MISSING_SCHEDULED_ERROR, NormalizedRow, SkipReason, UNPARSED_SHIFT_ERROR, normalize_row,
};
pub use time_range::{
    MAX_DESCRIPTOR_HOUR, NO_DEPARTURE_TOKEN, extract_time_candidates, normalize_spaces,
    parse_shift_text, parse_time_of_day,
};
