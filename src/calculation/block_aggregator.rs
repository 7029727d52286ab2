//! Consolidation of normalized rows into billing blocks.
//!
//! Blocks live in an arena (`Vec<Block>`) with a key-to-handle index, so a
//! repeated key is an O(1) lookup followed by an in-place merge. Rows must be
//! fed in file → sheet → row order: the first row seen for a key decides the
//! block's scalar fields and provenance.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::config::GroupingPolicy;
use crate::models::{Block, BlockKey, RawRow};

use super::row_normalizer::NormalizedRow;

/// Incremental block store for one run.
#[derive(Debug, Clone)]
pub struct BlockAggregator {
    grouping: GroupingPolicy,
    blocks: Vec<Block>,
    index: HashMap<BlockKey, usize>,
}

impl BlockAggregator {
    /// Creates an empty aggregator for a partner's grouping rules.
    pub fn new(grouping: GroupingPolicy) -> Self {
        Self {
            grouping,
            blocks: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds the key a row groups under.
    pub fn key_for(&self, raw: &RawRow, row: &NormalizedRow) -> BlockKey {
        let secondary_operator_id = if self.grouping.use_secondary_operator {
            non_blank(raw.secondary_operator_id.as_deref())
        } else {
            None
        };
        BlockKey {
            date: row.date,
            location: row.location.clone(),
            shift_key: row.shift_key.clone(),
            secondary_operator_id,
            row_disambiguator: (!self.grouping.merge_rows)
                .then_some(raw.provenance.global_ordinal),
        }
    }

    /// Adds a row, creating its block or merging into the existing one.
    ///
    /// Returns true when a new block was created.
    pub fn add(&mut self, raw: &RawRow, row: NormalizedRow) -> bool {
        let key = self.key_for(raw, &row);
        match self.index.get(&key) {
            Some(&handle) => {
                self.merge(handle, raw, row);
                false
            }
            None => {
                let block = self.create(key.clone(), raw, row);
                self.index.insert(key, self.blocks.len());
                self.blocks.push(block);
                true
            }
        }
    }

    fn create(&self, key: BlockKey, raw: &RawRow, row: NormalizedRow) -> Block {
        let mut end_datetime = row.end_datetime;
        if self.grouping.extend_end_to_latest_departure {
            end_datetime = extend_end(end_datetime, &row.actual_departures, &row.scheduled_departures);
        }
        Block {
            key,
            shift_text: row.shift_text,
            shift_label: row.shift_label,
            start_datetime: row.start_datetime,
            end_datetime,
            no_departure: row.interval.no_departure,
            holiday: row.holiday,
            actual_departures: row.actual_departures,
            scheduled_departures: row.scheduled_departures,
            passenger_count: raw.passenger_count,
            service_category: non_blank(raw.service_category.as_deref()),
            service_note: non_blank(raw.service_note.as_deref()),
            assistant: non_blank(raw.assistant.as_deref()),
            provided: raw.provided.clone(),
            first_source: raw.provenance.clone(),
            row_count: 1,
            parse_error: row.parse_error,
        }
    }

    fn merge(&mut self, handle: usize, raw: &RawRow, row: NormalizedRow) {
        let grouping = &self.grouping;
        let Some(block) = self.blocks.get_mut(handle) else {
            return;
        };

        block.actual_departures.extend(row.actual_departures);
        block.scheduled_departures.extend(row.scheduled_departures);
        block.holiday |= row.holiday;
        block.no_departure |= row.interval.no_departure;
        block.row_count += 1;

        if block.passenger_count.is_none() {
            block.passenger_count = raw.passenger_count;
        }
        if block.service_category.is_none() {
            block.service_category = non_blank(raw.service_category.as_deref());
        }
        if block.service_note.is_none() {
            block.service_note = non_blank(raw.service_note.as_deref());
        }
        if block.assistant.is_none() {
            block.assistant = non_blank(raw.assistant.as_deref());
        }

        if grouping.merge_moves_start_earlier {
            if let (Some(current), Some(candidate)) = (block.start_datetime, row.start_datetime) {
                if candidate < current {
                    block.start_datetime = Some(candidate);
                }
            }
        }
        if grouping.extend_end_to_latest_departure {
            block.end_datetime = extend_end(
                block.end_datetime,
                &block.actual_departures,
                &block.scheduled_departures,
            );
        }
    }

    /// Number of blocks so far.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true when no block has been created.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consumes the store, returning blocks in reporting order:
    /// date, then location, then first-seen ordinal.
    pub fn into_blocks(self) -> Vec<Block> {
        let mut blocks = self.blocks;
        blocks.sort_by(|a, b| {
            a.key
                .date
                .cmp(&b.key.date)
                .then_with(|| a.key.location.cmp(&b.key.location))
                .then_with(|| a.first_source.global_ordinal.cmp(&b.first_source.global_ordinal))
        });
        blocks
    }
}

/// Moves the end to the latest actual departure, or the latest scheduled one
/// when none was observed. The end never moves backward.
fn extend_end(
    end: Option<NaiveDateTime>,
    actual: &[NaiveDateTime],
    scheduled: &[NaiveDateTime],
) -> Option<NaiveDateTime> {
    let latest = actual.iter().max().or_else(|| scheduled.iter().max()).copied();
    match (end, latest) {
        (Some(end), Some(latest)) => Some(end.max(latest)),
        (end, _) => end,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
