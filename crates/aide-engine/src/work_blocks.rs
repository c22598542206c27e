use aide_types::WorkBlock;
use chrono::{DateTime, TimeDelta, Utc};

/// Idle gap that closes a work block. A gap of exactly this length starts a new block.
pub const IDLE_GAP_SECS: i64 = 30 * 60;

/// Partition chronologically ordered timestamps into work blocks.
///
/// Each block's `active_seconds` is its own first-to-last span; a block
/// holding one message has a true zero duration.
pub fn segment_work_blocks(timestamps: &[DateTime<Utc>]) -> Vec<WorkBlock> {
    let idle_gap = TimeDelta::seconds(IDLE_GAP_SECS);
    let mut blocks: Vec<WorkBlock> = Vec::new();
    let mut prev: Option<DateTime<Utc>> = None;

    for &ts in timestamps {
        let gap_closed = prev.is_some_and(|p| ts - p >= idle_gap);
        if gap_closed || blocks.is_empty() {
            blocks.push(WorkBlock {
                index: blocks.len() as u64,
                started_at: ts,
                ended_at: ts,
                active_seconds: 0,
                message_count: 1,
            });
        } else if let Some(block) = blocks.last_mut() {
            block.ended_at = ts;
            block.active_seconds = (ts - block.started_at).num_seconds();
            block.message_count += 1;
        }
        prev = Some(ts);
    }

    blocks
}

/// Effective session duration: the sum of block durations.
pub fn total_active_seconds(blocks: &[WorkBlock]) -> i64 {
    blocks.iter().map(|b| b.active_seconds).sum()
}
