// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use chrono::NaiveDateTime;

use super::time::{format_clock, parse_timestamp_or, sort_key};
use crate::model::{Channel, EpgMap, Program};

/// Maximum number of programs shown for a channel.
pub const SCHEDULE_LIMIT: usize = 8;

/// A program prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramView {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub is_now_playing: bool,
}

/// Resolve the upcoming schedule for `channel`.
///
/// Programs are ordered by the integer value of their start timestamp (so
/// malformed entries coerce low and come first) and cut to [`SCHEDULE_LIMIT`].
/// Every program whose window contains `now` is flagged; overlapping source
/// data can flag more than one.
pub fn resolve_schedule(channel: &Channel, epg: &EpgMap, now: NaiveDateTime) -> Vec<ProgramView> {
    let Some(programs) = epg.get(&channel.epg_key()) else {
        return Vec::new();
    };

    let mut sorted: Vec<&Program> = programs.iter().collect();
    sorted.sort_by_key(|program| sort_key(&program.start));
    sorted.truncate(SCHEDULE_LIMIT);

    sorted
        .into_iter()
        .map(|program| {
            let start = parse_timestamp_or(&program.start, now);
            let end = parse_timestamp_or(&program.end, now);
            ProgramView {
                title: program.title.clone(),
                start: format_clock(&program.start),
                end: format_clock(&program.end),
                description: program.description.clone(),
                is_now_playing: now >= start && now <= end,
            }
        })
        .collect()
}
