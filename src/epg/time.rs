// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! EPG timestamps are fixed-width `YYYYMMDDHHMMSS` strings in local time with
//! no offset. Parsing is lenient: anything unusable degrades to a fallback
//! instant rather than an error.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

/// Minimum length needed to carry year through minute.
const MIN_TIMESTAMP_LEN: usize = 12;

/// Parse an EPG timestamp, falling back to the current local time.
pub fn parse_timestamp(raw: &str) -> NaiveDateTime {
    parse_timestamp_or(raw, Local::now().naive_local())
}

/// Parse an EPG timestamp, returning `fallback` when `raw` is too short or has
/// a non-numeric component. Out-of-range fields roll over into the next unit
/// (day 32 of January is February 1st, hour 24 is midnight of the next day).
/// Seconds are ignored.
pub fn parse_timestamp_or(raw: &str, fallback: NaiveDateTime) -> NaiveDateTime {
    try_parse(raw).unwrap_or(fallback)
}

fn try_parse(raw: &str) -> Option<NaiveDateTime> {
    if raw.len() < MIN_TIMESTAMP_LEN {
        return None;
    }

    let field = |range: std::ops::Range<usize>| raw.get(range)?.parse::<i64>().ok();
    let year = field(0..4)?;
    let month = field(4..6)?;
    let day = field(6..8)?;
    let hour = field(8..10)?;
    let minute = field(10..12)?;

    let months = year.checked_mul(12)?.checked_add(month - 1)?;
    let first_of_month = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;

    let offset = TimeDelta::try_days(day - 1)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?;

    first_of_month
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(offset)
}

/// Render the `HH:MM` part of a raw timestamp.
///
/// This is a plain substring of positions 8..12 with no validation, so it can
/// disagree with [`parse_timestamp`] on malformed input. Inputs shorter than
/// 12 characters are returned unchanged.
pub fn format_clock(raw: &str) -> String {
    if raw.len() < MIN_TIMESTAMP_LEN {
        return raw.to_string();
    }

    match (raw.get(8..10), raw.get(10..12)) {
        (Some(hour), Some(minute)) => format!("{}:{}", hour, minute),
        _ => raw.to_string(),
    }
}

/// Integer value used to order programs by start time.
///
/// Takes the leading (optionally signed) run of decimal digits, ignoring any
/// trailing garbage. Strings with no leading digits coerce to 0.
pub fn sort_key(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value = match rest[..digits_len].parse::<i64>() {
        Ok(value) => value,
        // Too many digits for an i64
        Err(_) if digits_len > 0 => i64::MAX,
        Err(_) => 0,
    };

    if negative { -value } else { value }
}
