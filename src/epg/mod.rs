// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod schedule;
pub mod time;

pub use schedule::{ProgramView, SCHEDULE_LIMIT, resolve_schedule};
pub use time::{format_clock, parse_timestamp, parse_timestamp_or};
