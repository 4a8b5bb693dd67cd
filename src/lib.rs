// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod api;
pub mod catalog;
pub mod config;
pub mod epg;
pub mod model;
pub mod player;
pub mod session;
pub mod toast;
pub mod tui;
pub mod view;

pub use api::ChannelApi;
pub use config::Config;
pub use session::Session;
pub use tui::run_tui;
