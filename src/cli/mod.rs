// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use livechannels::api::ChannelApi;
use livechannels::config::Config;

pub mod channels;
pub mod epg;
pub mod play;
pub mod playlist;

pub use channels::{CategoriesCommand, ChannelsCommand};
pub use epg::EpgCommand;
pub use play::PlayCommand;
pub use playlist::{PlaylistCommand, UploadCommand};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything a scriptable command needs
pub struct CommandContext {
    pub api: ChannelApi,
    pub config: Config,
}

impl CommandContext {
    pub fn new(config: Config) -> Result<Self> {
        let api = ChannelApi::new(&config.server.url)?;
        Ok(Self { api, config })
    }
}

/// Spinner on stderr while a request is in flight, so stdout stays pipeable.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
