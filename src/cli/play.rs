// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use inquire::Select;

use super::{CommandContext, spinner};
use livechannels::model::Channel;
use livechannels::player::MpvEngine;

pub struct PlayCommand {
    pub channel: Option<String>,
}

impl PlayCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Fetching channels...");
        let result = context.api.get_channels().await;
        pb.finish_and_clear();
        let channels = result?;

        if channels.is_empty() {
            anyhow::bail!("No channels found");
        }

        let channel = match self.channel {
            Some(name) => find_channel(&channels, &name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Channel '{}' not found", name))?,
            None => prompt_channel(&channels)?,
        };

        if !MpvEngine::is_available(&context.config.player) {
            anyhow::bail!(
                "'{}' command not found or not working. Please install mpv.",
                context.config.player.command
            );
        }

        eprintln!("Playing: {}", channel.name);
        println!("Starting playback... (Press 'q' in the player to quit)");

        let player = context.config.player.clone();
        tokio::task::spawn_blocking(move || {
            MpvEngine::play_blocking(&player, &channel.stream_url, &channel.name)
        })
        .await
        .context("Player task panicked")??;

        println!("Playback ended");
        Ok(())
    }
}

/// Case-insensitive lookup; the last matching entry wins like the catalog.
fn find_channel<'a>(channels: &'a [Channel], name: &str) -> Option<&'a Channel> {
    let name = name.to_lowercase();
    channels
        .iter()
        .rev()
        .find(|ch| ch.name.to_lowercase() == name)
}

fn prompt_channel(channels: &[Channel]) -> Result<Channel> {
    let names: Vec<String> = channels.iter().map(|ch| ch.name.clone()).collect();
    let selection = Select::new("Select channel:", names).prompt()?;

    find_channel(channels, &selection)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Channel not found"))
}
