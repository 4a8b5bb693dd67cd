// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use chrono::Local;
use serde_json::json;

use super::{CommandContext, OutputFormat, spinner};
use livechannels::epg::resolve_schedule;
use livechannels::model::EpgMap;

pub struct EpgCommand {
    pub channel: String,
    pub format: OutputFormat,
}

impl EpgCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Fetching program guide...");
        let channel = match context.api.get_channel(&self.channel).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                pb.finish_and_clear();
                anyhow::bail!("Channel '{}' not found", self.channel);
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        let key = channel.epg_key();
        let result = context.api.get_channel_epg(&key).await;
        pb.finish_and_clear();

        let mut epg = EpgMap::new();
        epg.insert(key, result?);
        let schedule = resolve_schedule(&channel, &epg, Local::now().naive_local());

        match self.format {
            OutputFormat::Json => {
                let programs: Vec<_> = schedule
                    .iter()
                    .map(|p| {
                        json!({
                            "title": p.title,
                            "start": p.start,
                            "end": p.end,
                            "description": p.description,
                            "now_playing": p.is_now_playing,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "channel": channel.name,
                        "programs": programs,
                    }))?
                );
            }
            OutputFormat::Text => {
                println!("{}", channel.name);
                if schedule.is_empty() {
                    println!("No program guide available");
                }
                for program in schedule {
                    let marker = if program.is_now_playing { "▶" } else { " " };
                    println!(
                        "{} {} - {}  {}",
                        marker, program.start, program.end, program.title
                    );
                    if program.is_now_playing
                        && let Some(description) = &program.description
                    {
                        println!("      {}", description);
                    }
                }
            }
        }

        Ok(())
    }
}
