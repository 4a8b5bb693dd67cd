// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use serde_json::json;

use super::{CommandContext, OutputFormat, spinner};
use livechannels::catalog;
use livechannels::model::Channel;

pub struct ChannelsCommand {
    pub search: Option<String>,
    pub category: Option<String>,
    pub format: OutputFormat,
}

impl ChannelsCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Fetching channels...");
        let result = context.api.get_channels().await;
        pb.finish_and_clear();
        let channels = result?;

        let visible = catalog::filter(
            &channels,
            self.search.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
        );
        tracing::debug!("{} of {} channels match", visible.len(), channels.len());

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            }
            OutputFormat::Text => {
                if visible.is_empty() {
                    println!("No channels found");
                } else {
                    for channel in visible {
                        print_channel(channel);
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_channel(channel: &Channel) {
    match channel.category_name() {
        Some(category) => println!("{} [{}]", channel.name, category),
        None => println!("{}", channel.name),
    }
}

pub struct CategoriesCommand {
    pub format: OutputFormat,
}

impl CategoriesCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Fetching categories...");
        let result = context.api.get_categories().await;
        pb.finish_and_clear();
        let categories = result?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&json!(categories))?);
            }
            OutputFormat::Text => {
                for category in categories {
                    println!("{}", category);
                }
            }
        }

        Ok(())
    }
}
