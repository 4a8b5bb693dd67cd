// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use livechannels::{ChannelApi, Config};

mod cli;
use cli::{
    CategoriesCommand, ChannelsCommand, CommandContext, EpgCommand, OutputFormat, PlayCommand,
    PlaylistCommand, UploadCommand,
};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "livechannels")]
#[command(about = "A terminal client for a live TV channel service")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (livechannels_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Channel service URL (overrides server.url from the config file)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default if no command given)
    Tui,

    /// List channels
    Channels {
        /// Case-insensitive substring of the channel name
        #[arg(long)]
        search: Option<String>,
        /// Exact category name
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List categories
    Categories {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the program guide for a channel
    Epg {
        /// Channel name (case-insensitive)
        channel: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Replace the server's channel list with an M3U playlist
    Upload {
        /// Path to the .m3u/.m3u8 file
        file: PathBuf,
    },

    /// Export the current channel list as M3U
    Playlist {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play a channel in mpv
    Play {
        /// Channel name; pick interactively when omitted
        channel: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file (persists --server)
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug_log {
        let file = File::create("livechannels_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("livechannels=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }

    // Load configuration
    let config_path = Config::default_path();
    let mut config = Config::load_or_default(&config_path)?;
    if let Some(server) = cli.server {
        config.server.url = server;
    }
    tracing::debug!("Using channel service at {}", config.server.url);

    match cli.command {
        Some(Commands::Tui) | None => {
            let api = ChannelApi::new(&config.server.url)?;
            livechannels::run_tui(config, api).await?;
        }
        Some(Commands::Channels {
            search,
            category,
            format,
        }) => {
            let cmd = ChannelsCommand {
                search,
                category,
                format,
            };
            cmd.execute(CommandContext::new(config)?).await?;
        }
        Some(Commands::Categories { format }) => {
            CategoriesCommand { format }
                .execute(CommandContext::new(config)?)
                .await?;
        }
        Some(Commands::Epg { channel, format }) => {
            EpgCommand { channel, format }
                .execute(CommandContext::new(config)?)
                .await?;
        }
        Some(Commands::Upload { file }) => {
            UploadCommand { file }
                .execute(CommandContext::new(config)?)
                .await?;
        }
        Some(Commands::Playlist { output }) => {
            PlaylistCommand { output }
                .execute(CommandContext::new(config)?)
                .await?;
        }
        Some(Commands::Play { channel }) => {
            PlayCommand { channel }
                .execute(CommandContext::new(config)?)
                .await?;
        }
        Some(Commands::Config { save }) => {
            if save {
                config.save(&config_path)?;
                eprintln!("✓ Saved {}", config_path.display());
            } else {
                eprintln!("# {}", config_path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
