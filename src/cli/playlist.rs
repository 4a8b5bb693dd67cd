// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{CommandContext, spinner};

pub struct UploadCommand {
    pub file: PathBuf,
}

impl UploadCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let pb = spinner("Loading playlist...");
        let result = context.api.upload_playlist(&self.file).await;
        pb.finish_and_clear();
        let response = result?;

        if !response.success {
            anyhow::bail!(
                "{}",
                response
                    .error
                    .unwrap_or_else(|| "Error loading playlist".to_string())
            );
        }

        let count = response.channels.map(|c| c.len()).unwrap_or_default();
        println!("✓ Loaded {} channels", count);
        Ok(())
    }
}

pub struct PlaylistCommand {
    pub output: Option<PathBuf>,
}

impl PlaylistCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        match self.output {
            Some(path) => {
                let mut file = tokio::fs::File::create(&path)
                    .await
                    .with_context(|| format!("Failed to create {}", path.display()))?;

                let pb = spinner("Downloading playlist...");
                let result = context.api.download_playlist(&mut file).await;
                pb.finish_and_clear();

                let written = result?;
                eprintln!("✓ Wrote {} bytes to {}", written, path.display());
            }
            None => {
                let mut stdout = tokio::io::stdout();
                context.api.download_playlist(&mut stdout).await?;
            }
        }

        Ok(())
    }
}
