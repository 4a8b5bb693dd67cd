// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::model::{Channel, EpgMap, Program, UploadResponse};

/// Client for the channel service's `/api` endpoints.
///
/// No request timeout is configured: a stalled request only holds up the task
/// that issued it.
#[derive(Debug, Clone)]
pub struct ChannelApi {
    client: Client,
    base_url: Url,
}

impl ChannelApi {
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(server_url)
            .with_context(|| format!("Invalid server URL: {}", server_url))?;

        // Make relative joins append to the path instead of replacing its last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("livechannels/", env!("CARGO_PKG_VERSION")))
                .build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request to {} failed with status: {}",
                url,
                response.status()
            ));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    pub async fn get_channels(&self) -> Result<Vec<Channel>> {
        self.get_json("api/channels").await
    }

    pub async fn get_epg(&self) -> Result<EpgMap> {
        self.get_json("api/epg").await
    }

    /// Look up one channel by name (the server matches case-insensitively).
    pub async fn get_channel(&self, name: &str) -> Result<Option<Channel>> {
        let url = self.endpoint(&format!("api/channels/{}", urlencoding::encode(name)))?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request to {} failed with status: {}",
                url,
                response.status()
            ));
        }

        let channel = response
            .json::<Channel>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;
        Ok(Some(channel))
    }

    pub async fn get_channel_epg(&self, epg_key: &str) -> Result<Vec<Program>> {
        self.get_json(&format!("api/epg/{}", urlencoding::encode(epg_key)))
            .await
    }

    pub async fn get_categories(&self) -> Result<Vec<String>> {
        self.get_json("api/categories").await
    }

    /// Upload an M3U playlist as multipart field `file`.
    ///
    /// Rejections arrive as a non-2xx status with an `{error}` body; those are
    /// returned as an unsuccessful [`UploadResponse`] rather than an `Err`.
    pub async fn upload_playlist(&self, path: &Path) -> Result<UploadResponse> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read playlist: {}", path.display()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playlist.m3u".to_string());

        let form = Form::new().part("file", Part::bytes(content).file_name(file_name));
        let url = self.endpoint("api/upload_playlist")?;
        debug!("POST {} ({})", url, path.display());

        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| "Failed to read upload response")?;

        decode_upload_response(status, &body)
    }

    /// Stream the server's M3U export into `writer`, returning the byte count.
    pub async fn download_playlist<W>(&self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let url = self.endpoint("api/playlist")?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request to {} failed with status: {}",
                url,
                response.status()
            ));
        }

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| "Failed to read response chunk")?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(written)
    }
}

/// Decode an upload reply. A JSON body is accepted whatever the status, since
/// the server reports rejected playlists as 400 with `{error}`.
fn decode_upload_response(status: StatusCode, body: &str) -> Result<UploadResponse> {
    match serde_json::from_str::<UploadResponse>(body) {
        Ok(result) => Ok(result),
        Err(e) if status.is_success() => Err(e).with_context(|| "Failed to parse upload response"),
        Err(_) => Err(anyhow::anyhow!(
            "Playlist upload failed with status: {}",
            status
        )),
    }
}
