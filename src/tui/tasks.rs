// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::event::Event;
use crate::api::ChannelApi;
use crate::model::{Channel, EpgMap, UploadResponse};

/// Network work requested by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    FetchChannels,
    FetchEpg,
    UploadPlaylist(PathBuf),
}

#[derive(Debug)]
pub enum Outcome {
    ChannelsLoaded(Result<Vec<Channel>>),
    EpgLoaded(Result<EpgMap>),
    PlaylistUploaded(Result<UploadResponse>),
}

/// Run `task` in the background and post its outcome to the event loop.
///
/// Tasks are never cancelled; when two of the same kind overlap, whichever
/// finishes last overwrites the other's result.
pub fn spawn(api: &ChannelApi, task: Task, sender: UnboundedSender<Event>) {
    let api = api.clone();
    tokio::spawn(async move {
        debug!("Running task {:?}", task);
        let outcome = match task {
            Task::FetchChannels => Outcome::ChannelsLoaded(api.get_channels().await),
            Task::FetchEpg => Outcome::EpgLoaded(api.get_epg().await),
            Task::UploadPlaylist(path) => {
                Outcome::PlaylistUploaded(api.upload_playlist(&path).await)
            }
        };
        // The UI may already be gone during shutdown
        let _ = sender.send(Event::Outcome(outcome));
    });
}
