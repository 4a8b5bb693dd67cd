// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod mpv;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::model::Channel;
use crate::toast::Notice;

pub use mpv::MpvEngine;

pub const STREAM_ERROR_MESSAGE: &str = "Error loading stream. Please try another channel.";
pub const FULLSCREEN_UNSUPPORTED_MESSAGE: &str = "Fullscreen not supported";

/// Lifecycle notifications emitted by a playback engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Play,
    Paused,
    Ended,
    Error(String),
    /// The engine went away (window closed, process died).
    Closed,
}

/// An HLS-capable playback engine.
#[allow(async_fn_in_trait)]
pub trait PlayerEngine {
    /// Bring the engine up. Called lazily before the first source is set.
    async fn initialize(&mut self) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Replace the current source with an HLS stream.
    fn load_hls(&mut self, url: &str, title: &str) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn is_fullscreen(&self) -> Result<bool>;

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()>;

    /// Drain lifecycle events received since the last call.
    fn poll_events(&mut self) -> Vec<PlayerEvent>;

    async fn shutdown(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Uninitialized,
    Idle,
    Playing,
    Errored,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Uninitialized => write!(f, "Player not started"),
            PlaybackState::Idle => write!(f, "Paused"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::Errored => write!(f, "Playback error"),
        }
    }
}

/// Binds the selected channel's stream to the engine and tracks what the
/// engine reports back. Failures come back as [`Notice`]s for the user; none
/// of them are retried.
pub struct PlaybackController<E> {
    engine: E,
    state: PlaybackState,
    source: Option<String>,
}

impl<E: PlayerEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Uninitialized,
            source: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub async fn select_channel(&mut self, channel: &Channel) -> Option<Notice> {
        if !self.engine.is_initialized() {
            if let Err(e) = self.engine.initialize().await {
                error!("Failed to start player: {:#}", e);
                self.state = PlaybackState::Uninitialized;
                return Some(Notice::error(format!("Failed to start player: {}", e)));
            }
            self.state = PlaybackState::Idle;
        }

        info!("Tuning to {} ({})", channel.name, channel.stream_url);

        if let Err(e) = self.engine.load_hls(&channel.stream_url, &channel.name) {
            error!("Failed to load stream {}: {:#}", channel.stream_url, e);
            self.state = PlaybackState::Errored;
            return Some(Notice::error(STREAM_ERROR_MESSAGE));
        }
        self.source = Some(channel.stream_url.clone());

        match self.engine.play() {
            Ok(()) => self.state = PlaybackState::Playing,
            Err(e) => {
                debug!("Auto-play prevented: {:#}", e);
                self.state = PlaybackState::Idle;
            }
        }

        None
    }

    pub fn handle_event(&mut self, event: PlayerEvent) -> Option<Notice> {
        match event {
            PlayerEvent::Play => {
                debug!("Video started playing");
                if self.state != PlaybackState::Uninitialized {
                    self.state = PlaybackState::Playing;
                }
                None
            }
            PlayerEvent::Paused => {
                if self.state == PlaybackState::Playing {
                    self.state = PlaybackState::Idle;
                }
                None
            }
            PlayerEvent::Ended => {
                debug!("Video ended");
                if self.state == PlaybackState::Playing {
                    self.state = PlaybackState::Idle;
                }
                None
            }
            PlayerEvent::Error(reason) => {
                warn!("Player reported an error: {}", reason);
                self.state = PlaybackState::Errored;
                Some(Notice::error(STREAM_ERROR_MESSAGE))
            }
            PlayerEvent::Closed => {
                info!("Player closed");
                self.state = PlaybackState::Uninitialized;
                self.source = None;
                None
            }
        }
    }

    /// Feed every pending engine event through [`Self::handle_event`].
    pub fn poll(&mut self) -> Vec<Notice> {
        let events = self.engine.poll_events();
        events
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }

    pub fn toggle_pause(&mut self) -> Option<Notice> {
        if self.state == PlaybackState::Uninitialized || self.source.is_none() {
            return None;
        }

        if self.state == PlaybackState::Playing {
            match self.engine.pause() {
                Ok(()) => self.state = PlaybackState::Idle,
                Err(e) => warn!("Failed to pause: {:#}", e),
            }
        } else {
            match self.engine.play() {
                Ok(()) => self.state = PlaybackState::Playing,
                Err(e) => debug!("Play prevented: {:#}", e),
            }
        }

        None
    }

    pub fn toggle_fullscreen(&mut self) -> Option<Notice> {
        if !self.engine.is_initialized() {
            return Some(Notice::error(FULLSCREEN_UNSUPPORTED_MESSAGE));
        }

        let result = self
            .engine
            .is_fullscreen()
            .and_then(|fullscreen| self.engine.set_fullscreen(!fullscreen));

        match result {
            Ok(()) => None,
            Err(e) => {
                debug!("Fullscreen error: {:#}", e);
                Some(Notice::error(FULLSCREEN_UNSUPPORTED_MESSAGE))
            }
        }
    }

    pub fn exit_fullscreen(&mut self) {
        if !self.engine.is_initialized() {
            return;
        }

        if let Ok(true) = self.engine.is_fullscreen()
            && let Err(e) = self.engine.set_fullscreen(false)
        {
            debug!("Failed to leave fullscreen: {:#}", e);
        }
    }

    pub async fn shutdown(&mut self) {
        if let Err(e) = self.engine.shutdown().await {
            warn!("Failed to shut down player: {:#}", e);
        }
        self.state = PlaybackState::Uninitialized;
        self.source = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Scripted engine that records what the controller asked of it.
    #[derive(Debug, Default)]
    pub struct FakeEngine {
        pub initialized: bool,
        pub fail_initialize: bool,
        pub fail_load: bool,
        pub reject_play: bool,
        pub fullscreen_unavailable: bool,
        pub fullscreen: bool,
        pub paused: bool,
        pub initialize_calls: usize,
        pub loaded: Vec<(String, String)>,
        pub pending: Vec<PlayerEvent>,
    }

    impl PlayerEngine for FakeEngine {
        async fn initialize(&mut self) -> Result<()> {
            self.initialize_calls += 1;
            if self.fail_initialize {
                anyhow::bail!("mpv not installed");
            }
            self.initialized = true;
            Ok(())
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn load_hls(&mut self, url: &str, title: &str) -> Result<()> {
            if self.fail_load {
                anyhow::bail!("socket closed");
            }
            self.loaded.push((url.to_string(), title.to_string()));
            Ok(())
        }

        fn play(&mut self) -> Result<()> {
            if self.reject_play {
                anyhow::bail!("autoplay blocked");
            }
            self.paused = false;
            Ok(())
        }

        fn pause(&mut self) -> Result<()> {
            self.paused = true;
            Ok(())
        }

        fn is_fullscreen(&self) -> Result<bool> {
            if self.fullscreen_unavailable {
                anyhow::bail!("no window");
            }
            Ok(self.fullscreen)
        }

        fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
            if self.fullscreen_unavailable {
                anyhow::bail!("no window");
            }
            self.fullscreen = fullscreen;
            Ok(())
        }

        fn poll_events(&mut self) -> Vec<PlayerEvent> {
            std::mem::take(&mut self.pending)
        }

        async fn shutdown(&mut self) -> Result<()> {
            self.initialized = false;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeEngine;
    use super::*;
    use crate::toast::Severity;

    fn channel(name: &str) -> Channel {
        Channel {
            name: name.to_string(),
            logo: None,
            category: None,
            stream_url: format!("https://example.com/{}.m3u8", name),
            epg_id: None,
        }
    }

    #[tokio::test]
    async fn test_select_initializes_lazily_and_plays() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        assert_eq!(controller.state(), PlaybackState::Uninitialized);

        assert!(controller.select_channel(&channel("news")).await.is_none());
        assert!(controller.select_channel(&channel("sport")).await.is_none());

        assert_eq!(controller.state(), PlaybackState::Playing);
        assert_eq!(controller.engine().initialize_calls, 1);
        assert_eq!(
            controller.engine().loaded,
            vec![
                ("https://example.com/news.m3u8".to_string(), "news".to_string()),
                ("https://example.com/sport.m3u8".to_string(), "sport".to_string()),
            ]
        );
        assert_eq!(controller.source(), Some("https://example.com/sport.m3u8"));
    }

    #[tokio::test]
    async fn test_rejected_play_is_not_an_error() {
        let engine = FakeEngine {
            reject_play: true,
            ..Default::default()
        };
        let mut controller = PlaybackController::new(engine);

        assert!(controller.select_channel(&channel("news")).await.is_none());
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.source().is_some());
    }

    #[tokio::test]
    async fn test_initialize_failure_is_reported() {
        let engine = FakeEngine {
            fail_initialize: true,
            ..Default::default()
        };
        let mut controller = PlaybackController::new(engine);

        let notice = controller.select_channel(&channel("news")).await.unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(controller.state(), PlaybackState::Uninitialized);
        assert!(controller.engine().loaded.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_errors() {
        let engine = FakeEngine {
            fail_load: true,
            ..Default::default()
        };
        let mut controller = PlaybackController::new(engine);

        let notice = controller.select_channel(&channel("news")).await.unwrap();
        assert_eq!(notice.message, STREAM_ERROR_MESSAGE);
        assert_eq!(controller.state(), PlaybackState::Errored);
    }

    #[tokio::test]
    async fn test_error_event_surfaces_notice_without_retry() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.select_channel(&channel("news")).await;

        controller.engine.pending.push(PlayerEvent::Error("loading failed".into()));
        let notices = controller.poll();

        assert_eq!(notices, vec![Notice::error(STREAM_ERROR_MESSAGE)]);
        assert_eq!(controller.state(), PlaybackState::Errored);
        assert_eq!(controller.engine().loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_events() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.select_channel(&channel("news")).await;

        assert!(controller.handle_event(PlayerEvent::Paused).is_none());
        assert_eq!(controller.state(), PlaybackState::Idle);
        controller.handle_event(PlayerEvent::Play);
        assert_eq!(controller.state(), PlaybackState::Playing);
        controller.handle_event(PlayerEvent::Ended);
        assert_eq!(controller.state(), PlaybackState::Idle);
        controller.handle_event(PlayerEvent::Closed);
        assert_eq!(controller.state(), PlaybackState::Uninitialized);
        assert!(controller.source().is_none());
    }

    #[tokio::test]
    async fn test_toggle_pause() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.toggle_pause();
        assert_eq!(controller.state(), PlaybackState::Uninitialized);

        controller.select_channel(&channel("news")).await;
        controller.toggle_pause();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(controller.engine().paused);
        controller.toggle_pause();
        assert_eq!(controller.state(), PlaybackState::Playing);
        assert!(!controller.engine().paused);
    }

    #[tokio::test]
    async fn test_fullscreen() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        assert_eq!(
            controller.toggle_fullscreen(),
            Some(Notice::error(FULLSCREEN_UNSUPPORTED_MESSAGE))
        );

        controller.select_channel(&channel("news")).await;
        assert!(controller.toggle_fullscreen().is_none());
        assert!(controller.engine().fullscreen);
        controller.exit_fullscreen();
        assert!(!controller.engine().fullscreen);
        controller.exit_fullscreen();
        assert!(!controller.engine().fullscreen);

        controller.engine.fullscreen_unavailable = true;
        assert_eq!(
            controller.toggle_fullscreen(),
            Some(Notice::error(FULLSCREEN_UNSUPPORTED_MESSAGE))
        );
    }
}
