// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::input::{Command, Edit, InputMode, edit_key, expand_path, is_force_quit, normal_key};
use super::tasks::{Outcome, Task};
use crate::catalog;
use crate::config::AvatarConfig;
use crate::model::Channel;
use crate::player::{PlaybackController, PlaybackState, PlayerEngine};
use crate::session::Session;
use crate::toast::{Notice, ToastQueue};
use crate::view::{self, RenderContext, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The controller: owns the session, the player and the toasts, and is the
/// only place any of them change.
pub struct App<E> {
    pub session: Session,
    playback: PlaybackController<E>,
    toasts: ToastQueue,
    avatar: AvatarConfig,
    pub mode: InputMode,
    /// Text being typed into the active prompt.
    pub prompt: String,
    /// Highlighted row in the channel list (index into the visible channels).
    pub cursor: usize,
    pub show_help: bool,
    pending: Vec<Task>,
    starting: Option<Channel>,
}

impl<E: PlayerEngine> App<E> {
    /// A fresh app with the initial catalog and EPG fetches queued.
    pub fn new(engine: E, avatar: AvatarConfig) -> Self {
        Self {
            session: Session::new(),
            playback: PlaybackController::new(engine),
            toasts: ToastQueue::new(),
            avatar,
            mode: InputMode::Normal,
            prompt: String::new(),
            cursor: 0,
            show_help: false,
            pending: vec![Task::FetchChannels, Task::FetchEpg],
            starting: None,
        }
    }

    /// Network tasks queued by command handlers since the last call.
    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.pending)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    fn notify(&mut self, notice: Notice) {
        debug!("Toast ({}): {}", notice.severity, notice.message);
        self.toasts.push(notice, Instant::now());
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if is_force_quit(&key) {
            return Flow::Quit;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
                self.show_help = false;
            }
            return Flow::Continue;
        }

        match self.mode {
            InputMode::Normal => match normal_key(&key) {
                Some(command) => self.dispatch(command).await,
                None => Flow::Continue,
            },
            InputMode::Search => match edit_key(&key, &mut self.prompt) {
                Edit::Changed => {
                    let term = self.prompt.clone();
                    self.dispatch(Command::SetSearch(term)).await
                }
                Edit::Submit => {
                    self.mode = InputMode::Normal;
                    Flow::Continue
                }
                Edit::Cancel => {
                    self.mode = InputMode::Normal;
                    self.prompt.clear();
                    self.dispatch(Command::SetSearch(String::new())).await
                }
                Edit::Ignored => Flow::Continue,
            },
            InputMode::UploadPath => match edit_key(&key, &mut self.prompt) {
                Edit::Submit => {
                    self.mode = InputMode::Normal;
                    let raw = std::mem::take(&mut self.prompt);
                    if raw.trim().is_empty() {
                        return Flow::Continue;
                    }
                    self.dispatch(Command::UploadPlaylist(expand_path(&raw))).await
                }
                Edit::Cancel => {
                    self.mode = InputMode::Normal;
                    self.prompt.clear();
                    Flow::Continue
                }
                Edit::Changed | Edit::Ignored => Flow::Continue,
            },
        }
    }

    pub async fn dispatch(&mut self, command: Command) -> Flow {
        match command {
            Command::SetSearch(term) => {
                self.session.set_search_term(term);
                self.cursor = 0;
            }
            Command::SetCategory(category) => self.set_category(category),
            Command::CycleCategory(direction) => self.cycle_category(direction),
            Command::SelectChannel(name) => self.select_channel(&name).await,
            Command::Navigate(direction) => {
                let target = catalog::adjacent(
                    &self.session.visible(),
                    self.session.selected().map(|ch| ch.name.as_str()),
                    direction,
                )
                .map(|ch| ch.name.clone());

                if let Some(name) = target {
                    self.select_channel(&name).await;
                }
            }
            Command::MoveCursor(delta) => self.move_cursor(delta),
            Command::ActivateCursor => {
                let name = self
                    .session
                    .visible()
                    .get(self.cursor)
                    .map(|ch| ch.name.clone());
                if let Some(name) = name {
                    self.select_channel(&name).await;
                }
            }
            Command::TogglePause => {
                if let Some(notice) = self.playback.toggle_pause() {
                    self.notify(notice);
                }
            }
            Command::ToggleFullscreen => {
                if let Some(notice) = self.playback.toggle_fullscreen() {
                    self.notify(notice);
                }
            }
            Command::ExitFullscreen => self.playback.exit_fullscreen(),
            Command::BeginSearch => {
                self.mode = InputMode::Search;
                self.prompt = self.session.search_term().to_string();
            }
            Command::BeginUpload => {
                self.mode = InputMode::UploadPath;
                self.prompt.clear();
            }
            Command::UploadPlaylist(path) => self.upload_playlist(path),
            Command::Reload => {
                info!("Reloading channels and EPG");
                self.notify(Notice::info("Refreshing channels..."));
                self.pending.push(Task::FetchChannels);
                self.pending.push(Task::FetchEpg);
            }
            Command::ToggleHelp => self.show_help = !self.show_help,
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    fn set_category(&mut self, category: String) {
        self.session.set_category(category);
        self.cursor = 0;
    }

    fn cycle_category(&mut self, direction: isize) {
        let options = self.session.category_options();
        let current = options
            .iter()
            .position(|o| o.value == self.session.category())
            .unwrap_or(0) as isize;
        let next = (current + direction).rem_euclid(options.len() as isize) as usize;
        let value = options[next].value.clone();
        self.set_category(value);
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.session.visible().len();
        self.cursor = if len == 0 {
            0
        } else {
            self.cursor.saturating_add_signed(delta).min(len - 1)
        };
    }

    async fn select_channel(&mut self, name: &str) {
        let Some(channel) = self.session.find(name).cloned() else {
            warn!("Channel {} is not in the catalog", name);
            return;
        };

        self.session.select(channel.clone());
        if let Some(position) = self
            .session
            .visible()
            .iter()
            .position(|ch| ch.name == channel.name)
        {
            self.cursor = position;
        }

        // Starting mpv can take seconds; let the caller redraw first
        if !self.playback.engine().is_initialized() {
            self.notify(Notice::info("Starting player..."));
            self.starting = Some(channel);
            return;
        }

        self.play(&channel).await;
    }

    async fn play(&mut self, channel: &Channel) {
        if let Some(notice) = self.playback.select_channel(channel).await {
            self.notify(notice);
        }
    }

    /// True while a selection is waiting on [`Self::finish_player_start`].
    pub fn is_starting_player(&self) -> bool {
        self.starting.is_some()
    }

    /// Bring the player up and tune to the channel selected while it was down.
    pub async fn finish_player_start(&mut self) {
        if let Some(channel) = self.starting.take() {
            self.play(&channel).await;
        }
    }

    fn upload_playlist(&mut self, path: PathBuf) {
        info!("Uploading playlist {}", path.display());
        self.notify(Notice::info("Loading playlist..."));
        self.pending.push(Task::UploadPlaylist(path));
    }

    /// Apply the result of a finished network task.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::ChannelsLoaded(Ok(channels)) => {
                info!("Loaded {} channels", channels.len());
                self.session.replace_catalog(channels);
                self.cursor = 0;
            }
            Outcome::ChannelsLoaded(Err(e)) => {
                error!("Error loading channels: {:#}", e);
                self.notify(Notice::error("Error loading channels"));
            }
            Outcome::EpgLoaded(Ok(epg)) => {
                info!("Loaded EPG for {} channels", epg.len());
                self.session.replace_epg(epg);
            }
            Outcome::EpgLoaded(Err(e)) => {
                error!("Error loading EPG: {:#}", e);
            }
            Outcome::PlaylistUploaded(Ok(response)) if response.success => {
                let channels = response.channels.unwrap_or_default();
                let count = channels.len();
                info!("Playlist replaced catalog with {} channels", count);
                self.session.replace_catalog(channels);
                self.cursor = 0;
                self.pending.push(Task::FetchEpg);
                self.notify(Notice::success(format!("Loaded {} channels", count)));
            }
            Outcome::PlaylistUploaded(Ok(response)) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Error loading playlist".to_string());
                warn!("Playlist rejected: {}", message);
                self.notify(Notice::error(message));
            }
            Outcome::PlaylistUploaded(Err(e)) => {
                error!("Error uploading playlist: {:#}", e);
                self.notify(Notice::error("Error loading playlist"));
            }
        }
    }

    /// Periodic housekeeping. Returns true when the screen should be redrawn.
    pub fn tick(&mut self, now: Instant) -> bool {
        let notices = self.playback.poll();
        let had_notices = !notices.is_empty();
        for notice in notices {
            self.notify(notice);
        }

        let pruned = self.toasts.prune(now);
        had_notices || pruned || !self.toasts.is_empty()
    }

    pub fn screen(&self) -> Screen {
        view::render(
            &self.session,
            RenderContext {
                avatar: &self.avatar,
                now: Local::now().naive_local(),
                playback: self.playback.state(),
                toasts: self.toasts.views(Instant::now()),
            },
        )
    }

    pub async fn shutdown(&mut self) {
        self.playback.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EpgMap, UploadResponse};
    use crate::player::PlayerEvent;
    use crate::player::testing::FakeEngine;
    use crate::toast::Severity;
    use crate::view::ChannelListView;
    use crossterm::event::KeyModifiers;

    fn channel(name: &str, category: &str) -> Channel {
        Channel {
            name: name.to_string(),
            logo: None,
            category: Some(category.to_string()),
            stream_url: format!("https://example.com/{}.m3u8", name),
            epg_id: None,
        }
    }

    fn app_with(engine: FakeEngine) -> App<FakeEngine> {
        let mut app = App::new(engine, AvatarConfig::default());
        app.take_tasks();
        app.apply(Outcome::ChannelsLoaded(Ok(vec![
            channel("BBC News", "News"),
            channel("Euronews", "News"),
            channel("NASA Live", "Science"),
        ])));
        app
    }

    /// Loaded catalog with the player already running.
    fn loaded_app() -> App<FakeEngine> {
        app_with(FakeEngine {
            initialized: true,
            ..Default::default()
        })
    }

    fn toasts(app: &App<FakeEngine>) -> Vec<(String, Severity)> {
        app.toasts
            .views(Instant::now())
            .into_iter()
            .map(|t| (t.message, t.severity))
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_startup_fetches_catalog_and_epg() {
        let mut app = App::new(FakeEngine::default(), AvatarConfig::default());
        assert_eq!(app.take_tasks(), vec![Task::FetchChannels, Task::FetchEpg]);
        assert!(app.take_tasks().is_empty());
    }

    #[tokio::test]
    async fn test_upload_replaces_catalog() {
        let mut app = loaded_app();
        app.dispatch(Command::UploadPlaylist(PathBuf::from("/tmp/list.m3u")))
            .await;
        assert_eq!(
            app.take_tasks(),
            vec![Task::UploadPlaylist(PathBuf::from("/tmp/list.m3u"))]
        );
        assert_eq!(
            toasts(&app),
            vec![("Loading playlist...".to_string(), Severity::Info)]
        );

        app.apply(Outcome::PlaylistUploaded(Ok(UploadResponse {
            success: true,
            channels: Some(vec![
                channel("Kids One", "Kids"),
                channel("Music Box", "Music"),
                channel("Kids Two", "Kids"),
            ]),
            error: None,
        })));

        assert_eq!(app.session.visible().len(), 3);
        assert_eq!(catalog::filter(app.session.catalog(), "kids", "").len(), 2);
        let labels: Vec<String> = app
            .session
            .category_options()
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["All Categories", "Kids", "Music"]);
        assert_eq!(app.take_tasks(), vec![Task::FetchEpg]);
        assert!(toasts(&app).contains(&("Loaded 3 channels".to_string(), Severity::Success)));
    }

    #[test]
    fn test_rejected_upload_keeps_catalog() {
        let mut app = loaded_app();
        app.apply(Outcome::PlaylistUploaded(Ok(UploadResponse {
            success: false,
            channels: None,
            error: Some("No valid channels found in playlist".to_string()),
        })));

        assert_eq!(app.session.catalog().len(), 3);
        assert!(app.take_tasks().is_empty());
        assert_eq!(
            toasts(&app),
            vec![(
                "No valid channels found in playlist".to_string(),
                Severity::Error
            )]
        );
    }

    #[test]
    fn test_failed_requests_surface_toasts() {
        let mut app = loaded_app();
        app.apply(Outcome::PlaylistUploaded(Err(anyhow::anyhow!("connection refused"))));
        app.apply(Outcome::ChannelsLoaded(Err(anyhow::anyhow!("connection refused"))));
        app.apply(Outcome::EpgLoaded(Err(anyhow::anyhow!("connection refused"))));

        assert_eq!(
            toasts(&app),
            vec![
                ("Error loading playlist".to_string(), Severity::Error),
                ("Error loading channels".to_string(), Severity::Error),
            ]
        );
        assert_eq!(app.session.catalog().len(), 3);
    }

    #[test]
    fn test_epg_replaces_map() {
        let mut app = loaded_app();
        let mut epg = EpgMap::new();
        epg.insert("bbc_news".to_string(), Vec::new());
        app.apply(Outcome::EpgLoaded(Ok(epg)));
        assert!(app.session.epg().contains_key("bbc_news"));
    }

    #[tokio::test]
    async fn test_select_and_navigate() {
        let mut app = loaded_app();

        // Nothing selected yet, arrows do nothing
        app.dispatch(Command::Navigate(1)).await;
        assert!(app.session.selected().is_none());

        app.dispatch(Command::SelectChannel("BBC News".to_string()))
            .await;
        assert_eq!(app.playback_state(), PlaybackState::Playing);

        app.dispatch(Command::Navigate(1)).await;
        assert_eq!(app.session.selected().unwrap().name, "Euronews");
        assert_eq!(app.cursor, 1);

        app.dispatch(Command::SetCategory("News".to_string())).await;
        app.dispatch(Command::Navigate(1)).await;
        assert_eq!(app.session.selected().unwrap().name, "Euronews");

        let screen = app.screen();
        let ChannelListView::Items(items) = screen.channel_list else {
            panic!("expected items");
        };
        assert!(items[1].active);
        assert_eq!(screen.carousel.active_index, Some(1));
    }

    #[tokio::test]
    async fn test_cursor_activation() {
        let mut app = loaded_app();
        app.dispatch(Command::MoveCursor(5)).await;
        assert_eq!(app.cursor, 2);
        app.dispatch(Command::MoveCursor(-1)).await;
        app.dispatch(Command::ActivateCursor).await;
        assert_eq!(app.session.selected().unwrap().name, "Euronews");
    }

    #[tokio::test]
    async fn test_search_filters_live() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('/'))).await;
        assert_eq!(app.mode, InputMode::Search);

        for c in "NEWS".chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
        assert_eq!(app.session.search_term(), "NEWS");
        assert_eq!(app.session.visible().len(), 2);

        // Shortcut keys are plain text while typing
        app.handle_key(key(KeyCode::Char('f'))).await;
        assert_eq!(app.session.visible().len(), 0);
        assert!(toasts(&app).is_empty());

        app.handle_key(key(KeyCode::Esc)).await;
        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.session.visible().len(), 3);
    }

    #[tokio::test]
    async fn test_upload_prompt() {
        let mut app = loaded_app();
        app.handle_key(key(KeyCode::Char('u'))).await;
        for c in "/tmp/a.m3u".chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
        app.handle_key(key(KeyCode::Enter)).await;

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(
            app.take_tasks(),
            vec![Task::UploadPlaylist(PathBuf::from("/tmp/a.m3u"))]
        );
    }

    #[tokio::test]
    async fn test_cycle_category_wraps() {
        let mut app = loaded_app();
        app.dispatch(Command::CycleCategory(1)).await;
        assert_eq!(app.session.category(), "News");
        app.dispatch(Command::CycleCategory(1)).await;
        assert_eq!(app.session.category(), "Science");
        app.dispatch(Command::CycleCategory(1)).await;
        assert_eq!(app.session.category(), "");
        app.dispatch(Command::CycleCategory(-1)).await;
        assert_eq!(app.session.category(), "Science");
    }

    #[tokio::test]
    async fn test_player_error_becomes_toast() {
        let mut app = loaded_app();
        app.dispatch(Command::SelectChannel("NASA Live".to_string()))
            .await;

        app.playback
            .engine_mut()
            .pending
            .push(PlayerEvent::Error("loading failed".to_string()));
        assert!(app.tick(Instant::now()));

        assert_eq!(app.playback_state(), PlaybackState::Errored);
        assert_eq!(
            toasts(&app),
            vec![(
                crate::player::STREAM_ERROR_MESSAGE.to_string(),
                Severity::Error
            )]
        );
    }

    #[tokio::test]
    async fn test_fullscreen_before_playback_is_unsupported() {
        let mut app = app_with(FakeEngine::default());
        app.handle_key(key(KeyCode::Char('f'))).await;
        assert_eq!(
            toasts(&app),
            vec![("Fullscreen not supported".to_string(), Severity::Error)]
        );
    }

    #[tokio::test]
    async fn test_first_selection_waits_for_redraw_before_starting_player() {
        let mut app = app_with(FakeEngine::default());
        app.dispatch(Command::SelectChannel("BBC News".to_string()))
            .await;

        // Selection and feedback land before the engine is touched
        assert_eq!(app.session.selected().unwrap().name, "BBC News");
        assert!(app.is_starting_player());
        assert_eq!(app.playback.engine().initialize_calls, 0);
        assert_eq!(app.playback_state(), PlaybackState::Uninitialized);
        assert_eq!(
            toasts(&app),
            vec![("Starting player...".to_string(), Severity::Info)]
        );

        app.finish_player_start().await;
        assert!(!app.is_starting_player());
        assert_eq!(app.playback.engine().initialize_calls, 1);
        assert_eq!(app.playback_state(), PlaybackState::Playing);
        assert_eq!(
            app.playback.engine().loaded,
            vec![(
                "https://example.com/BBC News.m3u8".to_string(),
                "BBC News".to_string()
            )]
        );

        // Once running, selections tune straight away
        app.dispatch(Command::Navigate(1)).await;
        assert!(!app.is_starting_player());
        assert_eq!(app.playback.engine().loaded.len(), 2);
    }

    #[tokio::test]
    async fn test_player_start_failure_is_reported() {
        let mut app = app_with(FakeEngine {
            fail_initialize: true,
            ..Default::default()
        });
        app.dispatch(Command::SelectChannel("BBC News".to_string()))
            .await;
        app.finish_player_start().await;

        assert_eq!(app.playback_state(), PlaybackState::Uninitialized);
        let messages = toasts(&app);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].1, Severity::Error);
        assert!(messages[1].0.starts_with("Failed to start player"));
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))).await, Flow::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .await,
            Flow::Quit
        );
    }
}
