// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::{PlayerEngine, PlayerEvent};
use crate::config::PlayerConfig;

/// Observation id for the `pause` property on the event connection.
const PAUSE_OBSERVER_ID: u64 = 1;

/// mpv driven over its JSON IPC socket. mpv handles HLS natively.
pub struct MpvEngine {
    config: PlayerConfig,
    socket_path: PathBuf,
    mpv_process: Option<Child>,
    events: Option<Receiver<PlayerEvent>>,
}

impl MpvEngine {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            socket_path: Self::get_socket_path(),
            mpv_process: None,
            events: None,
        }
    }

    /// Check that the configured player binary runs at all.
    pub fn is_available(config: &PlayerConfig) -> bool {
        Command::new(&config.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Play a stream in a foreground mpv window and wait for it to close.
    pub fn play_blocking(config: &PlayerConfig, url: &str, title: &str) -> Result<()> {
        let status = Command::new(&config.command)
            .args(&config.args)
            .arg(format!("--force-media-title={}", title))
            .arg("--force-window=yes")
            .arg(url)
            .status()
            .with_context(|| format!("Failed to start {}", config.command))?;

        if !status.success()
            && let Some(code) = status.code()
        {
            // Exit code 4 is a normal user quit in mpv
            if code != 4 {
                return Err(anyhow::anyhow!("{} exited with code: {}", config.command, code));
            }
        }

        Ok(())
    }

    /// Per-process socket under `$XDG_STATE_HOME/livechannels`, so lifecycle
    /// events only ever come from the instance this process launched.
    fn get_socket_path() -> PathBuf {
        let socket_name = format!("mpv-{}.sock", std::process::id());

        let Some(state_dir) = dirs::state_dir().or_else(|| {
            dirs::home_dir().map(|home| home.join(".local").join("state"))
        }) else {
            return Self::temp_socket_path();
        };

        let app_dir = state_dir.join("livechannels");

        if !app_dir.exists() {
            if let Err(e) = fs::create_dir_all(&app_dir) {
                warn!("Failed to create state directory: {}", e);
                return Self::temp_socket_path();
            }
            if let Err(e) = fs::set_permissions(&app_dir, fs::Permissions::from_mode(0o700)) {
                warn!("Failed to set permissions on state directory: {}", e);
            }
        }

        app_dir.join(socket_name)
    }

    fn temp_socket_path() -> PathBuf {
        let uid = unsafe { libc::getuid() };
        std::env::temp_dir().join(format!(
            "livechannels-mpv-{}-{}.sock",
            uid,
            std::process::id()
        ))
    }

    fn send_command(&self, command: Value) -> Result<Value> {
        let mut socket = UnixStream::connect(&self.socket_path).with_context(|| {
            format!("Failed to connect to mpv socket at {:?}", self.socket_path)
        })?;
        socket.set_read_timeout(Some(Duration::from_secs(2)))?;

        let command_str = serde_json::to_string(&command)?;
        debug!("Sending mpv command: {}", command_str);

        socket.write_all(command_str.as_bytes())?;
        socket.write_all(b"\n")?;

        // Skip asynchronous events that may arrive before the reply
        let reader = BufReader::new(socket);
        for line in reader.lines() {
            let line = line.context("Failed to read mpv response")?;
            let parsed: Value = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse mpv response: {}", line))?;

            if parsed.get("event").is_some() {
                continue;
            }

            if let Some(error) = parsed.get("error").and_then(|e| e.as_str())
                && error != "success"
            {
                return Err(anyhow::anyhow!("mpv command failed: {}", error));
            }

            return Ok(parsed);
        }

        Err(anyhow::anyhow!("mpv closed the connection without replying"))
    }

    fn set_property(&self, name: &str, value: Value) -> Result<()> {
        self.send_command(json!({ "command": ["set_property", name, value] }))?;
        Ok(())
    }

    fn get_property(&self, name: &str) -> Result<Value> {
        let response = self.send_command(json!({ "command": ["get_property", name] }))?;
        Ok(response.get("data").cloned().unwrap_or(Value::Null))
    }

    fn is_socket_ready(&self) -> bool {
        self.socket_path.exists() && UnixStream::connect(&self.socket_path).is_ok()
    }

    /// Open a dedicated connection that receives mpv's broadcast events and
    /// forward the interesting ones.
    fn start_event_listener(&mut self) -> Result<()> {
        let mut socket = UnixStream::connect(&self.socket_path)
            .context("Failed to open mpv event connection")?;

        let observe = json!({ "command": ["observe_property", PAUSE_OBSERVER_ID, "pause"] });
        socket.write_all(serde_json::to_string(&observe)?.as_bytes())?;
        socket.write_all(b"\n")?;

        let (sender, receiver) = mpsc::channel();
        self.events = Some(receiver);

        thread::spawn(move || Self::read_events(socket, sender));
        Ok(())
    }

    fn read_events(socket: UnixStream, sender: Sender<PlayerEvent>) {
        let reader = BufReader::new(socket);
        for line in reader.lines().map_while(std::result::Result::ok) {
            let Ok(message) = serde_json::from_str::<Value>(&line) else {
                debug!("Ignoring unparsable mpv message: {}", line);
                continue;
            };

            if let Some(event) = parse_event(&message)
                && sender.send(event).is_err()
            {
                return;
            }
        }

        debug!("mpv event connection closed");
        let _ = sender.send(PlayerEvent::Closed);
    }

    fn stop_process(&mut self) {
        if let Some(mut child) = self.mpv_process.take() {
            match child.try_wait() {
                Ok(Some(_)) => debug!("mpv process already exited"),
                _ => {
                    debug!("Terminating mpv process");
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }

        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }
        self.events = None;
    }
}

/// Map one mpv IPC message to a lifecycle event.
fn parse_event(message: &Value) -> Option<PlayerEvent> {
    match message.get("event")?.as_str()? {
        "playback-restart" => Some(PlayerEvent::Play),
        "end-file" => match message.get("reason").and_then(Value::as_str) {
            Some("error") => Some(PlayerEvent::Error(
                message
                    .get("file_error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            )),
            Some("eof") => Some(PlayerEvent::Ended),
            _ => None,
        },
        "property-change"
            if message.get("id").and_then(Value::as_u64) == Some(PAUSE_OBSERVER_ID) =>
        {
            match message.get("data").and_then(Value::as_bool)? {
                true => Some(PlayerEvent::Paused),
                false => Some(PlayerEvent::Play),
            }
        }
        "shutdown" => Some(PlayerEvent::Closed),
        _ => None,
    }
}

impl PlayerEngine for MpvEngine {
    async fn initialize(&mut self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        // Leftover socket from a crashed run with a recycled pid
        if self.socket_path.exists() {
            let _ = fs::remove_file(&self.socket_path);
        }

        let mut cmd = Command::new(&self.config.command);
        cmd.arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--no-terminal")
            .arg("--really-quiet")
            .arg("--osc=yes")
            .arg("--title=Live Channels")
            .arg("--geometry=1280x720")
            .arg("--autofit-larger=90%x90%")
            .args(&self.config.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());

        debug!("Starting player: {:?}", cmd);

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}. Is it installed?", self.config.command))?;
        self.mpv_process = Some(child);

        for i in 0..20 {
            sleep(Duration::from_millis(250)).await;

            if let Some(ref mut proc) = self.mpv_process
                && let Ok(Some(status)) = proc.try_wait()
            {
                error!("mpv exited unexpectedly with status: {:?}", status);
                self.mpv_process = None;
                return Err(anyhow::anyhow!(
                    "mpv exited unexpectedly with status: {:?}",
                    status
                ));
            }

            if self.is_socket_ready() {
                debug!("mpv IPC socket ready after {} ms", (i + 1) * 250);
                return self.start_event_listener();
            }
        }

        self.stop_process();
        Err(anyhow::anyhow!("mpv IPC socket failed to start after 5 seconds"))
    }

    fn is_initialized(&self) -> bool {
        self.mpv_process.is_some() && self.events.is_some()
    }

    fn load_hls(&mut self, url: &str, title: &str) -> Result<()> {
        self.set_property("force-media-title", json!(title))?;
        self.send_command(json!({ "command": ["loadfile", url, "replace"] }))
            .with_context(|| format!("Failed to load {}", url))?;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.set_property("pause", json!(false))
    }

    fn pause(&mut self) -> Result<()> {
        self.set_property("pause", json!(true))
    }

    fn is_fullscreen(&self) -> Result<bool> {
        self.get_property("fullscreen")?
            .as_bool()
            .ok_or_else(|| anyhow::anyhow!("mpv returned a non-boolean fullscreen property"))
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        self.set_property("fullscreen", json!(fullscreen))
    }

    fn poll_events(&mut self) -> Vec<PlayerEvent> {
        let mut events: Vec<PlayerEvent> = self
            .events
            .as_ref()
            .map(|receiver| receiver.try_iter().collect())
            .unwrap_or_default();

        if let Some(ref mut proc) = self.mpv_process
            && let Ok(Some(status)) = proc.try_wait()
        {
            debug!("mpv process has exited with status: {:?}", status);
            self.stop_process();
            if !events.contains(&PlayerEvent::Closed) {
                events.push(PlayerEvent::Closed);
            }
        }

        events
    }

    async fn shutdown(&mut self) -> Result<()> {
        debug!("Shutting down mpv");
        if self.is_socket_ready() {
            let _ = self.send_command(json!({ "command": ["quit"] }));
            sleep(Duration::from_millis(100)).await;
        }
        self.stop_process();
        Ok(())
    }
}

impl Drop for MpvEngine {
    fn drop(&mut self) {
        self.stop_process();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_event() {
        let message = json!({"event": "end-file", "reason": "error", "file_error": "loading failed"});
        assert_eq!(
            parse_event(&message),
            Some(PlayerEvent::Error("loading failed".to_string()))
        );
    }

    #[test]
    fn test_parse_lifecycle_events() {
        assert_eq!(
            parse_event(&json!({"event": "playback-restart"})),
            Some(PlayerEvent::Play)
        );
        assert_eq!(
            parse_event(&json!({"event": "end-file", "reason": "eof"})),
            Some(PlayerEvent::Ended)
        );
        assert_eq!(
            parse_event(&json!({"event": "end-file", "reason": "stop"})),
            None
        );
        assert_eq!(
            parse_event(&json!({"event": "shutdown"})),
            Some(PlayerEvent::Closed)
        );
    }

    #[test]
    fn test_parse_pause_observation() {
        let paused = json!({"event": "property-change", "id": 1, "name": "pause", "data": true});
        let resumed = json!({"event": "property-change", "id": 1, "name": "pause", "data": false});
        let other = json!({"event": "property-change", "id": 7, "name": "volume", "data": 50});
        assert_eq!(parse_event(&paused), Some(PlayerEvent::Paused));
        assert_eq!(parse_event(&resumed), Some(PlayerEvent::Play));
        assert_eq!(parse_event(&other), None);
    }

    #[test]
    fn test_replies_are_not_events() {
        assert_eq!(parse_event(&json!({"error": "success", "request_id": 0})), None);
    }

    #[test]
    fn test_uninitialized_engine() {
        let mut engine = MpvEngine::new(PlayerConfig::default());
        assert!(!engine.is_initialized());
        assert!(engine.poll_events().is_empty());
    }
}
