// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Key bindings. Translates raw key events into [`Command`]s; all state
//! changes happen in the command handlers on `App`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetSearch(String),
    SetCategory(String),
    CycleCategory(isize),
    SelectChannel(String),
    /// Select the channel adjacent to the current one in the visible list.
    Navigate(isize),
    MoveCursor(isize),
    ActivateCursor,
    TogglePause,
    ToggleFullscreen,
    ExitFullscreen,
    BeginSearch,
    BeginUpload,
    UploadPlaylist(PathBuf),
    Reload,
    ToggleHelp,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    UploadPath,
}

/// Result of feeding a key to a text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Changed,
    Submit,
    Cancel,
    Ignored,
}

pub fn is_force_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Bindings outside of any text prompt.
pub fn normal_key(key: &KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('/') => Some(Command::BeginSearch),
        KeyCode::Char('c') => Some(Command::CycleCategory(1)),
        KeyCode::Char('C') => Some(Command::CycleCategory(-1)),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::MoveCursor(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::MoveCursor(1)),
        KeyCode::Enter => Some(Command::ActivateCursor),
        KeyCode::Left => Some(Command::Navigate(-1)),
        KeyCode::Right => Some(Command::Navigate(1)),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('f') => Some(Command::ToggleFullscreen),
        KeyCode::Esc => Some(Command::ExitFullscreen),
        KeyCode::Char('u') => Some(Command::BeginUpload),
        KeyCode::Char('r') => Some(Command::Reload),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Command::ToggleHelp),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

/// Line editing for the search and upload prompts.
pub fn edit_key(key: &KeyEvent, buffer: &mut String) -> Edit {
    match key.code {
        KeyCode::Enter => Edit::Submit,
        KeyCode::Esc => Edit::Cancel,
        KeyCode::Backspace => {
            if buffer.pop().is_some() {
                Edit::Changed
            } else {
                Edit::Ignored
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            Edit::Changed
        }
        _ => Edit::Ignored,
    }
}

/// Turn a typed path into a `PathBuf`, expanding a leading `~/`.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
