// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use std::time::{Duration, Instant};

/// How long a toast stays fully visible.
pub const DISPLAY_DURATION: Duration = Duration::from_secs(3);
/// Exit animation that follows the display period.
pub const EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A user-facing notification produced by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    notice: Notice,
    shown_at: Instant,
}

/// A toast as it should appear at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub severity: Severity,
    /// True during the exit animation.
    pub leaving: bool,
}

/// Transient notifications, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice, now: Instant) {
        self.toasts.push(Toast {
            notice,
            shown_at: now,
        });
    }

    /// Drop toasts whose exit animation has finished. Returns true if any were removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < DISPLAY_DURATION + EXIT_DURATION);
        self.toasts.len() != before
    }

    pub fn views(&self, now: Instant) -> Vec<ToastView> {
        self.toasts
            .iter()
            .filter_map(|t| {
                let age = now.saturating_duration_since(t.shown_at);
                if age >= DISPLAY_DURATION + EXIT_DURATION {
                    return None;
                }
                Some(ToastView {
                    message: t.notice.message.clone(),
                    severity: t.notice.severity,
                    leaving: age >= DISPLAY_DURATION,
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
