// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use url::Url;

use crate::config::AvatarConfig;

/// Avatar size for list rows and the EPG header.
pub const LIST_AVATAR_SIZE: u32 = 96;
/// Avatar size for carousel tiles.
pub const CAROUSEL_AVATAR_SIZE: u32 = 200;

/// Generated avatar image for an entity without a logo. Deterministic in `name`.
pub fn avatar_url(style: &AvatarConfig, name: &str, size: u32) -> String {
    format!(
        "{}?name={}&background={}&color={}&size={}",
        style.base_url,
        urlencoding::encode(name),
        style.background,
        style.color,
        size
    )
}

/// An image reference with a single generated-avatar fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoView {
    pub src: String,
    pub alt: String,
    fallback: String,
}

impl LogoView {
    /// Logo for `name`, using `logo` when it is present and loadable.
    pub fn new(style: &AvatarConfig, name: &str, logo: Option<&str>, size: u32) -> Self {
        let fallback = avatar_url(style, name, size);
        let view = Self {
            src: logo.unwrap_or(&fallback).to_string(),
            alt: name.to_string(),
            fallback,
        };

        // A terminal cannot load the image; a URL that does not even parse
        // counts as a failed load.
        if Url::parse(&view.src).is_err() {
            view.on_error()
        } else {
            view
        }
    }

    /// The view after the image failed to load: the generated avatar. Applying
    /// this again yields the same view, so there is no retry loop.
    pub fn on_error(&self) -> Self {
        Self {
            src: self.fallback.clone(),
            alt: self.alt.clone(),
            fallback: self.fallback.clone(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.src == self.fallback
    }
}
