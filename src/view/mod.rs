// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Pure state-to-view functions. Nothing in here mutates state or performs I/O;
//! the TUI draws whatever these produce.

pub mod logo;

use chrono::NaiveDateTime;

use crate::catalog::CategoryOption;
use crate::config::AvatarConfig;
use crate::epg::{ProgramView, resolve_schedule};
use crate::model::{Channel, EpgMap};
use crate::player::PlaybackState;
use crate::session::Session;
use crate::toast::ToastView;

pub use logo::{CAROUSEL_AVATAR_SIZE, LIST_AVATAR_SIZE, LogoView, avatar_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub text: &'static str,
}

pub const NO_CHANNELS: EmptyState = EmptyState {
    icon: "📡",
    text: "No channels found",
};

pub const NO_GUIDE: EmptyState = EmptyState {
    icon: "📋",
    text: "No program guide available",
};

/// One channel in the list or carousel. `name` is the identity used to match
/// the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelItemView {
    pub name: String,
    pub category: String,
    pub logo: LogoView,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelListView {
    Empty(EmptyState),
    Items(Vec<ChannelItemView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselView {
    pub items: Vec<ChannelItemView>,
    /// Index of the active tile, which should be scrolled into view.
    pub active_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgChannelView {
    pub name: String,
    pub logo: LogoView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpgPanelView {
    /// Nothing selected yet.
    Hidden,
    Empty(EmptyState),
    Schedule {
        channel: EpgChannelView,
        programs: Vec<ProgramView>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlayingView {
    Idle,
    Channel { title: String, logo: LogoView },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelectView {
    pub options: Vec<CategoryOption>,
    /// Index into `options` of the current value.
    pub selected: usize,
}

/// Everything on screen for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub search: String,
    pub categories: CategorySelectView,
    pub channel_list: ChannelListView,
    pub carousel: CarouselView,
    pub now_playing: NowPlayingView,
    pub playback: PlaybackState,
    pub epg: EpgPanelView,
    pub toasts: Vec<ToastView>,
}

/// Inputs to rendering that are not part of the session.
pub struct RenderContext<'a> {
    pub avatar: &'a AvatarConfig,
    pub now: NaiveDateTime,
    pub playback: PlaybackState,
    pub toasts: Vec<ToastView>,
}

fn channel_item(
    channel: &Channel,
    selected: Option<&str>,
    avatar: &AvatarConfig,
    size: u32,
) -> ChannelItemView {
    ChannelItemView {
        name: channel.name.clone(),
        category: channel.category.clone().unwrap_or_default(),
        logo: LogoView::new(avatar, &channel.name, channel.logo_url(), size),
        active: selected == Some(channel.name.as_str()),
    }
}

pub fn render_channel_list(
    channels: &[&Channel],
    selected: Option<&str>,
    avatar: &AvatarConfig,
) -> ChannelListView {
    if channels.is_empty() {
        return ChannelListView::Empty(NO_CHANNELS);
    }

    ChannelListView::Items(
        channels
            .iter()
            .map(|ch| channel_item(ch, selected, avatar, LIST_AVATAR_SIZE))
            .collect(),
    )
}

pub fn render_carousel(
    channels: &[&Channel],
    selected: Option<&str>,
    avatar: &AvatarConfig,
) -> CarouselView {
    let items: Vec<ChannelItemView> = channels
        .iter()
        .map(|ch| channel_item(ch, selected, avatar, CAROUSEL_AVATAR_SIZE))
        .collect();
    let active_index = items.iter().position(|item| item.active);

    CarouselView {
        items,
        active_index,
    }
}

pub fn render_epg(
    selected: Option<&Channel>,
    epg: &EpgMap,
    now: NaiveDateTime,
    avatar: &AvatarConfig,
) -> EpgPanelView {
    let Some(channel) = selected else {
        return EpgPanelView::Hidden;
    };

    let programs = resolve_schedule(channel, epg, now);
    if programs.is_empty() {
        return EpgPanelView::Empty(NO_GUIDE);
    }

    EpgPanelView::Schedule {
        channel: EpgChannelView {
            name: channel.name.clone(),
            logo: LogoView::new(avatar, &channel.name, channel.logo_url(), LIST_AVATAR_SIZE),
        },
        programs,
    }
}

pub fn render_now_playing(selected: Option<&Channel>, avatar: &AvatarConfig) -> NowPlayingView {
    match selected {
        None => NowPlayingView::Idle,
        Some(channel) => NowPlayingView::Channel {
            title: channel.name.clone(),
            logo: LogoView::new(avatar, &channel.name, channel.logo_url(), LIST_AVATAR_SIZE),
        },
    }
}

pub fn render_categories(options: Vec<CategoryOption>, current: &str) -> CategorySelectView {
    let selected = options
        .iter()
        .position(|o| o.value == current)
        .unwrap_or(0);
    CategorySelectView { options, selected }
}

pub fn render(session: &Session, ctx: RenderContext<'_>) -> Screen {
    let visible = session.visible();
    let selected_name = session.selected().map(|ch| ch.name.as_str());

    Screen {
        search: session.search_term().to_string(),
        categories: render_categories(session.category_options(), session.category()),
        channel_list: render_channel_list(&visible, selected_name, ctx.avatar),
        carousel: render_carousel(&visible, selected_name, ctx.avatar),
        now_playing: render_now_playing(session.selected(), ctx.avatar),
        playback: ctx.playback,
        epg: render_epg(session.selected(), session.epg(), ctx.now, ctx.avatar),
        toasts: ctx.toasts,
    }
}
