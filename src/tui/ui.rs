// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::app::App;
use super::input::InputMode;
use super::widgets::{centered_rect, create_help_widget};
use crate::player::{PlaybackState, PlayerEngine};
use crate::toast::{Severity, ToastView};
use crate::view::{
    CarouselView, ChannelListView, EmptyState, EpgPanelView, NowPlayingView, Screen,
};

const TILE_WIDTH: u16 = 22;

pub fn draw<E: PlayerEngine>(frame: &mut Frame, app: &App<E>) {
    let size = frame.area();
    let screen = app.screen();

    // Header, carousel, content, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    draw_header(frame, app, &screen, chunks[0]);
    draw_carousel(frame, &screen.carousel, chunks[1]);
    draw_content(frame, app, &screen, chunks[2]);
    draw_footer(frame, app, chunks[3]);

    draw_toasts(frame, &screen.toasts, size);

    if app.show_help {
        draw_help_overlay(frame, size);
    }
}

fn draw_header<E: PlayerEngine>(frame: &mut Frame, app: &App<E>, screen: &Screen, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(32)])
        .split(area);

    let searching = app.mode == InputMode::Search;
    let search_text = if searching {
        format!("{}▏", app.prompt)
    } else if screen.search.is_empty() {
        "Press / to search channels".to_string()
    } else {
        screen.search.clone()
    };
    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else if screen.search.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if searching {
                Color::Yellow
            } else {
                Color::Blue
            }))
            .title(" Search "),
    );
    frame.render_widget(search, chunks[0]);

    let label = screen
        .categories
        .options
        .get(screen.categories.selected)
        .map(|o| o.label.as_str())
        .unwrap_or_default();
    let categories = Paragraph::new(format!("◀ {} ▶", label))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Category (c/C) "),
        );
    frame.render_widget(categories, chunks[1]);
}

/// First tile to draw so that `active` sits roughly in the middle.
fn carousel_start(len: usize, fits: usize, active: Option<usize>) -> usize {
    let Some(active) = active else {
        return 0;
    };
    if len <= fits {
        return 0;
    }
    active.saturating_sub(fits / 2).min(len - fits)
}

fn draw_carousel(frame: &mut Frame, carousel: &CarouselView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Channels ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if carousel.items.is_empty() || inner.width == 0 {
        return;
    }

    let fits = ((inner.width / TILE_WIDTH) as usize).max(1);
    let start = carousel_start(carousel.items.len(), fits, carousel.active_index);

    let mut spans = Vec::new();
    let mut categories = Vec::new();
    for item in carousel.items.iter().skip(start).take(fits) {
        let width = TILE_WIDTH as usize - 2;
        let name: String = item.name.chars().take(width).collect();
        let category: String = item.category.chars().take(width).collect();
        let style = if item.active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {:<width$} ", name, width = width), style));
        categories.push(Span::styled(
            format!(" {:<width$} ", category, width = width),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let tiles = Paragraph::new(vec![Line::from(spans), Line::from(categories)]);
    frame.render_widget(tiles, inner);
}

fn draw_content<E: PlayerEngine>(frame: &mut Frame, app: &App<E>, screen: &Screen, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_channel_list(frame, app.cursor, &screen.channel_list, chunks[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(chunks[1]);

    draw_now_playing(frame, &screen.now_playing, screen.playback, side[0]);
    draw_epg(frame, &screen.epg, side[1]);
}

fn empty_state(state: &EmptyState) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(state.icon),
        Line::from(state.text),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
}

fn draw_channel_list(frame: &mut Frame, cursor: usize, list: &ChannelListView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Channel List ");
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let items = match list {
        ChannelListView::Empty(state) => {
            frame.render_widget(empty_state(state), inner_area);
            return;
        }
        ChannelListView::Items(items) => items,
    };

    // Keep the cursor on screen
    let visible_height = inner_area.height as usize;
    let start = if visible_height == 0 {
        0
    } else {
        cursor.saturating_sub(visible_height - 1)
    };
    let end = (start + visible_height).min(items.len());

    let rows: Vec<ListItem> = items[start..end]
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let index = start + i;
            let marker = if index == cursor { " ▶ " } else { "   " };
            let mut style = Style::default();
            if item.active {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            if index == cursor {
                style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }

            let mut spans = vec![Span::raw(marker), Span::raw(item.name.clone())];
            if item.active {
                spans.push(Span::raw(" ●"));
            }
            if !item.category.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", item.category),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans).style(style))
        })
        .collect();

    frame.render_widget(List::new(rows), inner_area);
}

fn playback_style(state: PlaybackState) -> Style {
    match state {
        PlaybackState::Playing => Style::default().fg(Color::Green),
        PlaybackState::Errored => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

fn draw_now_playing(frame: &mut Frame, now_playing: &NowPlayingView, state: PlaybackState, area: Rect) {
    let lines = match now_playing {
        NowPlayingView::Idle => vec![
            Line::from("Select a channel to start watching")
                .style(Style::default().fg(Color::DarkGray)),
        ],
        NowPlayingView::Channel { title, logo } => vec![
            Line::from(title.clone())
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Line::from(state.to_string()).style(playback_style(state)),
            Line::from(logo.src.clone()).style(Style::default().fg(Color::DarkGray)),
        ],
    };

    let banner = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Now Playing "),
    );
    frame.render_widget(banner, area);
}

fn draw_epg(frame: &mut Frame, epg: &EpgPanelView, area: Rect) {
    let title = match epg {
        EpgPanelView::Schedule { channel, .. } => format!(" Program Guide: {} ", channel.name),
        _ => " Program Guide ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let programs = match epg {
        EpgPanelView::Hidden => return,
        EpgPanelView::Empty(state) => {
            frame.render_widget(empty_state(state), inner_area);
            return;
        }
        EpgPanelView::Schedule { programs, .. } => programs,
    };

    let mut lines = Vec::new();
    for program in programs {
        let (time_style, title_style) = if program.is_now_playing {
            (
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            (Style::default().fg(Color::Gray), Style::default().fg(Color::White))
        };

        let mut spans = vec![
            Span::styled(format!("{} - {}  ", program.start, program.end), time_style),
            Span::styled(program.title.clone(), title_style),
        ];
        if program.is_now_playing {
            spans.push(Span::styled(" [NOW]", Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(spans));

        if let Some(description) = &program.description {
            lines.push(
                Line::from(format!("    {}", description)).style(Style::default().fg(Color::DarkGray)),
            );
        }
    }

    let schedule = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(schedule, inner_area);
}

fn draw_footer<E: PlayerEngine>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let (text, style) = match app.mode {
        InputMode::UploadPath => (
            format!(" Playlist file: {}▏  (Enter: upload | Esc: cancel) ", app.prompt),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Search => (
            " Type to filter | Enter: keep filter | Esc: clear ".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        InputMode::Normal => (
            " ↑↓/jk: Move | Enter: Play | ←→: Prev/Next | Space: Pause | f: Fullscreen | u: Upload | ?: Help | q: Quit "
                .to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let footer = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(footer, area);
}

fn toast_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Blue,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}

/// Stack toasts in the bottom-right corner, newest at the bottom.
fn draw_toasts(frame: &mut Frame, toasts: &[ToastView], area: Rect) {
    let width = 44.min(area.width);
    let height = 3;
    let mut y = area.bottom().saturating_sub(3 + height);

    for toast in toasts.iter().rev() {
        if y < area.y {
            break;
        }
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y,
            width,
            height,
        };

        let mut style = Style::default().fg(toast_color(toast.severity));
        if toast.leaving {
            style = style.add_modifier(Modifier::DIM);
        }

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.message.clone())
                .style(style)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );

        y = y.saturating_sub(height);
    }
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, help_area);
    frame.render_widget(create_help_widget(), help_area);
}
