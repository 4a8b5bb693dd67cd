// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}

pub fn get_help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Live Channels - Help",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        section("Channels:"),
        Line::from("  ↑/k ↓/j   - Move the list cursor"),
        Line::from("  Enter     - Play the highlighted channel"),
        Line::from("  ←/→       - Previous/next channel"),
        Line::from("  /         - Search by name"),
        Line::from("  c/C       - Next/previous category"),
        Line::from(""),
        section("Playback:"),
        Line::from("  Space     - Pause/resume"),
        Line::from("  f         - Toggle fullscreen"),
        Line::from("  Esc       - Leave fullscreen"),
        Line::from(""),
        section("Playlist:"),
        Line::from("  u         - Upload an M3U playlist"),
        Line::from("  r         - Reload channels and guide"),
        Line::from(""),
        section("General:"),
        Line::from("  ?/F1      - Toggle this help"),
        Line::from("  q         - Quit"),
        Line::from("  Ctrl+C    - Force quit"),
        Line::from(""),
        Line::from("Press Esc, ? or F1 to close this help"),
    ]
}

pub fn create_help_widget() -> Paragraph<'static> {
    Paragraph::new(get_help_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Help "),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}
