// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod app;
pub mod event;
pub mod input;
pub mod tasks;
pub mod ui;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Instant;

use crate::api::ChannelApi;
use crate::config::Config;
use crate::player::{MpvEngine, PlayerEngine};

pub use app::{App, Flow};
pub use event::{Event, EventHandler};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    pub event_handler: EventHandler,
}

impl Tui {
    pub fn new(tick_rate: u64) -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let event_handler = EventHandler::new(tick_rate);
        Ok(Self {
            terminal,
            event_handler,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw<E: PlayerEngine>(&mut self, app: &App<E>) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

pub async fn run_tui(config: Config, api: ChannelApi) -> Result<()> {
    let mut tui = Tui::new(config.ui.tick_rate_ms)?;
    tui.init()?;

    let engine = MpvEngine::new(config.player.clone());
    let mut app = App::new(engine, config.ui.avatar.clone());
    let res = run_app(&mut tui, &mut app, &api).await;

    // Stop mpv before handing the terminal back
    app.shutdown().await;

    tui.exit()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<E: PlayerEngine>(tui: &mut Tui, app: &mut App<E>, api: &ChannelApi) -> Result<()> {
    tui.draw(app)?;

    loop {
        for task in app.take_tasks() {
            tasks::spawn(api, task, tui.event_handler.sender());
        }

        let should_redraw = match tui.event_handler.next().await? {
            Event::Key(key_event) => match app.handle_key(key_event).await {
                Flow::Quit => break,
                Flow::Continue => true,
            },
            Event::Resize(_, _) => true,
            Event::Outcome(outcome) => {
                app.apply(outcome);
                true
            }
            Event::Tick => app.tick(Instant::now()),
        };

        if should_redraw {
            tui.draw(app)?;
        }

        // Starting the player blocks this task, so do it after the toast is on screen
        if app.is_starting_player() {
            app.finish_player_start().await;
            tui.draw(app)?;
        }
    }

    Ok(())
}
