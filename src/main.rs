mod board;
mod canvas;
mod constants;
mod game;
mod input;
mod piece;
mod session;
mod timer;

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use nanorand::WyRand;
use piston_window::{
    AdvancedWindow, Button, PistonWindow, PressEvent, UpdateEvent, WindowSettings,
};

use crate::canvas::Canvas;
use crate::constants::{DEFAULT_BLOCK_SIZE, TITLE};
use crate::game::Game;
use crate::session::{Message, Notice, Session};

/// A falling-block puzzle game.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for piece generation. Random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Size of one board cell in pixels.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = clap::value_parser!(u32).range(4..=128))]
    block_size: u32,

    /// Start playing right away instead of waiting for Return.
    #[arg(long)]
    autostart: bool,
}

fn title_for(notice: Notice) -> Option<String> {
    match notice {
        Notice::Score { score, level } => {
            Some(format!("{TITLE} | score {score} | level {level}"))
        }
        Notice::GameOver { score } => Some(format!(
            "{TITLE} | game over, score {score} | press Return to play again"
        )),
        Notice::Redraw => None,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let rng = match args.seed {
        Some(seed) => {
            log::info!("using seed {seed}");
            WyRand::new_seed(seed)
        }
        None => WyRand::new(),
    };

    let size = canvas::window_size(args.block_size);
    let mut window: PistonWindow =
        WindowSettings::new(format!("{TITLE} | press Return to start"), size)
            .exit_on_esc(true)
            .resizable(false)
            .build()
            .map_err(|e| anyhow!("failed to open window: {e}"))?;

    let mut canvas = Canvas::new(&mut window, args.block_size);
    let mut session = Session::new(Game::new(rng));
    if args.autostart {
        session.post(Message::Start);
    }

    while let Some(e) = window.next() {
        if let Some(Button::Keyboard(key)) = e.press_args() {
            if let Some(command) = input::command_for_key(key) {
                session.post(command.into());
            }
        }
        if let Some(update) = e.update_args() {
            session.advance(Duration::from_secs_f64(update.dt));
        }

        for notice in session.pump() {
            match notice {
                Notice::GameOver { score } => log::info!("final score {score}"),
                Notice::Score { .. } => {
                    log::debug!("ticking every {:?}", session.tick_interval())
                }
                Notice::Redraw => canvas.invalidate(),
            }
            if let Some(title) = title_for(notice) {
                window.set_title(title);
            }
        }

        window.draw_2d(&e, |c, g, _| {
            if let Err(err) = canvas.render(session.game(), c, g) {
                log::error!("skipping frame: {err:#}");
            }
        });
    }

    Ok(())
}
