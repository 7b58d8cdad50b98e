use std::time::Duration;

use derivative::Derivative;
use nanorand::WyRand;

use crate::board::Board;
use crate::constants::*;
use crate::input::Intent;
use crate::piece::{create_piece, rotate, Piece};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// No session running yet.
    Idle,
    /// A session is running; the active piece may be waiting to spawn.
    Falling,
    GameOver,
}

/// Which branch a tick took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Idle,
    Spawned,
    Fell,
    Locked { lines: usize, level_up: bool },
    GameOver { score: u32 },
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Game {
    #[derivative(Debug = "ignore")]
    rng: WyRand,
    board: Board,
    state: GameState,
    score: u32,
    level: u32,
    current: Option<Piece>,
    next: Option<Piece>,
}

impl Game {
    pub fn new(rng: WyRand) -> Self {
        Self {
            rng,
            board: Board::new(),
            state: GameState::Idle,
            score: 0,
            level: 1,
            current: None,
            next: None,
        }
    }

    fn reset(&mut self) {
        self.board.clear();
        self.state = GameState::Idle;
        self.score = 0;
        self.level = 1;
        self.current = None;
        self.next = None;
    }

    /// Clears everything and begins a new session. The first piece appears
    /// on the next tick.
    pub fn start(&mut self) {
        self.reset();
        self.state = GameState::Falling;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick_interval(&self) -> Duration {
        BASE_TICK_INTERVAL / self.level
    }

    /// Advances the session by one tick.
    pub fn step(&mut self) -> StepOutcome {
        match self.state {
            GameState::Idle => return StepOutcome::Idle,
            GameState::GameOver => return StepOutcome::GameOver { score: self.score },
            GameState::Falling => {}
        }

        let Some(piece) = &mut self.current else {
            return if self.spawn() {
                StepOutcome::Spawned
            } else {
                StepOutcome::GameOver { score: self.score }
            };
        };

        if !self.board.is_collision(piece, 0, 1) {
            piece.y += 1;
            return StepOutcome::Fell;
        }

        let (lines, level_up) = self.lock();
        if self.spawn() {
            StepOutcome::Locked { lines, level_up }
        } else {
            StepOutcome::GameOver { score: self.score }
        }
    }

    fn lock(&mut self) -> (usize, bool) {
        let Some(piece) = self.current.take() else {
            return (0, false);
        };
        self.board.merge(&piece);
        let lines = self.board.clear_lines();
        self.score += lines as u32 * LINE_SCORE * self.level;

        let level_up = self.score >= self.level * LEVEL_SCORE_STEP;
        if level_up {
            self.level += 1;
            log::info!("level {} reached with score {}", self.level, self.score);
        }
        log::debug!(
            "locked {:?} piece at ({}, {}), cleared {lines}",
            piece.color,
            piece.x,
            piece.y
        );
        (lines, level_up)
    }

    /// Promotes the pending piece and draws a new one. Returns false, and
    /// ends the session, if the promoted piece has no room.
    fn spawn(&mut self) -> bool {
        let piece = match self.next.take() {
            Some(piece) => piece,
            None => create_piece(&mut self.rng),
        };
        self.next = Some(create_piece(&mut self.rng));

        if self.board.is_collision(&piece, 0, 0) {
            log::info!("game over, final score {}", self.score);
            self.state = GameState::GameOver;
            self.current = None;
            return false;
        }
        log::debug!("spawned {:?} piece at ({}, {})", piece.color, piece.x, piece.y);
        self.current = Some(piece);
        true
    }

    /// Applies a player intent if the result does not collide. Returns
    /// whether the piece changed.
    pub fn apply(&mut self, intent: Intent) -> bool {
        let Some(piece) = &mut self.current else {
            return false;
        };

        match intent {
            Intent::Rotate => {
                let rotated = rotate(piece.shape.view());
                let previous = std::mem::replace(&mut piece.shape, rotated);
                if self.board.is_collision(piece, 0, 0) {
                    piece.shape = previous;
                    return false;
                }
                true
            }
            Intent::Left | Intent::Right | Intent::Down => {
                let (dx, dy) = intent.offset();
                if self.board.is_collision(piece, dx, dy) {
                    return false;
                }
                piece.x += dx;
                piece.y += dy;
                true
            }
        }
    }

    #[cfg(test)]
    pub fn set_current_for_test(&mut self, piece: Piece) {
        self.state = GameState::Falling;
        self.current = Some(piece);
    }

    #[cfg(test)]
    pub fn set_next_for_test(&mut self, piece: Piece) {
        self.next = Some(piece);
    }

    #[cfg(test)]
    pub fn set_score_for_test(&mut self, score: u32, level: u32) {
        self.score = score;
        self.level = level;
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
