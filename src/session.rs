use std::collections::VecDeque;
use std::time::Duration;

use crate::game::{Game, GameState, StepOutcome};
use crate::input::{Command, Intent};
use crate::timer::{Timer, TimerHandle};

/// Work for the session, handled strictly in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Start,
    Tick(TimerHandle),
    Input(Intent),
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Message::Start,
            Command::Move(intent) => Message::Input(intent),
        }
    }
}

/// Things the display side needs to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Redraw,
    Score { score: u32, level: u32 },
    GameOver { score: u32 },
}

/// Owns the game and its tick stream. Timer firings and key presses are
/// both queued as messages, so nothing mutates the game concurrently.
#[derive(Debug)]
pub struct Session {
    game: Game,
    timer: Timer,
    tick: Option<TimerHandle>,
    inbox: VecDeque<Message>,
}

impl Session {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            timer: Timer::new(),
            tick: None,
            inbox: VecDeque::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick.and(self.timer.interval())
    }

    pub fn post(&mut self, message: Message) {
        self.inbox.push_back(message);
    }

    /// Feeds frame time to the timer and queues a tick for every interval
    /// that elapsed.
    pub fn advance(&mut self, dt: Duration) {
        self.timer.advance(dt);
        while let Some(handle) = self.timer.fire() {
            self.post(Message::Tick(handle));
        }
    }

    /// Handles every queued message and returns what the display should do.
    pub fn pump(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(message) = self.inbox.pop_front() {
            self.handle(message, &mut notices);
        }
        notices
    }

    fn handle(&mut self, message: Message, notices: &mut Vec<Notice>) {
        match message {
            Message::Start => {
                self.release_timer();
                self.game.start();
                self.tick = Some(self.timer.schedule(self.game.tick_interval()));
                log::info!("session started");
                notices.push(Notice::Score {
                    score: self.game.score(),
                    level: self.game.level(),
                });
                notices.push(Notice::Redraw);
            }
            Message::Tick(handle) => {
                if self.tick != Some(handle) {
                    log::debug!("dropping stale tick from {handle:?}");
                    return;
                }
                match self.game.step() {
                    StepOutcome::Locked { lines, level_up } => {
                        if level_up {
                            self.reschedule();
                        }
                        if lines > 0 || level_up {
                            notices.push(Notice::Score {
                                score: self.game.score(),
                                level: self.game.level(),
                            });
                        }
                    }
                    StepOutcome::GameOver { score } => {
                        self.release_timer();
                        notices.push(Notice::GameOver { score });
                    }
                    StepOutcome::Idle | StepOutcome::Spawned | StepOutcome::Fell => {}
                }
                notices.push(Notice::Redraw);
            }
            Message::Input(intent) => {
                if self.game.state() != GameState::Falling {
                    return;
                }
                self.game.apply(intent);
                notices.push(Notice::Redraw);
            }
        }
    }

    fn reschedule(&mut self) {
        self.release_timer();
        let interval = self.game.tick_interval();
        log::info!("tick interval now {interval:?}");
        self.tick = Some(self.timer.schedule(interval));
    }

    fn release_timer(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.timer.cancel(handle);
        }
    }

    #[cfg(test)]
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{Color, Shape, COLS};
    use crate::piece::{rotate, Piece};
    use nanorand::WyRand;

    fn started() -> Session {
        let mut session = Session::new(Game::new(WyRand::new_seed(3)));
        session.post(Message::Start);
        session.pump();
        session
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn nothing_ticks_before_start() {
        let mut session = Session::new(Game::new(WyRand::new_seed(3)));
        session.advance(Duration::from_secs(5));
        assert!(session.pump().is_empty());
        assert_eq!(session.tick_interval(), None);
        assert_eq!(session.game().state(), GameState::Idle);
    }

    #[test]
    fn start_schedules_one_second_ticks() {
        let mut session = Session::new(Game::new(WyRand::new_seed(3)));
        session.post(Message::Start);
        assert_eq!(
            session.pump(),
            vec![Notice::Score { score: 0, level: 1 }, Notice::Redraw]
        );
        assert_eq!(session.tick_interval(), Some(ms(1000)));

        session.advance(ms(999));
        assert!(session.pump().is_empty());
        session.advance(ms(1));
        assert_eq!(session.pump(), vec![Notice::Redraw]);
        assert!(session.game().current().is_some());
    }

    #[test]
    fn restart_keeps_a_single_tick_stream() {
        let mut session = started();
        session.advance(ms(1500));
        session.post(Message::Start);
        session.pump();

        // Only the new stream's ticks are handled.
        session.advance(ms(999));
        assert!(session.pump().is_empty());
        session.advance(ms(1));
        assert_eq!(session.pump().len(), 1);
    }

    #[test]
    fn level_up_reschedules_faster_ticks() {
        let mut session = started();
        session.advance(ms(1000));
        session.pump();

        let game = session.game_mut();
        game.set_score_for_test(900, 1);
        for col in (0..COLS).filter(|&c| c != 5) {
            game.board_mut().set(col, 19, Some(Color::Blue));
        }
        let mut i = Piece::new(Shape::I, Color::Cyan).with_pos(5, 16);
        i.shape = rotate(i.shape.view());
        game.set_current_for_test(i);

        // Two intervals' worth of time: the second tick is stale once the
        // level changes.
        session.advance(ms(2000));
        assert_eq!(
            session.pump(),
            vec![Notice::Score { score: 1000, level: 2 }, Notice::Redraw]
        );
        assert_eq!(session.tick_interval(), Some(ms(500)));

        session.advance(ms(500));
        assert_eq!(session.pump(), vec![Notice::Redraw]);
    }

    #[test]
    fn game_over_releases_the_timer() {
        let mut session = started();
        for col in 3..7 {
            session.game_mut().board_mut().set(col, 0, Some(Color::Rose));
            session.game_mut().board_mut().set(col, 1, Some(Color::Rose));
        }
        session.advance(ms(1000));
        assert_eq!(
            session.pump(),
            vec![Notice::GameOver { score: 0 }, Notice::Redraw]
        );
        assert_eq!(session.tick_interval(), None);

        session.advance(Duration::from_secs(10));
        assert!(session.pump().is_empty());
    }

    #[test]
    fn input_moves_piece_and_requests_redraw() {
        let mut session = started();
        session
            .game_mut()
            .set_current_for_test(Piece::new(Shape::O, Color::Green).with_pos(4, 5));

        session.post(Command::Move(Intent::Left).into());
        session.post(Message::Input(Intent::Down));
        assert_eq!(session.pump(), vec![Notice::Redraw, Notice::Redraw]);
        let piece = session.game().current().unwrap();
        assert_eq!((piece.x, piece.y), (3, 6));
    }

    #[test]
    fn input_is_ignored_when_not_playing() {
        let mut session = Session::new(Game::new(WyRand::new_seed(3)));
        session.post(Message::Input(Intent::Rotate));
        assert!(session.pump().is_empty());
    }

    #[test]
    fn messages_run_in_arrival_order() {
        let mut session = started();
        session
            .game_mut()
            .set_current_for_test(Piece::new(Shape::O, Color::Green).with_pos(4, 17));

        // The soft drop lands first, so the tick that follows locks.
        session.post(Message::Input(Intent::Down));
        session.advance(ms(1000));
        session.pump();
        assert_eq!(session.game().board().cell(4, 19), Some(Color::Green));
    }
}
