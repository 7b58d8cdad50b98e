use piston_window::Key;

/// A player request applied to the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Left,
    Right,
    Down,
    Rotate,
}

impl Intent {
    /// Offset to test before committing a move. Rotation is tested in place.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Intent::Left => (-1, 0),
            Intent::Right => (1, 0),
            Intent::Down => (0, 1),
            Intent::Rotate => (0, 0),
        }
    }
}

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Move(Intent),
}

pub fn command_for_key(key: Key) -> Option<Command> {
    match key {
        Key::Left => Some(Command::Move(Intent::Left)),
        Key::Right => Some(Command::Move(Intent::Right)),
        Key::Down => Some(Command::Move(Intent::Down)),
        Key::Up => Some(Command::Move(Intent::Rotate)),
        Key::Return => Some(Command::Start),
        _ => None,
    }
}
