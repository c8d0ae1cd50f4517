use crate::engine::grid::Direction;
use crate::error::Result;

pub(crate) trait EventSource {
    fn next_event(&mut self) -> Result<Event>;
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    UserInput(UserInput),
    Resize,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum UserInput {
    Direction(Direction),
    Undo,
    Reset,
    Quit,
}
