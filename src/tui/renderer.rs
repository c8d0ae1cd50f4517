use crate::engine::board::Status;
use crate::engine::grid::{Card, Grid, Idx, Score};
use crate::error::Result;

/// Frame is everything a renderer needs to draw one state of the game.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Frame {
    pub(crate) grid: Grid,
    pub(crate) score: Score,
    pub(crate) best: Score,
    pub(crate) status: Status,
    pub(crate) undo_enabled: bool,
    pub(crate) can_undo: bool,
}

/// TileMovement is one tile of the pre-move grid travelling to the slot it ended up in. Both
/// tiles of a merged pair share the same destination and are flagged `merged`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TileMovement {
    pub(crate) value: Card,
    pub(crate) from: Idx,
    pub(crate) to: Idx,
    pub(crate) merged: bool,
}

pub(crate) trait Renderer {
    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Plays the tiles of `before` sliding to their destinations. The next `render` call
    /// draws the settled board.
    fn slide(&mut self, _before: &Frame, _moves: &[TileMovement]) -> Result<()> {
        Ok(())
    }

    /// Called when the game loop bails out with an error, before the error is returned.
    fn recover(&mut self) {}
}
