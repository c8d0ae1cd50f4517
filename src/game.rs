use crate::engine::board::Board;
use crate::engine::grid::{Card, Direction, Grid, Idx};
use crate::error::Result;
use crate::highscore::{size_key, HighScores};
use crate::tui::events::{Event, EventSource, UserInput};
use crate::tui::renderer::{Frame, Renderer, TileMovement};

/// Game wires a [`Board`] to a renderer and an event source and keeps the per-size high score
/// up to date.
pub(crate) struct Game<R: Renderer, E: EventSource> {
    renderer: R,
    event_source: E,
    board: Board,
    high_scores: HighScores,
}

impl<R: Renderer, E: EventSource> Game<R, E> {
    pub(crate) fn new(board: Board, high_scores: HighScores, renderer: R, event_source: E) -> Self {
        Self {
            renderer,
            event_source,
            board,
            high_scores,
        }
    }

    pub(crate) fn run(mut self) -> Result<()> {
        match self.inner_run() {
            Err(e) => {
                self.renderer.recover();
                Err(e)
            }
            Ok(_) => Ok(()),
        }
    }

    /// Loads the high scores and processes events until the player quits.
    fn inner_run(&mut self) -> Result<()> {
        self.high_scores.load();

        loop {
            self.renderer.render(&self.frame())?;

            match self.event_source.next_event()? {
                Event::UserInput(UserInput::Direction(d)) => self.shift(d)?,
                Event::UserInput(UserInput::Undo) => self.undo(),
                Event::UserInput(UserInput::Reset) => self.reset(),
                Event::UserInput(UserInput::Quit) => break,
                Event::Resize => continue,
            }
        }
        log::info!("quitting with score {}", self.board.score());
        Ok(())
    }

    fn frame(&self) -> Frame {
        Frame {
            grid: self.board.board(),
            score: self.board.score(),
            best: self
                .high_scores
                .get(size_key(self.board.x_size(), self.board.y_size())),
            status: self.board.status(),
            undo_enabled: self.board.config().undo_enabled,
            can_undo: self.board.can_undo(),
        }
    }
}

impl<R: Renderer, E: EventSource> Game<R, E> {
    fn shift(&mut self, direction: Direction) -> Result<()> {
        if self.board.is_game_over() {
            return Ok(());
        }
        let before = self.frame();
        let changed = self.board.shift(direction);
        log::debug!(
            "move {}: changed {}, score {}",
            direction,
            changed,
            self.board.score()
        );
        if changed && self.board.config().animations_enabled {
            let moves = find_tile_movements(&before.grid, &self.board.board(), direction);
            log::trace!("sliding {} tiles", moves.len());
            self.renderer.slide(&before, &moves)?;
        }
        if self.board.is_game_over() {
            log::info!(
                "game {} with score {}",
                self.board.status(),
                self.board.score()
            );
        }
        self.update_high_score();
        Ok(())
    }

    fn undo(&mut self) {
        if !self.board.config().undo_enabled {
            log::debug!("undo disabled");
            return;
        }
        if self.board.undo() {
            log::debug!("undo, score back to {}", self.board.score());
        }
    }

    fn reset(&mut self) {
        self.board.reset();
        log::info!(
            "new {}x{} game",
            self.board.x_size(),
            self.board.y_size()
        );
    }

    fn update_high_score(&mut self) {
        let (x, y) = (self.board.x_size(), self.board.y_size());
        if self.high_scores.record(x, y, self.board.score()) {
            if let Err(e) = self.high_scores.save() {
                log::error!("saving high scores: {}", e);
            }
        }
    }
}

/// Pairs every tile of `before` with the slot it landed in on `after`, walking each line the
/// way a shift in `direction` consumes it. Tiles spawned by the move have no counterpart in
/// `before` and are left out.
fn find_tile_movements(before: &Grid, after: &Grid, direction: Direction) -> Vec<TileMovement> {
    let mut moves = Vec::new();
    for line in before.lines(direction) {
        let tiles: Vec<(&Idx, Card)> = line
            .iter()
            .map(|idx| (idx, before.get(idx)))
            .filter(|(_, value)| *value != 0)
            .collect();
        let mut slots = line.iter();
        let mut i = 0;
        while i < tiles.len() {
            let to = match slots.next() {
                Some(to) => to,
                None => break,
            };
            let (from, value) = tiles[i];
            let landed = after.get(to);
            let merged = landed != value
                && value.checked_mul(2) == Some(landed)
                && tiles.get(i + 1).map_or(false, |(_, next)| *next == value);
            moves.push(TileMovement {
                value,
                from: from.clone(),
                to: to.clone(),
                merged,
            });
            if merged {
                moves.push(TileMovement {
                    value,
                    from: tiles[i + 1].0.clone(),
                    to: to.clone(),
                    merged,
                });
                i += 2;
            } else {
                i += 1;
            }
        }
    }
    moves
}
