use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use super::config::Config;
use super::grid::{merge_line, Card, Direction, Grid, Idx, Score};
use crate::error::{Error, Result};

/// Status of a game in progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Status {
    Running,
    Won,
    Lost,
}

impl Status {
    pub(crate) fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Won => "won",
            Self::Lost => "lost",
        };
        write!(f, "{}", s)
    }
}

/// The grid and score captured right before a move.
#[derive(Clone, Debug, PartialEq)]
struct UndoSnapshot {
    grid: Grid,
    score: Score,
}

/// Board is an N x M merge puzzle played under a [`Config`]. It owns the grid, the score, the
/// game status and at most one undo snapshot.
pub(crate) struct Board {
    config: Config,
    rng: Box<dyn RngCore>,
    grid: Grid,
    score: Score,
    status: Status,
    snapshot: Option<UndoSnapshot>,
}

impl Board {
    /// Initialize a new board using the given config and random number generator.
    pub(crate) fn new(config: Config, rng: impl RngCore + 'static) -> Self {
        let mut board = Self {
            grid: Grid::new(config.x_size(), config.y_size()),
            config,
            rng: Box::new(rng),
            score: 0,
            status: Status::Running,
            snapshot: None,
        };
        board.reset();
        board
    }

    /// Starts a fresh game, picking up the config's current dimensions.
    pub(crate) fn reset(&mut self) {
        self.grid = Grid::new(self.config.x_size(), self.config.y_size());
        self.score = 0;
        self.status = Status::Running;
        self.snapshot = None;

        self.spawn_new_tile();
        self.spawn_new_tile();
        log::debug!(
            "reset {}x{} board with {} tiles\n{}",
            self.grid.width(),
            self.grid.height(),
            self.grid.non_empty_count(),
            self.grid
        );
    }

    /// Shifts every line of the board towards the given direction, merging equal neighbours.
    /// When anything moved a new tile is spawned and the win and loss conditions are evaluated.
    /// Returns whether the board changed; moves on a finished game are ignored.
    pub(crate) fn shift(&mut self, direction: Direction) -> bool {
        if self.status != Status::Running {
            return false;
        }
        if self.config.undo_enabled {
            self.snapshot = Some(UndoSnapshot {
                grid: self.grid.clone(),
                score: self.score,
            });
        }

        let mut changed = false;
        for line in self.grid.lines(direction) {
            let values = line.iter().map(|idx| self.grid.get(idx)).collect::<Vec<Card>>();
            let (merged, gained) = merge_line(&values);
            self.score += gained;
            if merged != values {
                changed = true;
                for (idx, value) in line.iter().zip(merged) {
                    self.grid.set(idx, value);
                }
            }
        }

        if changed {
            self.spawn_new_tile();
            self.check_for_win();
        } else {
            // nothing to return to
            self.snapshot = None;
        }
        if self.status == Status::Running && self.grid.is_full() && !self.grid.has_adjacent_pair()
        {
            self.status = Status::Lost;
        }
        log::trace!("shifted {}, changed: {}\n{}", direction, changed, self.grid);
        changed
    }

    /// Reverts the grid and score to the snapshot taken before the last move. A snapshot can
    /// only be consumed once. Returns whether anything was restored.
    pub(crate) fn undo(&mut self) -> bool {
        if !self.config.undo_enabled {
            return false;
        }
        match self.snapshot.take() {
            Some(UndoSnapshot { grid, score }) => {
                self.grid = grid;
                self.score = score;
                self.status = Status::Running;
                true
            }
            None => false,
        }
    }

    /// Places one tile in a uniformly chosen empty slot. Does nothing on a full board.
    pub(crate) fn spawn_new_tile(&mut self) -> Option<Idx> {
        let idx = self.grid.empty_cells().choose(&mut self.rng)?.clone();
        let roll: f64 = self.rng.gen();
        let value = self.config.spawn_table.pick(roll);
        self.grid.set(&idx, value);
        Some(idx)
    }

    fn check_for_win(&mut self) {
        if let Some(idx) = self.grid.first_at_least(self.config.win_tile) {
            log::debug!("{} reached win tile {}", idx, self.config.win_tile);
            self.status = Status::Won;
        }
    }

    /// Overwrites the cell values with `rows`. Fails without touching the board if the extents
    /// differ from the board's.
    pub(crate) fn set_board_state(&mut self, rows: &[Vec<Card>]) -> Result<()> {
        let (width, height) = (self.grid.width(), self.grid.height());
        let actual_x = rows.first().map_or(0, |row| row.len());
        if rows.len() != height || rows.iter().any(|row| row.len() != width) {
            return Err(Error::DimensionMismatch {
                expected_x: width,
                expected_y: height,
                actual_x,
                actual_y: rows.len(),
            });
        }
        self.grid.fill_from_rows(rows);
        Ok(())
    }

    /// Returns a copy of the grid.
    pub(crate) fn board(&self) -> Grid {
        self.grid.clone()
    }

    pub(crate) fn score(&self) -> Score {
        self.score
    }

    pub(crate) fn status(&self) -> Status {
        self.status
    }

    pub(crate) fn x_size(&self) -> usize {
        self.grid.width()
    }

    pub(crate) fn y_size(&self) -> usize {
        self.grid.height()
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.config.undo_enabled && self.snapshot.is_some()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}
