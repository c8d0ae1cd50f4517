use std::path::PathBuf;
use std::str::FromStr;

use super::grid::Card;
use crate::error::Error;

const DEFAULT_SIZE: usize = 4;
const DEFAULT_WIN_TILE: Card = 2048;
const DEFAULT_HIGH_SCORE_PATH: &str = "highscore.txt";

/// Tile value chosen when a draw falls past the table's cumulative mass.
pub(crate) const FALLBACK_TILE: Card = 2;

/// SpawnTable is an ordered list of (tile value, probability mass) pairs. The order is
/// significant: a draw walks the entries front to back.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpawnTable(Vec<(Card, f64)>);

impl Default for SpawnTable {
    fn default() -> Self {
        Self(vec![(2, 0.9), (4, 0.1)])
    }
}

impl SpawnTable {
    #[cfg(test)]
    pub(crate) fn new(entries: Vec<(Card, f64)>) -> Self {
        Self(entries)
    }

    pub(crate) fn entries(&self) -> &[(Card, f64)] {
        &self.0
    }

    /// Picks the first entry whose running total meets or exceeds `roll`, falling back to
    /// [`FALLBACK_TILE`] when the masses sum to less than `roll`. Masses are not required to
    /// sum to 1.
    pub(crate) fn pick(&self, roll: f64) -> Card {
        let mut cumulative = 0.0;
        for (value, mass) in self.entries() {
            cumulative += mass;
            if roll <= cumulative {
                return *value;
            }
        }
        FALLBACK_TILE
    }
}

impl FromStr for SpawnTable {
    type Err = Error;

    /// Parses `"2=0.9,4=0.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (value, mass) = entry
                    .split_once('=')
                    .ok_or_else(|| Error::InvalidSpawnTable(entry.to_string()))?;
                let value = value
                    .trim()
                    .parse::<Card>()
                    .map_err(|_| Error::InvalidSpawnTable(entry.to_string()))?;
                let mass = mass
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidSpawnTable(entry.to_string()))?;
                Ok((value, mass))
            })
            .collect::<Result<Vec<_>, Error>>()
            .and_then(|entries| {
                if entries.is_empty() {
                    Err(Error::InvalidSpawnTable(s.to_string()))
                } else {
                    Ok(Self(entries))
                }
            })
    }
}

/// BoardSize is a `<width>x<height>` pair as given on the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoardSize(pub(crate) usize, pub(crate) usize);

impl FromStr for BoardSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidBoardSize(s.to_string());
        let (x, y) = s.to_lowercase().split_once('x').map_or_else(
            || Err(invalid()),
            |(x, y)| Ok((x.trim().to_string(), y.trim().to_string())),
        )?;
        let x = x.parse::<usize>().map_err(|_| invalid())?;
        let y = y.parse::<usize>().map_err(|_| invalid())?;
        Ok(Self(x, y))
    }
}

/// The win threshold the classic launcher pairs with each offered board size.
pub(crate) fn default_win_tile(x_size: usize, y_size: usize) -> Card {
    match (x_size, y_size) {
        (3, 3) => 32,
        (3, 4) | (4, 3) => 128,
        (4, 4) => 2048,
        (4, 5) | (5, 4) => 4096,
        (5, 5) => 8192,
        (5, 7) | (7, 5) => 16384,
        (6, 6) => 32768,
        (6, 9) | (9, 6) => 65536,
        _ => DEFAULT_WIN_TILE,
    }
}

/// Config holds the rules a board is played under. Dimension changes are only picked up by a
/// board on its next reset.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Config {
    x_size: usize,
    y_size: usize,
    pub(crate) win_tile: Card,
    pub(crate) undo_enabled: bool,
    pub(crate) animations_enabled: bool,
    pub(crate) spawn_table: SpawnTable,
    pub(crate) high_score_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            x_size: DEFAULT_SIZE,
            y_size: DEFAULT_SIZE,
            win_tile: DEFAULT_WIN_TILE,
            undo_enabled: false,
            animations_enabled: true,
            spawn_table: SpawnTable::default(),
            high_score_path: PathBuf::from(DEFAULT_HIGH_SCORE_PATH),
        }
    }
}

impl Config {
    pub(crate) fn x_size(&self) -> usize {
        self.x_size
    }

    pub(crate) fn y_size(&self) -> usize {
        self.y_size
    }

    /// Sets the board dimensions, falling back to 4x4 when either is below 2.
    pub(crate) fn set_board_size(&mut self, x_size: usize, y_size: usize) {
        if x_size < 2 || y_size < 2 {
            log::warn!(
                "invalid board size {}x{}, falling back to {}x{}",
                x_size,
                y_size,
                DEFAULT_SIZE,
                DEFAULT_SIZE
            );
            self.x_size = DEFAULT_SIZE;
            self.y_size = DEFAULT_SIZE;
        } else {
            self.x_size = x_size;
            self.y_size = y_size;
        }
    }

    pub(crate) fn with_board_size(mut self, x_size: usize, y_size: usize) -> Self {
        self.set_board_size(x_size, y_size);
        self
    }

    pub(crate) fn with_win_tile(mut self, win_tile: Card) -> Self {
        self.win_tile = win_tile;
        self
    }

    pub(crate) fn with_undo(mut self, undo_enabled: bool) -> Self {
        self.undo_enabled = undo_enabled;
        self
    }

    pub(crate) fn with_animations(mut self, animations_enabled: bool) -> Self {
        self.animations_enabled = animations_enabled;
        self
    }

    pub(crate) fn with_spawn_table(mut self, spawn_table: SpawnTable) -> Self {
        self.spawn_table = spawn_table;
        self
    }
}
