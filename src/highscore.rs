use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::engine::grid::Score;
use crate::error::Result;

/// Encodes board dimensions as `x * 10 + y`.
///
/// The encoding only round-trips while both dimensions are single digits: a 10x3 board and a
/// 9x13 board share key 103. It is kept as is since it is the on-disk format.
pub(crate) fn size_key(x_size: usize, y_size: usize) -> u32 {
    (x_size * 10 + y_size) as u32
}

/// Parses a single `<key>=<score>` record.
pub(crate) fn parse_line(line: &str) -> Option<(u32, Score)> {
    let (key, score) = line.split_once('=')?;
    if score.contains('=') {
        return None;
    }
    Some((key.trim().parse().ok()?, score.trim().parse().ok()?))
}

/// HighScores keeps the best score per board size and persists them as `key=score` lines.
pub(crate) struct HighScores {
    path: PathBuf,
    scores: HashMap<u32, Score>,
}

impl HighScores {
    pub(crate) fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            scores: HashMap::new(),
        }
    }

    /// Replaces the in-memory records with the file's. A missing file means no records;
    /// malformed lines, including ones that are not valid UTF-8, are skipped.
    pub(crate) fn load(&mut self) {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no high score file at {}", self.path.display());
                return;
            }
            Err(e) => {
                log::error!(
                    "error reading high scores from {}: {}",
                    self.path.display(),
                    e
                );
                return;
            }
        };

        self.scores.clear();
        for raw in contents.split(|b| *b == b'\n') {
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line.trim(),
                Err(_) => {
                    log::warn!(
                        "skipping malformed high score line: {:?}",
                        String::from_utf8_lossy(raw)
                    );
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((key, score)) => {
                    self.scores.insert(key, score);
                }
                None => log::warn!("skipping malformed high score line: {:?}", line),
            }
        }
        log::info!(
            "loaded {} high scores from {}",
            self.scores.len(),
            self.path.display()
        );
    }

    /// Rewrites the whole file from the in-memory records.
    pub(crate) fn save(&self) -> Result<()> {
        let mut w = BufWriter::new(fs::File::create(&self.path)?);
        for (key, score) in &self.scores {
            writeln!(w, "{}={}", key, score)?;
        }
        w.flush()?;
        Ok(())
    }

    pub(crate) fn get(&self, key: u32) -> Score {
        self.scores.get(&key).copied().unwrap_or(0)
    }

    /// Stores `score` for `key` unless an equal or better record exists.
    pub(crate) fn set(&mut self, key: u32, score: Score) {
        if score > self.get(key) {
            self.scores.insert(key, score);
        }
    }

    /// Raises the record for an `x_size` by `y_size` board, returning whether it improved.
    pub(crate) fn record(&mut self, x_size: usize, y_size: usize, score: Score) -> bool {
        let key = size_key(x_size, y_size);
        if score > self.get(key) {
            self.set(key, score);
            true
        } else {
            false
        }
    }
}
