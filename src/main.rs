use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use rand::thread_rng;

mod engine;
mod error;
mod game;
mod highscore;
mod tui;

use engine::board::Board;
use engine::config::{default_win_tile, BoardSize, Config, SpawnTable};
use engine::grid::Card;
use game::Game;
use highscore::HighScores;
use tui::crossterm::{Crossterm, CrosstermEvents};

/// A sliding tile merge puzzle on boards of any size.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Board size as <width>x<height>; sizes below 2 fall back to 4x4.
    #[arg(short, long, default_value = "4x4")]
    size: BoardSize,

    /// Tile value that wins the game. Defaults to a value suited to the board size.
    #[arg(short, long)]
    win_tile: Option<Card>,

    /// Allow undoing the last move.
    #[arg(short, long)]
    undo: bool,

    /// Redraw the board in place instead of sliding tiles after a move.
    #[arg(long)]
    no_animations: bool,

    /// Ordered spawn probabilities as <tile>=<probability> pairs.
    #[arg(long, default_value = "2=0.9,4=0.1")]
    spawn: SpawnTable,

    /// File the per-size high scores are kept in.
    #[arg(long, default_value = "highscore.txt")]
    high_scores: PathBuf,

    /// File log output is written to.
    #[arg(long, default_value = "./output.log")]
    log_file: PathBuf,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Args {
    fn config(&self) -> Config {
        let BoardSize(x, y) = self.size;
        let config = Config::default()
            .with_board_size(x, y)
            .with_undo(self.undo)
            .with_animations(!self.no_animations)
            .with_spawn_table(self.spawn.clone());
        let win_tile = self
            .win_tile
            .unwrap_or_else(|| default_win_tile(config.x_size(), config.y_size()));
        let mut config = config.with_win_tile(win_tile);
        config.high_score_path = self.high_scores.clone();
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(args.verbose.log_level_filter())
        .chain(fern::log_file(&args.log_file)?)
        .apply()?;

    let config = args.config();
    log::info!(
        "starting {}x{} game, win tile {}, undo {}, animations {}",
        config.x_size(),
        config.y_size(),
        config.win_tile,
        config.undo_enabled,
        config.animations_enabled
    );

    let high_scores = HighScores::new(&config.high_score_path);
    let board = Board::new(config, thread_rng());
    let w = stdout().lock();
    let renderer = Crossterm::new(Box::new(w))?;
    let game = Game::new(board, high_scores, renderer, CrosstermEvents);

    game.run()?;

    Ok(())
}
