use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event as CrossTermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Color},
    terminal, ExecutableCommand, QueueableCommand,
};
use palette::{FromColor, Lch, Srgb};

use crate::engine::board::Status;
use crate::engine::grid::{Card, Direction, Grid, Idx};
use crate::error::Result;
use crate::tui::events::{Event, EventSource, UserInput};
use crate::tui::renderer::{Frame, Renderer, TileMovement};

const TILE_WIDTH: usize = 8;
const TILE_HEIGHT: usize = 3;
const BOARD_X_OFFSET: u16 = 2;
const BOARD_Y_OFFSET: u16 = 2;

const SLIDE_STEPS: usize = 4;
const SLIDE_FRAME: Duration = Duration::from_millis(30);

const FG_HUE: f32 = 208.0;
const EMPTY_BACKGROUND: Color = Color::Rgb { r: 50, g: 20, b: 20 };
const BORDER_FOREGROUND: Color = Color::Rgb {
    r: 120,
    g: 150,
    b: 190,
};

pub(crate) struct Crossterm<T: Write> {
    w: Box<T>,
    restored: bool,
}

impl<T: Write> Crossterm<T> {
    pub(crate) fn new(mut w: Box<T>) -> Result<Self> {
        terminal::enable_raw_mode()?;
        w.execute(terminal::EnterAlternateScreen)?;
        w.execute(cursor::Hide)?;
        Ok(Self { w, restored: false })
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        self.w.execute(cursor::Show)?;
        self.w.execute(terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl<T: Write> Drop for Crossterm<T> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("restoring terminal: {}", e);
        }
    }
}

impl<T: Write> Renderer for Crossterm<T> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        self.w.queue(terminal::BeginSynchronizedUpdate)?;
        draw(&mut self.w, frame)?;
        self.w.queue(terminal::EndSynchronizedUpdate)?;
        self.w.flush()?;
        Ok(())
    }

    fn slide(&mut self, before: &Frame, moves: &[TileMovement]) -> Result<()> {
        for step in 1..=SLIDE_STEPS {
            self.w.queue(terminal::BeginSynchronizedUpdate)?;
            draw_slide(&mut self.w, &before.grid, moves, step)?;
            self.w.queue(terminal::EndSynchronizedUpdate)?;
            self.w.flush()?;
            std::thread::sleep(SLIDE_FRAME);
        }
        Ok(())
    }

    fn recover(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("restoring terminal: {}", e);
        }
    }
}

struct BoxChars {
    top_left: char,
    top_right: char,
    bottom_right: char,
    bottom_left: char,
    horizontal: char,
    vertical: char,
}

impl Default for BoxChars {
    fn default() -> Self {
        let corner = boxy::Char::upper_left(boxy::Weight::Doubled);
        Self {
            top_left: corner.clone().into(),
            top_right: corner.clone().rotate_cw(1).into(),
            bottom_right: corner.clone().rotate_cw(2).into(),
            bottom_left: corner.rotate_ccw(1).into(),
            horizontal: boxy::Char::horizontal(boxy::Weight::Doubled).into(),
            vertical: boxy::Char::vertical(boxy::Weight::Doubled).into(),
        }
    }
}

/// Queues the commands drawing `frame` onto `w`.
fn draw<W: Write>(w: &mut W, frame: &Frame) -> Result<()> {
    let chars = BoxChars::default();
    let grid = &frame.grid;
    let inner_width = grid.width() * TILE_WIDTH;
    let inner_height = grid.height() * TILE_HEIGHT;

    w.queue(style::ResetColor)?;
    w.queue(terminal::Clear(terminal::ClearType::All))?;
    w.queue(cursor::MoveTo(BOARD_X_OFFSET, 0))?;
    w.queue(style::SetAttribute(style::Attribute::Bold))?;
    w.queue(style::Print(format!(
        "score: {}   best: {}   max tile: {}",
        frame.score,
        frame.best,
        grid.max_tile()
    )))?;
    w.queue(style::SetAttribute(style::Attribute::Reset))?;

    let mut y = BOARD_Y_OFFSET;
    w.queue(cursor::MoveTo(BOARD_X_OFFSET, y))?;
    w.queue(style::SetForegroundColor(BORDER_FOREGROUND))?;
    w.queue(style::Print(format!(
        "{}{}{}",
        chars.top_left,
        chars.horizontal.to_string().repeat(inner_width),
        chars.top_right
    )))?;
    y += 1;
    for _ in 0..inner_height {
        w.queue(cursor::MoveTo(BOARD_X_OFFSET, y))?;
        w.queue(style::Print(chars.vertical))?;
        w.queue(cursor::MoveTo(BOARD_X_OFFSET + 1 + inner_width as u16, y))?;
        w.queue(style::Print(chars.vertical))?;
        y += 1;
    }
    w.queue(cursor::MoveTo(BOARD_X_OFFSET, y))?;
    w.queue(style::Print(format!(
        "{}{}{}",
        chars.bottom_left,
        chars.horizontal.to_string().repeat(inner_width),
        chars.bottom_right
    )))?;
    w.queue(style::ResetColor)?;
    y += 2;

    for (row_idx, row) in grid.rows().iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            draw_tile(w, col_idx * TILE_WIDTH, row_idx * TILE_HEIGHT, *value)?;
        }
    }

    let message = match frame.status {
        Status::Running => String::new(),
        Status::Won => format!("You win! Final score: {}", frame.score),
        Status::Lost => format!("Game over! Final score: {}", frame.score),
    };
    w.queue(cursor::MoveTo(BOARD_X_OFFSET, y))?;
    w.queue(style::SetAttribute(style::Attribute::Bold))?;
    w.queue(style::Print(message))?;
    w.queue(style::SetAttribute(style::Attribute::Reset))?;
    y += 1;

    let undo_help = match (frame.undo_enabled, frame.can_undo) {
        (false, _) => "",
        (true, true) => ", u undo",
        (true, false) => ", u undo (none)",
    };
    w.queue(cursor::MoveTo(BOARD_X_OFFSET, y))?;
    w.queue(style::Print(format!(
        "arrows/hjkl/wasd move{}, r reset, q quit",
        undo_help
    )))?;
    Ok(())
}

/// Queues one tile with its top left corner at (`x`, `y`) character cells inside the border.
fn draw_tile<W: Write>(w: &mut W, x: usize, y: usize, value: Card) -> Result<()> {
    let (background, foreground) = tile_colors(value);
    w.queue(style::SetBackgroundColor(background))?;
    w.queue(style::SetForegroundColor(foreground))?;
    for line in 0..TILE_HEIGHT {
        let content = if value > 0 && line == TILE_HEIGHT / 2 {
            format!("{:^width$}", value, width = TILE_WIDTH)
        } else {
            " ".repeat(TILE_WIDTH)
        };
        w.queue(cursor::MoveTo(
            BOARD_X_OFFSET + 1 + x as u16,
            BOARD_Y_OFFSET + 1 + (y + line) as u16,
        ))?;
        w.queue(style::Print(content))?;
    }
    w.queue(style::ResetColor)?;
    Ok(())
}

/// Character cell offset of a moving tile at `step` of [`SLIDE_STEPS`].
fn slide_position(from: &Idx, to: &Idx, step: usize) -> (usize, usize) {
    let lerp = |a: usize, b: usize| (a * (SLIDE_STEPS - step) + b * step) / SLIDE_STEPS;
    (
        lerp(from.x() * TILE_WIDTH, to.x() * TILE_WIDTH),
        lerp(from.y() * TILE_HEIGHT, to.y() * TILE_HEIGHT),
    )
}

/// Queues one intermediate slide frame: the board interior emptied, then every moving tile at
/// its interpolated offset.
fn draw_slide<W: Write>(w: &mut W, grid: &Grid, moves: &[TileMovement], step: usize) -> Result<()> {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            draw_tile(w, x * TILE_WIDTH, y * TILE_HEIGHT, 0)?;
        }
    }
    // merging pairs are drawn last so they stay on top of tiles they pass over
    let (merging, sliding): (Vec<&TileMovement>, Vec<&TileMovement>) =
        moves.iter().partition(|m| m.merged);
    for m in sliding.into_iter().chain(merging) {
        let (x, y) = slide_position(&m.from, &m.to, step);
        draw_tile(w, x, y, m.value)?;
    }
    Ok(())
}

/// Background and foreground colors for a tile, with a distinct hue per power of two.
fn tile_colors(value: Card) -> (Color, Color) {
    let fg: Lch = Lch::new(20.0, 50.0, FG_HUE);
    let fg: Srgb = Srgb::from_color(fg);
    let fg = fg.into_format::<u8>();
    let foreground = Color::Rgb {
        r: fg.red,
        g: fg.green,
        b: fg.blue,
    };
    if value == 0 {
        return (EMPTY_BACKGROUND, foreground);
    }

    let exponent = value.trailing_zeros();
    let bg: Lch = Lch::new(80.0, 90.0, (exponent % 10) as f32 * 360.0 / 10.0);
    let bg: Srgb = Srgb::from_color(bg);
    let bg = bg.into_format::<u8>();
    let background = Color::Rgb {
        r: bg.red,
        g: bg.green,
        b: bg.blue,
    };
    (background, foreground)
}

#[derive(Default)]
pub(crate) struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    /// Block until the next relevant Crossterm event.
    fn next_event(&mut self) -> Result<Event> {
        loop {
            match event::read()? {
                CrossTermEvent::Key(ke) => match handle_key_event(ke) {
                    Some(input) => return Ok(Event::UserInput(input)),
                    None => continue,
                },
                CrossTermEvent::Resize(_, _) => return Ok(Event::Resize),
                _ => continue,
            };
        }
    }
}

fn handle_key_event(ke: KeyEvent) -> Option<UserInput> {
    if ke.kind == KeyEventKind::Release {
        return None;
    }
    if ke.modifiers.contains(KeyModifiers::CONTROL) {
        return match ke.code {
            KeyCode::Char('c') => Some(UserInput::Quit),
            _ => None,
        };
    }
    match ke.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => {
            Some(UserInput::Direction(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => {
            Some(UserInput::Direction(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => {
            Some(UserInput::Direction(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => {
            Some(UserInput::Direction(Direction::Down))
        }
        KeyCode::Char('u') => Some(UserInput::Undo),
        KeyCode::Char('r') => Some(UserInput::Reset),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserInput::Quit),
        _ => None,
    }
}
