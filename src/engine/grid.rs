pub(crate) type Card = u32;

pub(crate) type Score = u64;

/// Idx addresses a single slot of a grid by column (x) and row (y).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) struct Idx(pub(crate) usize, pub(crate) usize);

impl std::fmt::Display for Idx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx({0},{1})", self.0, self.1)
    }
}

impl Idx {
    #[inline(always)]
    pub(crate) fn x(&self) -> usize {
        self.0
    }

    #[inline(always)]
    pub(crate) fn y(&self) -> usize {
        self.1
    }
}

/// Direction represents the direction indicated by the player.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        };
        write!(f, "{}", s)
    }
}

/// Grid is a `height` x `width` matrix of cards stored as a row-major flat buffer. A zero card
/// is an empty slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Card>,
}

impl Grid {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    #[inline(always)]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn offset(&self, idx: &Idx) -> usize {
        debug_assert!(idx.x() < self.width, "invalid x coordinate {}", idx.x());
        debug_assert!(idx.y() < self.height, "invalid y coordinate {}", idx.y());
        idx.y() * self.width + idx.x()
    }

    pub(crate) fn get(&self, idx: &Idx) -> Card {
        self.cells[self.offset(idx)]
    }

    pub(crate) fn set(&mut self, idx: &Idx, value: Card) {
        let offset = self.offset(idx);
        self.cells[offset] = value;
    }

    /// Copies the grid out as a vector of rows.
    pub(crate) fn rows(&self) -> Vec<Vec<Card>> {
        self.cells.chunks(self.width).map(|row| row.to_vec()).collect()
    }

    /// Overwrites every cell from `rows`, which must already have been checked to match the
    /// grid's extents.
    pub(crate) fn fill_from_rows(&mut self, rows: &[Vec<Card>]) {
        for (dst, src) in self.cells.chunks_mut(self.width).zip(rows) {
            dst.copy_from_slice(src);
        }
    }

    pub(crate) fn indices(&self, direction: Direction) -> Indices {
        Indices::new(self.width, self.height, direction)
    }

    /// Returns the indices of every line the given direction operates on. Each line is ordered
    /// starting at the edge the tiles slide towards.
    pub(crate) fn lines(&self, direction: Direction) -> Vec<Vec<Idx>> {
        let line_len = match direction {
            Direction::Left | Direction::Right => self.width,
            Direction::Up | Direction::Down => self.height,
        };
        self.indices(direction)
            .collect::<Vec<Idx>>()
            .chunks(line_len)
            .map(|line| line.to_vec())
            .collect()
    }

    pub(crate) fn empty_cells(&self) -> Vec<Idx> {
        self.indices(Direction::Left)
            .filter(|idx| self.get(idx) == 0)
            .collect()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != 0)
    }

    pub(crate) fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != 0).count()
    }

    pub(crate) fn max_tile(&self) -> Card {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Row-major scan for the first slot holding at least `threshold`.
    pub(crate) fn first_at_least(&self, threshold: Card) -> Option<Idx> {
        self.indices(Direction::Left)
            .find(|idx| self.get(idx) >= threshold)
    }

    /// Reports whether any horizontally or vertically adjacent pair of slots hold equal values.
    /// Bounds come from the grid's current extents on every call.
    pub(crate) fn has_adjacent_pair(&self) -> bool {
        for y in 0..self.height {
            for x in 0..self.width.saturating_sub(1) {
                if self.get(&Idx(x, y)) == self.get(&Idx(x + 1, y)) {
                    return true;
                }
            }
        }
        for x in 0..self.width {
            for y in 0..self.height.saturating_sub(1) {
                if self.get(&Idx(x, y)) == self.get(&Idx(x, y + 1)) {
                    return true;
                }
            }
        }
        false
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width) {
            let cells = row
                .iter()
                .map(|c| format!("{:>5}", c))
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(f, "[{}]", cells)?;
        }
        Ok(())
    }
}

/// Slides all non-zero cards of `line` towards index 0 and merges equal neighbours pairwise.
/// A card produced by a merge is never merged again within the same call, so `[2, 2, 2, 2]`
/// becomes `[4, 4, 0, 0]`. A pair whose sum does not fit in a [`Card`] is left unmerged.
/// Returns the new line and the sum of all merge results.
pub(crate) fn merge_line(line: &[Card]) -> (Vec<Card>, Score) {
    let mut dense: Vec<Card> = line.iter().copied().filter(|c| *c != 0).collect();
    let mut score: Score = 0;
    let mut pivot = 0;
    while pivot + 1 < dense.len() {
        if dense[pivot] == dense[pivot + 1] {
            if let Some(merged) = dense[pivot].checked_mul(2) {
                score = score.saturating_add(Score::from(merged));
                dense[pivot] = merged;
                dense.remove(pivot + 1);
            }
        }
        pivot += 1;
    }
    dense.resize(line.len(), 0);
    (dense, score)
}

/// Indices is an iterator of Idx over a grid, walking line by line in the order a shift in the
/// given direction consumes them.
pub(crate) struct Indices {
    direction: Direction,
    x_width: usize,
    y_width: usize,
    xdx: usize,
    ydx: usize,
}

impl Indices {
    fn new(x_width: usize, y_width: usize, direction: Direction) -> Self {
        let (xdx, ydx) = match direction {
            Direction::Left => (0, 0),
            Direction::Right => (x_width.saturating_sub(1), 0),
            Direction::Up => (0, 0),
            Direction::Down => (0, y_width.saturating_sub(1)),
        };

        Indices {
            direction,
            x_width,
            y_width,
            xdx,
            ydx,
        }
    }
}

impl Iterator for Indices {
    type Item = Idx;

    fn next(&mut self) -> Option<Self::Item> {
        if self.x_width == 0 || self.y_width == 0 {
            return None;
        }
        match &self.direction {
            Direction::Left => self.next_left(),
            Direction::Right => self.next_right(),
            Direction::Up => self.next_up(),
            Direction::Down => self.next_down(),
        }
    }
}

impl Indices {
    fn next_left(&mut self) -> Option<Idx> {
        let (xdx, ydx) = (self.xdx, self.ydx);
        if ydx == self.y_width {
            return None;
        }
        if xdx == self.x_width - 1 {
            self.xdx = 0;
            self.ydx += 1;
        } else {
            self.xdx += 1;
        }
        Some(Idx(xdx, ydx))
    }

    fn next_right(&mut self) -> Option<Idx> {
        let (xdx, ydx) = (self.xdx, self.ydx);
        if ydx == self.y_width {
            return None;
        }
        if xdx == 0 {
            self.xdx = self.x_width - 1;
            self.ydx += 1;
        } else {
            self.xdx -= 1;
        }
        Some(Idx(xdx, ydx))
    }

    fn next_up(&mut self) -> Option<Idx> {
        let (xdx, ydx) = (self.xdx, self.ydx);
        if xdx == self.x_width {
            return None;
        }
        if ydx == self.y_width - 1 {
            self.ydx = 0;
            self.xdx += 1;
        } else {
            self.ydx += 1;
        }
        Some(Idx(xdx, ydx))
    }

    fn next_down(&mut self) -> Option<Idx> {
        let (xdx, ydx) = (self.xdx, self.ydx);
        if xdx == self.x_width {
            return None;
        }
        if ydx == 0 {
            self.ydx = self.y_width - 1;
            self.xdx += 1;
        } else {
            self.ydx -= 1;
        }
        Some(Idx(xdx, ydx))
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    const TOP: Card = 1 << 31;

    fn grid(rows: &[&[Card]]) -> Grid {
        let rows: Vec<Vec<Card>> = rows.iter().map(|r| r.to_vec()).collect();
        let mut g = Grid::new(rows[0].len(), rows.len());
        g.fill_from_rows(&rows);
        g
    }

    #[rstest]
    #[case::empty(&[0, 0, 0, 0], &[0, 0, 0, 0], 0)]
    #[case::slide(&[0, 0, 0, 2], &[2, 0, 0, 0], 0)]
    #[case::gap_merge(&[2, 0, 0, 2], &[4, 0, 0, 0], 4)]
    #[case::two_pairs(&[2, 2, 4, 4], &[4, 8, 0, 0], 12)]
    #[case::no_chain_merge(&[2, 2, 2, 2], &[4, 4, 0, 0], 8)]
    #[case::no_chain_merge_8s(&[8, 8, 8, 8], &[16, 16, 0, 0], 32)]
    #[case::merged_tile_not_remerged(&[4, 2, 2, 0], &[4, 4, 0, 0], 4)]
    #[case::odd_run(&[2, 2, 2, 0], &[4, 2, 0, 0], 4)]
    #[case::no_compatible(&[2, 4, 8, 16], &[2, 4, 8, 16], 0)]
    #[case::five_wide(&[2, 2, 4, 4, 8], &[4, 8, 8, 0, 0], 12)]
    #[case::two_wide(&[0, 2], &[2, 0], 0)]
    #[case::largest_pair_stays(&[TOP, TOP, 0, 0], &[TOP, TOP, 0, 0], 0)]
    #[case::below_largest_merges(&[TOP / 2, TOP / 2, 0, 0], &[TOP, 0, 0, 0], Score::from(TOP))]
    #[case::largest_pair_then_mergeable(&[TOP, TOP, 4, 4], &[TOP, TOP, 8, 0], 8)]
    fn merge(#[case] initial: &[Card], #[case] expected: &[Card], #[case] score: Score) {
        let (merged, gained) = merge_line(initial);
        assert_eq!(merged, expected.to_vec(), "merging {:?}", initial);
        assert_eq!(gained, score, "merging {:?}", initial);
    }

    #[rstest]
    #[case::left(Direction::Left, vec![
        vec![Idx(0, 0), Idx(1, 0), Idx(2, 0)],
        vec![Idx(0, 1), Idx(1, 1), Idx(2, 1)],
    ])]
    #[case::right(Direction::Right, vec![
        vec![Idx(2, 0), Idx(1, 0), Idx(0, 0)],
        vec![Idx(2, 1), Idx(1, 1), Idx(0, 1)],
    ])]
    #[case::up(Direction::Up, vec![
        vec![Idx(0, 0), Idx(0, 1)],
        vec![Idx(1, 0), Idx(1, 1)],
        vec![Idx(2, 0), Idx(2, 1)],
    ])]
    #[case::down(Direction::Down, vec![
        vec![Idx(0, 1), Idx(0, 0)],
        vec![Idx(1, 1), Idx(1, 0)],
        vec![Idx(2, 1), Idx(2, 0)],
    ])]
    fn lines_on_rectangular_grid(#[case] direction: Direction, #[case] expected: Vec<Vec<Idx>>) {
        let g = Grid::new(3, 2);
        assert_eq!(g.lines(direction), expected, "lines {}", direction);
    }

    #[test]
    fn rows_are_independent_copies() {
        let g = grid(&[&[2, 0], &[0, 4]]);
        let mut rows = g.rows();
        rows[0][0] = 1024;
        assert_eq!(g.get(&Idx(0, 0)), 2);
        assert_eq!(rows, vec![vec![1024, 0], vec![0, 4]]);
    }

    #[rstest]
    #[case::horizontal_pair(vec![vec![2, 4, 8], vec![16, 16, 2]], true)]
    #[case::vertical_pair(vec![vec![2, 4, 8], vec![16, 4, 2]], true)]
    #[case::no_pair(vec![vec![2, 4, 8], vec![16, 32, 2]], false)]
    #[case::zeros_count_as_pair(vec![vec![0, 0, 8], vec![16, 32, 2]], true)]
    fn adjacent_pairs(#[case] rows: Vec<Vec<Card>>, #[case] expected: bool) {
        let mut g = Grid::new(rows[0].len(), rows.len());
        g.fill_from_rows(&rows);
        assert_eq!(g.has_adjacent_pair(), expected);
    }

    #[test]
    fn first_at_least_scans_row_major() {
        let g = grid(&[&[0, 0, 64], &[128, 0, 0]]);
        assert_eq!(g.first_at_least(64), Some(Idx(2, 0)));
        assert_eq!(g.first_at_least(128), Some(Idx(0, 1)));
        assert_eq!(g.first_at_least(256), None);
    }

    #[test]
    fn empty_and_full() {
        let g = grid(&[&[2, 0], &[4, 8]]);
        assert_eq!(g.empty_cells(), vec![Idx(1, 0)]);
        assert!(!g.is_full());
        assert_eq!(g.non_empty_count(), 3);
        assert_eq!(g.max_tile(), 8);
        assert!(grid(&[&[2, 4], &[4, 8]]).is_full());
    }
}
