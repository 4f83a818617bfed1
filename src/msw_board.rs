// Board model: mine layout, reveal/flag state and the flood-fill reveal
// Knows nothing about timing, game status or rendering

use rand::Rng;
use tracing::debug;

use crate::msw_error::BoardError;

/// Side length of the classic board
pub const BOARD_SIDE: usize = 9;
/// Mines placed on the classic board
pub const MINE_COUNT: usize = 10;

/// A single cell on the board
/// The adjacent-mine count is not stored; it is scanned on demand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub mine: bool,     // Contains a mine
    pub revealed: bool, // Opened by the player or by a cascade
    pub flagged: bool,  // Marked by the player as a suspected mine
}

/// Square minefield addressed by (row, col)
#[derive(Debug, Clone)]
pub struct Board {
    side: usize,
    cells: Vec<Cell>,
    mine_count: usize,
    mines_placed: bool,
}

impl Board {
    /// Create an empty board; mines are placed separately
    pub fn new(side: usize) -> Self {
        let side = side.max(1);
        Board {
            side,
            cells: vec![Cell::default(); side * side],
            mine_count: 0,
            mines_placed: false,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.side && col < self.side
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }

    fn position(&self, index: usize) -> (usize, usize) {
        (index / self.side, index % self.side)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|c| c.mine)
    }

    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|c| c.revealed)
    }

    pub fn is_flagged(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some_and(|c| c.flagged)
    }

    /// In-bounds Moore neighbourhood of a cell, excluding the cell itself
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let last = self.side - 1;
        let rows = row.saturating_sub(1)..=(row + 1).min(last);
        rows.flat_map(move |r| {
            (col.saturating_sub(1)..=(col + 1).min(last)).map(move |c| (r, c))
        })
        .filter(move |&pos| pos != (row, col))
    }

    pub fn mine_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.mine)
            .map(|(i, _)| self.position(i))
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|c| c.flagged).count()
    }

    /// True once every non-mine cell has been revealed
    pub fn all_safe_revealed(&self) -> bool {
        self.cells.iter().all(|c| c.mine || c.revealed)
    }

    fn check_placement(&self, requested: usize) -> Result<(), BoardError> {
        if self.mines_placed {
            return Err(BoardError::MinesAlreadyPlaced);
        }
        let cells = self.cells.len();
        if requested >= cells {
            return Err(BoardError::TooManyMines { requested, cells });
        }
        Ok(())
    }

    /// Randomly place `count` distinct mines using the supplied generator
    /// Must be called once, before any reveal
    pub fn place_mines<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), BoardError> {
        self.check_placement(count)?;
        let n = self.cells.len();
        let mut chosen = vec![false; n];
        let mut positions = Vec::with_capacity(count);
        while positions.len() < count {
            let i = rng.gen_range(0..n);
            if !chosen[i] {
                chosen[i] = true;
                positions.push(self.position(i));
            }
        }
        self.place_mines_at(&positions)
    }

    /// Place mines at known positions (fixed layouts)
    pub fn place_mines_at(&mut self, positions: &[(usize, usize)]) -> Result<(), BoardError> {
        self.check_placement(positions.len())?;
        let mut mask = vec![false; self.cells.len()];
        for &(row, col) in positions {
            if !self.in_bounds(row, col) {
                return Err(BoardError::OutOfBounds { row, col });
            }
            let i = self.index(row, col);
            if mask[i] {
                return Err(BoardError::DuplicateMine { row, col });
            }
            mask[i] = true;
        }
        for (cell, mine) in self.cells.iter_mut().zip(mask) {
            cell.mine = mine;
        }
        self.mine_count = positions.len();
        self.mines_placed = true;
        debug!(side = self.side, mines = positions.len(), "mines placed");
        Ok(())
    }

    /// Count mines among the in-bounds neighbours of (row, col)
    pub fn count_adjacent_mines(&self, row: usize, col: usize) -> u8 {
        self.neighbors(row, col)
            .filter(|&(r, c)| self.cells[self.index(r, c)].mine)
            .count() as u8
    }

    /// Flag every mine that is still hidden (end of a won game)
    pub fn flag_all_mines(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.mine && !c.revealed) {
            cell.flagged = true;
        }
    }

    /// Flip the flag on a hidden cell
    /// Returns false (and does nothing) for revealed or out-of-bounds cells
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> bool {
        if !self.in_bounds(row, col) {
            return false;
        }
        let idx = self.index(row, col);
        if self.cells[idx].revealed {
            return false;
        }
        self.cells[idx].flagged = !self.cells[idx].flagged;
        true
    }

    /// Reveal a cell and, when it has no adjacent mines, the whole connected
    /// zero region plus its numbered border.
    ///
    /// Returns the newly revealed cells in reveal order. Out-of-bounds,
    /// revealed or flagged cells yield an empty list. Flagged cells inside a
    /// cascade are left hidden.
    pub fn reveal(&mut self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut opened = Vec::new();
        match self.cell(row, col) {
            Some(c) if !c.revealed && !c.flagged => {}
            _ => return opened,
        }

        // explicit worklist: depth is bounded by the heap, not the call stack
        let mut pending = vec![(row, col)];
        while let Some((r, c)) = pending.pop() {
            let idx = self.index(r, c);
            let cell = self.cells[idx];
            if cell.revealed || cell.flagged {
                continue;
            }
            self.cells[idx].revealed = true;
            opened.push((r, c));
            if cell.mine {
                continue;
            }
            if self.count_adjacent_mines(r, c) == 0 {
                pending.extend(self.neighbors(r, c).filter(|&(nr, nc)| {
                    let n = self.cells[self.index(nr, nc)];
                    !n.revealed && !n.flagged
                }));
            }
        }
        debug!(row, col, opened = opened.len(), "reveal");
        opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeSet, VecDeque};

    fn board_with(side: usize, mines: &[(usize, usize)]) -> Board {
        let mut board = Board::new(side);
        board.place_mines_at(mines).unwrap();
        board
    }

    fn revealed_set(board: &Board) -> BTreeSet<(usize, usize)> {
        (0..board.side())
            .flat_map(|r| (0..board.side()).map(move |c| (r, c)))
            .filter(|&(r, c)| board.is_revealed(r, c))
            .collect()
    }

    // Breadth-first zero region plus numbered border, computed independently
    fn expected_cascade(board: &Board, origin: (usize, usize)) -> BTreeSet<(usize, usize)> {
        let side = board.side() as i64;
        let mines = |r: i64, c: i64| -> u8 {
            let mut n = 0;
            for dr in -1..=1i64 {
                for dc in -1..=1i64 {
                    let (nr, nc) = (r + dr, c + dc);
                    if (dr, dc) != (0, 0)
                        && (0..side).contains(&nr)
                        && (0..side).contains(&nc)
                        && board.is_mine(nr as usize, nc as usize)
                    {
                        n += 1;
                    }
                }
            }
            n
        };
        let mut seen = BTreeSet::from([origin]);
        let mut queue = VecDeque::from([origin]);
        while let Some((r, c)) = queue.pop_front() {
            if mines(r as i64, c as i64) != 0 {
                continue;
            }
            for dr in -1..=1i64 {
                for dc in -1..=1i64 {
                    let (nr, nc) = (r as i64 + dr, c as i64 + dc);
                    if (0..side).contains(&nr) && (0..side).contains(&nc) {
                        let p = (nr as usize, nc as usize);
                        if seen.insert(p) {
                            queue.push_back(p);
                        }
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn random_placement_marks_exactly_count_distinct_cells() {
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(BOARD_SIDE);
            board.place_mines(MINE_COUNT, &mut rng).unwrap();

            let mines: BTreeSet<_> = board.mine_positions().collect();
            assert_eq!(mines.len(), MINE_COUNT);
            assert_eq!(board.mine_positions().count(), MINE_COUNT);
            assert_eq!(board.mine_count(), MINE_COUNT);
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let layout = |seed| {
            let mut board = Board::new(BOARD_SIDE);
            board.place_mines(MINE_COUNT, &mut StdRng::seed_from_u64(seed)).unwrap();
            board.mine_positions().collect::<Vec<_>>()
        };
        assert_eq!(layout(7), layout(7));
    }

    #[test]
    fn placement_rejects_full_board_and_second_call() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut board = Board::new(3);
        assert_eq!(
            board.place_mines(9, &mut rng),
            Err(BoardError::TooManyMines { requested: 9, cells: 9 })
        );
        assert_eq!(board.mine_positions().count(), 0);

        board.place_mines(8, &mut rng).unwrap();
        assert_eq!(board.place_mines(1, &mut rng), Err(BoardError::MinesAlreadyPlaced));
        assert_eq!(board.place_mines_at(&[(0, 0)]), Err(BoardError::MinesAlreadyPlaced));
    }

    #[test]
    fn fixed_placement_validates_positions() {
        let mut board = Board::new(4);
        assert_eq!(
            board.place_mines_at(&[(0, 0), (4, 1)]),
            Err(BoardError::OutOfBounds { row: 4, col: 1 })
        );
        assert_eq!(
            board.place_mines_at(&[(2, 2), (2, 2)]),
            Err(BoardError::DuplicateMine { row: 2, col: 2 })
        );
        board.place_mines_at(&[(1, 3)]).unwrap();
        assert!(board.is_mine(1, 3));
        assert_eq!(board.mine_count(), 1);
    }

    #[test]
    fn adjacent_count_matches_chebyshev_scan() {
        let mut board = Board::new(BOARD_SIDE);
        board.place_mines(20, &mut StdRng::seed_from_u64(42)).unwrap();
        for r in 0..BOARD_SIDE {
            for c in 0..BOARD_SIDE {
                let expected = board
                    .mine_positions()
                    .filter(|&(mr, mc)| (mr, mc) != (r, c) && mr.abs_diff(r) <= 1 && mc.abs_diff(c) <= 1)
                    .count() as u8;
                assert_eq!(board.count_adjacent_mines(r, c), expected, "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn adjacent_count_clamps_at_edges_and_skips_self() {
        let board = board_with(3, &[(0, 1), (1, 0), (1, 1)]);
        assert_eq!(board.count_adjacent_mines(0, 0), 3);
        assert_eq!(board.count_adjacent_mines(2, 2), 1);
        assert_eq!(board.count_adjacent_mines(1, 1), 2);

        let lone = board_with(3, &[(0, 0)]);
        assert_eq!(lone.count_adjacent_mines(0, 0), 0);
        assert_eq!(lone.neighbors(0, 0).count(), 3);
        assert_eq!(lone.neighbors(1, 1).count(), 8);
        assert_eq!(lone.neighbors(2, 1).count(), 5);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut board = board_with(3, &[(0, 0)]);
        assert_eq!(board.reveal(1, 1), vec![(1, 1)]);
        assert_eq!(revealed_set(&board), BTreeSet::from([(1, 1)]));
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut board = Board::new(BOARD_SIDE);
        board.place_mines(MINE_COUNT, &mut StdRng::seed_from_u64(3)).unwrap();
        let (r, c) = (0..BOARD_SIDE)
            .flat_map(|r| (0..BOARD_SIDE).map(move |c| (r, c)))
            .find(|&(r, c)| !board.is_mine(r, c))
            .unwrap();

        let first = board.reveal(r, c);
        let once = revealed_set(&board);
        let second = board.reveal(r, c);

        assert!(!first.is_empty());
        assert!(second.is_empty());
        assert_eq!(revealed_set(&board), once);
    }

    #[test]
    fn out_of_bounds_reveal_and_flag_are_ignored() {
        let mut board = board_with(3, &[(0, 0)]);
        assert!(board.reveal(3, 0).is_empty());
        assert!(board.reveal(0, 7).is_empty());
        assert!(!board.toggle_flag(5, 5));
        assert!(revealed_set(&board).is_empty());
    }

    #[test]
    fn seeded_wall_board_cascades_to_the_wall() {
        // A full row of mines across row 4 plus one in the far corner
        let mut mines: Vec<_> = (0..BOARD_SIDE).map(|c| (4, c)).collect();
        mines.push((8, 8));
        let mut board = board_with(BOARD_SIDE, &mines);
        assert_eq!(board.count_adjacent_mines(0, 0), 0);

        let opened = board.reveal(0, 0);

        let expected: BTreeSet<_> = (0..4)
            .flat_map(|r| (0..BOARD_SIDE).map(move |c| (r, c)))
            .collect();
        assert_eq!(opened.len(), 36);
        assert_eq!(revealed_set(&board), expected);
        assert_eq!(board.count_adjacent_mines(3, 0), 2);
        assert_eq!(board.count_adjacent_mines(3, 4), 3);
        assert_eq!(board.count_adjacent_mines(3, 8), 2);
        assert_eq!(board.count_adjacent_mines(2, 4), 0);
        assert!(!board.is_revealed(5, 0));
        assert!(!board.is_revealed(4, 4));
    }

    #[test]
    fn cascade_equals_zero_region_plus_border() {
        for seed in 0..30 {
            let mut board = Board::new(BOARD_SIDE);
            board.place_mines(MINE_COUNT, &mut StdRng::seed_from_u64(seed)).unwrap();
            let Some(origin) = (0..BOARD_SIDE)
                .flat_map(|r| (0..BOARD_SIDE).map(move |c| (r, c)))
                .find(|&(r, c)| !board.is_mine(r, c) && board.count_adjacent_mines(r, c) == 0)
            else {
                continue;
            };

            let expected = expected_cascade(&board, origin);
            let opened: BTreeSet<_> = board.reveal(origin.0, origin.1).into_iter().collect();

            assert_eq!(opened, expected, "seed {seed}");
            assert_eq!(revealed_set(&board), expected, "seed {seed}");
            assert!(opened.iter().all(|&(r, c)| !board.is_mine(r, c)));
        }
    }

    #[test]
    fn cascade_leaves_flagged_cells_hidden() {
        let mut board = board_with(5, &[(2, 2)]);
        assert!(board.toggle_flag(4, 4));

        let opened = board.reveal(0, 0);

        assert_eq!(opened.len(), 23);
        assert!(!board.is_revealed(4, 4));
        assert!(board.is_flagged(4, 4));
        assert!(board.is_revealed(3, 3));
        assert!(!board.is_revealed(2, 2));
        assert!(!board.all_safe_revealed());
    }

    #[test]
    fn flag_toggles_back_and_ignores_revealed_cells() {
        let mut board = board_with(3, &[(0, 0)]);
        let before = board.cell(2, 2);

        assert!(board.toggle_flag(2, 2));
        assert!(board.is_flagged(2, 2));
        assert_eq!(board.flagged_count(), 1);
        assert!(board.toggle_flag(2, 2));
        assert_eq!(board.cell(2, 2), before);

        board.reveal(1, 1);
        assert!(!board.toggle_flag(1, 1));
        assert!(!board.is_flagged(1, 1));
    }

    #[test]
    fn flag_all_mines_marks_only_mines() {
        let mut board = board_with(3, &[(0, 0), (2, 1)]);
        board.toggle_flag(0, 0);
        board.flag_all_mines();

        assert!(board.is_flagged(0, 0));
        assert!(board.is_flagged(2, 1));
        assert!(!board.is_flagged(1, 1));
        assert_eq!(board.flagged_count(), 2);
    }

    #[test]
    fn flagged_cell_cannot_be_revealed_directly() {
        let mut board = board_with(3, &[(0, 0)]);
        board.toggle_flag(2, 2);
        assert!(board.reveal(2, 2).is_empty());
        assert!(!board.is_revealed(2, 2));
    }

    #[test]
    fn large_empty_board_floods_without_recursion() {
        let mut board = Board::new(400);
        board.place_mines_at(&[]).unwrap();

        let opened = board.reveal(0, 0);

        assert_eq!(opened.len(), 400 * 400);
        assert!(board.all_safe_revealed());
    }
}
