// Game controller: session lifecycle, elapsed time and input dispatch
// Rendering happens through the injected GameView, never directly

use chrono::NaiveTime;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::info;

use crate::msw_board::{BOARD_SIDE, Board, MINE_COUNT};
use crate::msw_error::BoardError;

/// Lifecycle of one game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    NotStarted,
    Running,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

/// What a single cell should look like on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    RevealedMine,
}

impl CellView {
    /// Plain-text marker for the cell ("F" for flags, digits for counts)
    pub fn label(self) -> String {
        match self {
            CellView::Hidden => String::new(),
            CellView::Flagged => "F".to_string(),
            CellView::Revealed(0) => String::new(),
            CellView::Revealed(n) => n.to_string(),
            CellView::RevealedMine => "*".to_string(),
        }
    }
}

/// Outbound side of the UI collaborator
pub trait GameView {
    fn render_cell(&mut self, row: usize, col: usize, state: CellView);
    /// Called exactly once, when the game ends
    fn show_outcome(&mut self, won: bool, elapsed: &str);
    fn update_elapsed_time(&mut self, text: &str);
}

/// Format an elapsed duration as HH:MM:SS (clock style, hours wrap at 24)
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = (elapsed.as_secs() % 86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "00:00:00".to_string())
}

/// One game session: owns the board, the clock and the view
pub struct Game<V: GameView> {
    board: Board,
    status: GameStatus,
    start_time: Option<Instant>,
    elapsed: Duration,
    view: V,
}

impl<V: GameView> Game<V> {
    /// Start a classic 9x9 game with 10 mines placed by `rng`
    pub fn new<R: Rng + ?Sized>(view: V, rng: &mut R) -> Result<Self, BoardError> {
        let mut board = Board::new(BOARD_SIDE);
        board.place_mines(MINE_COUNT, rng)?;
        Ok(Self::with_board(board, view))
    }

    /// Start a game on a board whose mines are already placed
    pub fn with_board(board: Board, view: V) -> Self {
        let mut game = Game {
            board,
            status: GameStatus::NotStarted,
            start_time: None,
            elapsed: Duration::ZERO,
            view,
        };
        game.start(Instant::now());
        game
    }

    fn start(&mut self, now: Instant) {
        if self.status != GameStatus::NotStarted {
            return;
        }
        self.start_time = Some(now);
        self.status = GameStatus::Running;
        self.view.update_elapsed_time(&format_elapsed(Duration::ZERO));
        info!(side = self.board.side(), mines = self.board.mine_count(), "game started");
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn elapsed_text(&self) -> String {
        format_elapsed(self.elapsed)
    }

    /// Mine counter display value; negative when over-flagged
    pub fn remaining_mines(&self) -> isize {
        self.board.mine_count() as isize - self.board.flagged_count() as isize
    }

    /// Primary action (left click): reveal, or lose on a mine
    pub fn on_primary(&mut self, row: usize, col: usize) {
        if self.status != GameStatus::Running {
            return;
        }
        if !self.board.in_bounds(row, col)
            || self.board.is_revealed(row, col)
            || self.board.is_flagged(row, col)
        {
            return;
        }
        if self.board.is_mine(row, col) {
            info!(row, col, "mine hit");
            self.end_game(false, Instant::now());
            return;
        }
        for (r, c) in self.board.reveal(row, col) {
            let count = self.board.count_adjacent_mines(r, c);
            self.view.render_cell(r, c, CellView::Revealed(count));
        }
        if self.board.all_safe_revealed() {
            self.end_game(true, Instant::now());
        }
    }

    /// Secondary action (right click): toggle the flag on a hidden cell
    pub fn on_secondary(&mut self, row: usize, col: usize) {
        if self.status != GameStatus::Running {
            return;
        }
        if self.board.toggle_flag(row, col) {
            let state = if self.board.is_flagged(row, col) {
                CellView::Flagged
            } else {
                CellView::Hidden
            };
            self.view.render_cell(row, col, state);
        }
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    /// Timer event with an explicit "now"
    pub fn on_tick_at(&mut self, now: Instant) {
        if self.status != GameStatus::Running {
            return;
        }
        if let Some(t0) = self.start_time {
            self.elapsed = now.saturating_duration_since(t0);
            self.view.update_elapsed_time(&format_elapsed(self.elapsed));
        }
    }

    fn end_game(&mut self, won: bool, now: Instant) {
        if self.status.is_over() {
            return;
        }
        if let Some(t0) = self.start_time {
            self.elapsed = now.saturating_duration_since(t0);
        }
        self.status = if won { GameStatus::Won } else { GameStatus::Lost };
        if won {
            self.board.flag_all_mines();
        }

        let marker = if won { CellView::Flagged } else { CellView::RevealedMine };
        let mines: Vec<_> = self.board.mine_positions().collect();
        for (r, c) in mines {
            self.view.render_cell(r, c, marker);
        }

        let text = format_elapsed(self.elapsed);
        self.view.update_elapsed_time(&text);
        self.view.show_outcome(won, &text);
        info!(won, elapsed = %text, "game over");
    }
}
