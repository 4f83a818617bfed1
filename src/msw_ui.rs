// Terminal UI: crossterm event loop and ratatui rendering
// TuiView mirrors what the controller pushes; drawing reads only from it

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use crate::msw_board::BOARD_SIDE;
use crate::msw_color::Palette;
use crate::msw_config::{Config, save_config};
use crate::msw_error::BoardError;
use crate::msw_game::{CellView, Game, GameStatus, GameView, format_elapsed};

/// End-of-game notice pushed by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub won: bool,
    pub elapsed: String,
}

/// GameView backed by plain data: the TUI draws only what the controller pushed
#[derive(Debug)]
pub struct TuiView {
    side: usize,
    cells: Vec<CellView>,
    elapsed: String,
    outcome: Option<Outcome>,
    outcome_dismissed: bool,
}

impl TuiView {
    pub fn new(side: usize) -> Self {
        TuiView {
            side,
            cells: vec![CellView::Hidden; side * side],
            elapsed: format_elapsed(Duration::ZERO),
            outcome: None,
            outcome_dismissed: false,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> CellView {
        if row < self.side && col < self.side {
            self.cells[row * self.side + col]
        } else {
            CellView::Hidden
        }
    }

    pub fn elapsed(&self) -> &str {
        &self.elapsed
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// True while the outcome dialog should be on screen
    pub fn showing_outcome(&self) -> bool {
        self.outcome.is_some() && !self.outcome_dismissed
    }

    pub fn dismiss_outcome(&mut self) {
        self.outcome_dismissed = true;
    }
}

impl GameView for TuiView {
    fn render_cell(&mut self, row: usize, col: usize, state: CellView) {
        if row < self.side && col < self.side {
            self.cells[row * self.side + col] = state;
        }
    }

    fn show_outcome(&mut self, won: bool, elapsed: &str) {
        if self.outcome.is_none() {
            self.outcome = Some(Outcome { won, elapsed: elapsed.to_string() });
        }
    }

    fn update_elapsed_time(&mut self, text: &str) {
        self.elapsed = text.to_string();
    }
}

// Runtime UI variables that are not part of the game itself
#[derive(Debug)]
struct UiState {
    cursor: (usize, usize), // (row, col)
    board_rect: Option<Rect>,
    ascii_icons: bool,
    show_indicator: bool,
}

impl UiState {
    fn new(cfg: &Config) -> Self {
        UiState {
            cursor: (0, 0),
            board_rect: None,
            ascii_icons: cfg.ascii_icons,
            show_indicator: cfg.show_indicator,
        }
    }

    fn step_cursor(&mut self, drow: isize, dcol: isize) {
        let last = (BOARD_SIDE - 1) as isize;
        let row = (self.cursor.0 as isize + drow).clamp(0, last) as usize;
        let col = (self.cursor.1 as isize + dcol).clamp(0, last) as usize;
        self.cursor = (row, col);
    }
}

/// Text drawn inside a cell; ASCII mode uses the plain cell labels
fn cell_glyph(state: CellView, ascii: bool) -> String {
    let text = match (state, ascii) {
        (CellView::Hidden, true) => "#".to_string(),
        (CellView::Hidden, false) => "■".to_string(),
        (CellView::Flagged, false) => "⚑".to_string(),
        (CellView::RevealedMine, false) => "☼".to_string(),
        (other, _) => other.label(),
    };
    if text.is_empty() { " ".to_string() } else { text }
}

const MENU_ITEMS: [(&str, &str); 3] = [("F2", "New"), ("F7", "Icons"), ("F8", "Indicator")];

fn new_game(rng: &mut StdRng) -> Result<Game<TuiView>, BoardError> {
    Game::new(TuiView::new(BOARD_SIDE), rng)
}

pub fn run(cfg: &mut Config) -> Result<(), Box<dyn Error>> {
    let palette = Palette::detect();
    let mut rng = match cfg.seed {
        Some(seed) => {
            info!(seed, "using fixed mine layout seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let mut game = new_game(&mut rng)?;
    let mut ui = UiState::new(cfg);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut game, &mut ui, &mut rng, &palette);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Persist preferences toggled during the session
    cfg.ascii_icons = ui.ascii_icons;
    cfg.show_indicator = ui.show_indicator;
    if let Err(e) = save_config(cfg) {
        warn!("could not save config: {e}");
    }
    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    game: &mut Game<TuiView>,
    ui: &mut UiState,
    rng: &mut StdRng,
    palette: &Palette,
) -> Result<(), Box<dyn Error>> {
    let frame_rate = Duration::from_millis(200);
    let tick_rate = Duration::from_secs(1);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &*game, &mut *ui, palette))?;

        let until_tick = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(until_tick.min(frame_rate))? {
            match event::read()? {
                Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => {
                    if game.view().showing_outcome() {
                        match code {
                            KeyCode::Esc => break,
                            KeyCode::F(2) => {
                                *game = new_game(rng)?;
                                ui.cursor = (0, 0);
                                last_tick = Instant::now();
                            }
                            _ => game.view_mut().dismiss_outcome(),
                        }
                        continue;
                    }
                    match code {
                        KeyCode::Esc => break,
                        KeyCode::F(2) => {
                            *game = new_game(rng)?;
                            ui.cursor = (0, 0);
                            last_tick = Instant::now();
                        }
                        KeyCode::F(7) => ui.ascii_icons = !ui.ascii_icons,
                        KeyCode::F(8) => ui.show_indicator = !ui.show_indicator,
                        KeyCode::Left => ui.step_cursor(0, -1),
                        KeyCode::Right => ui.step_cursor(0, 1),
                        KeyCode::Up => ui.step_cursor(-1, 0),
                        KeyCode::Down => ui.step_cursor(1, 0),
                        KeyCode::Char(' ') | KeyCode::Enter => {
                            let (r, c) = ui.cursor;
                            debug!(row = r, col = c, "primary (key)");
                            game.on_primary(r, c);
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            let (r, c) = ui.cursor;
                            debug!(row = r, col = c, "secondary (key)");
                            game.on_secondary(r, c);
                        }
                        _ => {}
                    }
                }
                Event::Mouse(me) => handle_mouse(me, game, ui),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            game.on_tick();
            last_tick = Instant::now();
        }
    }
    info!(status = ?game.status(), elapsed = %game.elapsed_text(), flags = game.board().flagged_count(), "leaving");
    Ok(())
}

fn handle_mouse(me: MouseEvent, game: &mut Game<TuiView>, ui: &mut UiState) {
    let target = ui.board_rect.and_then(|rect| cell_at(rect, me.column, me.row, BOARD_SIDE));
    match me.kind {
        MouseEventKind::Moved => {
            if let Some(pos) = target {
                ui.cursor = pos;
            }
        }
        MouseEventKind::Down(button) => {
            if game.view().showing_outcome() {
                game.view_mut().dismiss_outcome();
                return;
            }
            let Some((r, c)) = target else { return };
            ui.cursor = (r, c);
            match button {
                MouseButton::Left => {
                    debug!(row = r, col = c, "primary (mouse)");
                    game.on_primary(r, c);
                }
                MouseButton::Right => {
                    debug!(row = r, col = c, "secondary (mouse)");
                    game.on_secondary(r, c);
                }
                MouseButton::Middle => {}
            }
        }
        _ => {}
    }
}

/// Map a terminal position to a board cell; every cell is two columns wide
fn cell_at(board_rect: Rect, column: u16, row: u16, side: usize) -> Option<(usize, usize)> {
    let inner_x = board_rect.x + 1;
    let inner_y = board_rect.y + 1;
    if column < inner_x || row < inner_y {
        return None;
    }
    let col = ((column - inner_x) / 2) as usize;
    let row = (row - inner_y) as usize;
    if row < side && col < side { Some((row, col)) } else { None }
}

fn draw<B: Backend>(f: &mut Frame<B>, game: &Game<TuiView>, ui: &mut UiState, palette: &Palette) {
    let size = f.size();
    let min_width = 44u16;
    let min_height = BOARD_SIDE as u16 + 8;
    if size.width < min_width || size.height < min_height {
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!("Minimum required: {} x {}", min_width, min_height))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        let area = center_rect(40u16.min(size.width), 4u16.min(size.height), size);
        f.render_widget(warn, area);
        ui.board_rect = None;
        return;
    }

    // layout: top menu row, center board, bottom status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(BOARD_SIDE as u16 + 2), Constraint::Length(3)].as_ref())
        .split(size);

    let key_style = Style::default().fg(palette.resolve(Color::Yellow)).add_modifier(Modifier::BOLD);

    let mut menu_spans = vec![Span::raw(" ")];
    for (i, (key, rest)) in MENU_ITEMS.iter().enumerate() {
        if i > 0 {
            menu_spans.push(Span::raw("   "));
        }
        menu_spans.push(Span::styled(key.to_string(), key_style));
        menu_spans.push(Span::raw(format!(": {}", rest)));
    }
    let menu = Paragraph::new(Spans::from(menu_spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(menu, chunks[0]);

    // status row (left info + right-aligned Esc: Exit)
    let left_text = format!(" Mines: {}   Time: {} ", game.remaining_mines(), game.view().elapsed());
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let right_w = "Esc: Exit ".width();
    let gap = inner_w.saturating_sub(left_text.as_str().width() + right_w).max(1);
    let status = Paragraph::new(Spans::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(gap)),
        Span::styled("Esc", key_style),
        Span::raw(": Exit "),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    let board_area = center_rect((BOARD_SIDE * 2) as u16 + 3, BOARD_SIDE as u16 + 2, chunks[1]);
    ui.board_rect = Some(board_area);
    f.render_widget(board_paragraph(game, ui, palette), board_area);

    if let Some(outcome) = game.view().outcome().filter(|_| game.view().showing_outcome()) {
        draw_outcome(f, outcome, size, palette);
    }
}

fn board_paragraph<'a>(game: &Game<TuiView>, ui: &UiState, palette: &Palette) -> Paragraph<'a> {
    let hidden_bg = palette.resolve(Color::DarkGray);
    let open_bg = palette.resolve(Color::White);
    let cursor_bg = palette.resolve(Color::LightBlue);
    let indicator_fg = palette.resolve(Color::Yellow);
    let playing = game.status() == GameStatus::Running;
    let view = game.view();

    let mut lines = Vec::with_capacity(BOARD_SIDE);
    for row in 0..BOARD_SIDE {
        let mut spans = Vec::with_capacity(BOARD_SIDE + 1);
        for col in 0..BOARD_SIDE {
            let state = view.cell(row, col);
            let glyph = cell_glyph(state, ui.ascii_icons);
            let mut style = match state {
                CellView::Hidden => Style::default().fg(palette.resolve(Color::Gray)).bg(hidden_bg),
                CellView::Flagged => Style::default().fg(palette.resolve(Color::Red)).bg(hidden_bg),
                CellView::Revealed(0) => Style::default().bg(open_bg),
                CellView::Revealed(n) => Style::default().fg(palette.count_color(n)).bg(open_bg).add_modifier(Modifier::BOLD),
                CellView::RevealedMine => Style::default().fg(palette.resolve(Color::Black)).bg(palette.resolve(Color::Red)),
            };
            let at_cursor = playing && ui.cursor == (row, col);
            if at_cursor {
                style = style.bg(cursor_bg);
            }
            if at_cursor && ui.show_indicator {
                spans.push(Span::styled("▸", style.fg(indicator_fg).add_modifier(Modifier::BOLD)));
                spans.push(Span::styled(glyph, style));
            } else {
                spans.push(Span::styled(format!(" {}", glyph), style));
            }
        }
        // padding column so the right edge uses the board background
        spans.push(Span::styled(" ", Style::default().bg(hidden_bg)));
        lines.push(Spans::from(spans));
    }
    Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL).title("Minesweeper").title_alignment(Alignment::Center))
}

fn draw_outcome<B: Backend>(f: &mut Frame<B>, outcome: &Outcome, size: Rect, palette: &Palette) {
    let (title, message) = if outcome.won {
        ("Success", "Congratulations! You won!")
    } else {
        ("Failure", "Game Over. You clicked on a mine.")
    };
    let rect = center_rect(40, 7, size);
    let hint_style = Style::default().fg(palette.resolve(Color::DarkGray));
    let lines = vec![
        Spans::from(Span::raw("")),
        Spans::from(Span::raw(message)),
        Spans::from(Span::raw(format!("Time: {}", outcome.elapsed))),
        Spans::from(Span::raw("")),
        Spans::from(Span::styled("any key: close   F2: new game", hint_style)),
    ];
    let p = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width - width) / 2;
    let y = r.y + (r.height - height) / 2;
    Rect::new(x, y, width, height)
}
