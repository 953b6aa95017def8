// Terminal front end: draws the queried game state and turns key/mouse input into session calls
// Owns no game rules; everything it shows comes from GameSession and HighScoreTable

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::msw_board::CellView;
use crate::msw_color::Palette;
use crate::msw_config::{Config, save_config};
use crate::msw_difficulty::Difficulty;
use crate::msw_score::HighScoreTable;
use crate::msw_session::{Click, ClickOutcome, Face, GameSession, counter_digits};

const TICK_RATE: Duration = Duration::from_millis(200);
const MAX_NAME_WIDTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    None,
    Difficulty,
    Scores,
    NameEntry(String),
}

struct App<'a> {
    cfg: &'a mut Config,
    cfg_path: &'a Path,
    scores: &'a mut HighScoreTable,
    session: GameSession,
    palette: Palette,
    cursor: (usize, usize),     // (row, col) of the keyboard cursor
    board_rect: Option<Rect>,   // Last drawn board area, for mouse hit-testing
    pressing: bool,             // Left button held over the board
    paused_before_scores: bool, // Clock was already paused when the table opened
    modal: Modal,
    quit: bool,
}

impl<'a> App<'a> {
    fn new(cfg: &'a mut Config, cfg_path: &'a Path, scores: &'a mut HighScoreTable) -> Self {
        let mut session = match cfg.seed {
            Some(seed) => GameSession::seeded(cfg.difficulty(), seed),
            None => GameSession::new(cfg.difficulty()),
        };
        session.set_lock_on_pause(cfg.pause_locks_board);
        App {
            cfg,
            cfg_path,
            scores,
            session,
            palette: Palette::detect(),
            cursor: (0, 0),
            board_rect: None,
            pressing: false,
            paused_before_scores: false,
            modal: Modal::None,
            quit: false,
        }
    }

    fn new_game(&mut self, difficulty: Difficulty) {
        self.session.new_game(difficulty);
        self.cursor = (0, 0);
        self.pressing = false;
        self.modal = Modal::None;
    }

    fn choose_difficulty(&mut self, difficulty: Difficulty) {
        self.cfg.set_difficulty(&difficulty);
        save_config(self.cfg, self.cfg_path);
        self.new_game(difficulty);
    }

    fn click(&mut self, row: usize, col: usize, click: Click) {
        match self.session.click(row, col, click) {
            ClickOutcome::NoChange => {}
            ClickOutcome::Revealed(adj) => debug!(row, col, adj, "revealed"),
            ClickOutcome::Flagged { flagged, mines_left } => {
                debug!(row, col, flagged, mines_left, "flag toggled")
            }
            ClickOutcome::Lost => debug!(row, col, "mine hit"),
            ClickOutcome::Won => {
                let secs = self.session.elapsed_secs();
                if self.scores.is_qualifying(secs, self.session.difficulty()) {
                    self.modal = Modal::NameEntry(self.cfg.player_name.clone());
                }
            }
        }
    }

    fn submit_name(&mut self, name: String) {
        let secs = self.session.elapsed_secs();
        let difficulty = self.session.difficulty().clone();
        if self.scores.submit(&name, secs, &difficulty) {
            self.cfg.player_name = name.trim().to_string();
            save_config(self.cfg, self.cfg_path);
        }
        self.modal = Modal::Scores;
    }

    fn toggle_scores(&mut self) {
        // the table hides the board, so the clock stops while it is open
        if self.modal == Modal::Scores {
            self.modal = Modal::None;
            if !self.paused_before_scores {
                self.session.resume();
            }
        } else {
            self.paused_before_scores = self.session.is_paused();
            self.modal = Modal::Scores;
            self.session.pause();
        }
    }

    fn toggle_pause(&mut self) {
        if self.session.is_paused() {
            self.session.resume();
        } else {
            self.session.pause();
        }
    }

    fn step_cursor(&mut self, dr: isize, dc: isize) {
        let d = self.session.difficulty();
        let r = (self.cursor.0 as isize + dr).clamp(0, d.rows() as isize - 1) as usize;
        let c = (self.cursor.1 as isize + dc).clamp(0, d.cols() as isize - 1) as usize;
        self.cursor = (r, c);
    }

    fn on_key(&mut self, code: KeyCode) {
        match &mut self.modal {
            Modal::NameEntry(name) => match code {
                KeyCode::Char(c) if !c.is_control() => {
                    if name.as_str().width() < MAX_NAME_WIDTH {
                        name.push(c);
                    }
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => {
                    let name = std::mem::take(name);
                    self.submit_name(name);
                }
                KeyCode::Esc => self.modal = Modal::None,
                _ => {}
            },
            Modal::Scores => match code {
                KeyCode::Char('r') | KeyCode::Char('R') => self.scores.reset(),
                KeyCode::Esc | KeyCode::F(4) | KeyCode::Char('h') | KeyCode::Enter => {
                    self.toggle_scores()
                }
                _ => {}
            },
            Modal::Difficulty => match code {
                KeyCode::Char(n @ '1'..='3') => {
                    let idx = n as usize - '1' as usize;
                    self.choose_difficulty(Difficulty::PRESETS[idx].clone());
                }
                KeyCode::Char('4') => match self.cfg.custom_difficulty() {
                    Ok(custom) => self.choose_difficulty(custom),
                    Err(err) => debug!("custom board unavailable: {err}"),
                },
                KeyCode::Esc | KeyCode::F(5) => self.modal = Modal::None,
                _ => {}
            },
            Modal::None => match code {
                KeyCode::Esc | KeyCode::Char('q') => self.quit = true,
                KeyCode::F(2) | KeyCode::Char('n') => {
                    let d = self.session.difficulty().clone();
                    self.new_game(d);
                }
                KeyCode::F(4) | KeyCode::Char('h') => self.toggle_scores(),
                KeyCode::F(5) | KeyCode::Char('d') => self.modal = Modal::Difficulty,
                KeyCode::Char('p') | KeyCode::Char('P') => self.toggle_pause(),
                KeyCode::Left => self.step_cursor(0, -1),
                KeyCode::Right => self.step_cursor(0, 1),
                KeyCode::Up => self.step_cursor(-1, 0),
                KeyCode::Down => self.step_cursor(1, 0),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let (r, c) = self.cursor;
                    self.click(r, c, Click::Reveal);
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    let (r, c) = self.cursor;
                    self.click(r, c, Click::Flag);
                }
                _ => {}
            },
        }
    }

    /// Map a terminal position to a board cell; cells are two columns wide
    fn cell_at(&self, column: u16, row: u16) -> Option<(usize, usize)> {
        let b = self.board_rect?;
        let inner = Rect::new(b.x + 1, b.y + 1, b.width.saturating_sub(2), b.height.saturating_sub(2));
        if column < inner.x || row < inner.y || row >= inner.y + inner.height {
            return None;
        }
        let r = usize::from(row - inner.y);
        let c = usize::from((column - inner.x) / 2);
        self.session.board().contains(r, c).then_some((r, c))
    }

    fn on_mouse(&mut self, me: MouseEvent) {
        if self.modal != Modal::None {
            return;
        }
        let cell = self.cell_at(me.column, me.row);
        match me.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressing = cell.is_some();
                if let Some(pos) = cell {
                    self.cursor = pos;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(pos) = cell {
                    self.cursor = pos;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.pressing {
                    if let Some((r, c)) = cell {
                        self.click(r, c, Click::Reveal);
                    }
                }
                self.pressing = false;
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some((r, c)) = cell {
                    self.cursor = (r, c);
                    self.click(r, c, Click::Flag);
                }
            }
            _ => {}
        }
    }
}

/// Run the game until the player quits
pub fn run(cfg: &mut Config, cfg_path: &Path, scores: &mut HighScoreTable) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cfg, cfg_path, scores);
    let result = event_loop(&mut terminal, &mut app);

    // restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    while !app.quit {
        terminal.draw(|f| draw(f, app))?;
        // redraw at least every tick so the clock keeps moving
        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => app.on_key(code),
                Event::Mouse(me) => app.on_mouse(me),
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw<B: Backend>(f: &mut Frame<'_, B>, app: &mut App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4), Constraint::Length(3)].as_ref())
        .split(size);

    draw_header(f, app, chunks[0]);
    draw_board(f, app, chunks[1]);
    draw_help(f, app, chunks[2]);

    match app.modal.clone() {
        Modal::None => {}
        Modal::Difficulty => draw_difficulty(f, app, size),
        Modal::Scores => draw_scores(f, app, size),
        Modal::NameEntry(name) => draw_name_entry(f, app, &name, size),
    }
}

fn face_text(face: Face) -> &'static str {
    match face {
        Face::Smile => ":)",
        Face::Pressed => ":O",
        Face::Dead => "X(",
        Face::Cool => "B)",
    }
}

fn icon(ascii: bool, plain: &str, fancy: &str) -> String {
    String::from(if ascii { plain } else { fancy })
}

fn draw_header<B: Backend>(f: &mut Frame<'_, B>, app: &App, area: Rect) {
    let s = &app.session;
    let counter = Style::default().fg(app.palette.counter).add_modifier(Modifier::BOLD);
    let clock = if s.is_paused() { "PAUSED".to_string() } else { counter_digits(s.elapsed_secs() as isize) };
    let line = Spans::from(vec![
        Span::styled(counter_digits(s.mines_left()), counter),
        Span::raw("   "),
        Span::styled(face_text(s.face(app.pressing)), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(clock, counter),
    ]);
    let title = format!(
        " {} {} mines | cleared {}/{} | flags {} ",
        s.difficulty(),
        s.board().mine_count(),
        s.revealed_safe_count(),
        s.difficulty().total_safe_clicks(),
        s.flagged_count()
    );
    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn draw_board<B: Backend>(f: &mut Frame<'_, B>, app: &mut App, area: Rect) {
    let s = &app.session;
    let d = s.difficulty();
    let p = &app.palette;
    let ascii = app.cfg.ascii_icons;
    let board_area = center_rect((d.cols() * 2) as u16 + 2, d.rows() as u16 + 2, area);

    let mut lines = Vec::with_capacity(d.rows());
    for r in 0..d.rows() {
        let mut spans = Vec::with_capacity(d.cols());
        for c in 0..d.cols() {
            let base = Style::default().bg(p.board_bg);
            let (glyph, mut style) = match s.cell(r, c) {
                CellView::Covered => (icon(ascii, "#", "■"), base.fg(p.covered)),
                CellView::Flagged => (icon(ascii, "F", "⚑"), base.fg(p.flag)),
                CellView::Mine => (icon(ascii, "*", "☼"), base.fg(p.mine)),
                CellView::Revealed(0) => (" ".to_string(), base),
                CellView::Revealed(n) => (n.to_string(), base.fg(p.number(n))),
            };
            if s.board().detonated() == Some((r, c)) {
                style = style.bg(p.detonated_bg);
            } else if app.cursor == (r, c) && !s.status().is_over() {
                style = style.bg(p.cursor_bg);
            }
            spans.push(Span::styled(format!("{glyph} "), style));
        }
        lines.push(Spans::from(spans));
    }

    let board = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(d.name().to_string()).title_alignment(Alignment::Center));
    f.render_widget(board, board_area);
    app.board_rect = Some(board_area);
}

fn draw_help<B: Backend>(f: &mut Frame<'_, B>, app: &App, area: Rect) {
    let key = Style::default().fg(app.palette.key).add_modifier(Modifier::BOLD);
    let items = [("F2", "New"), ("F4", "Scores"), ("F5", "Difficulty"), ("P", "Pause"), ("F", "Flag"), ("Esc", "Exit")];
    let mut spans = vec![Span::raw(" ")];
    for (i, (k, label)) in items.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(*k, key));
        spans.push(Span::raw(format!(": {label}")));
    }
    let help = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn modal_block<B: Backend>(f: &mut Frame<'_, B>, title: &str, w: u16, h: u16, size: Rect) -> Rect {
    let rect = center_rect(w, h, size);
    f.render_widget(Clear, rect);
    f.render_widget(Block::default().borders(Borders::ALL).title(title.to_string()), rect);
    Rect::new(rect.x + 1, rect.y + 1, rect.width.saturating_sub(2), rect.height.saturating_sub(2))
}

fn draw_difficulty<B: Backend>(f: &mut Frame<'_, B>, app: &App, size: Rect) {
    let inner = modal_block(f, "Difficulty", 44, 9, size);
    let current = app.session.difficulty();
    let mut lines = vec![Spans::from("")];
    let custom = app.cfg.custom_difficulty().ok();
    let choices = Difficulty::PRESETS.into_iter().map(Some).chain([custom]);
    for (i, choice) in choices.enumerate() {
        let line = match &choice {
            Some(d) => format!(
                " {}) {:<13} {:>2}x{:<2} {:>3} mines",
                i + 1,
                d.name(),
                d.rows(),
                d.cols(),
                d.mines()
            ),
            None => format!(" {}) {:<13} (invalid in config)", i + 1, Difficulty::CUSTOM_NAME),
        };
        let style = if choice.as_ref() == Some(current) {
            Style::default().fg(app.palette.key).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Spans::from(Span::styled(line, style)));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(" 1-4 to choose, Esc to close"));
    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn draw_scores<B: Backend>(f: &mut Frame<'_, B>, app: &App, size: Rect) {
    let text = app.scores.render();
    let width = text.lines().map(|l| l.width()).max().unwrap_or(0).max(30) as u16 + 4;
    let height = text.lines().count() as u16 + 5;
    let inner = modal_block(f, "High Scores", width, height, size);
    let mut lines: Vec<Spans> = vec![Spans::from("")];
    lines.extend(text.lines().map(|l| Spans::from(l.to_string())));
    lines.push(Spans::from(""));
    lines.push(Spans::from("R: reset   Esc: close"));
    // left-aligned so the fixed-width columns line up
    f.render_widget(Paragraph::new(Text::from(lines)).alignment(Alignment::Left), inner);
}

fn draw_name_entry<B: Backend>(f: &mut Frame<'_, B>, app: &App, name: &str, size: Rect) {
    let inner = modal_block(f, "New Record", 40, 8, size);
    let secs = app.session.elapsed_secs();
    let field = format!("{name}{}", " ".repeat(MAX_NAME_WIDTH.saturating_sub(name.width())));
    let lines = vec![
        Spans::from(""),
        Spans::from(format!("{} cleared in {} seconds!", app.session.difficulty(), secs)),
        Spans::from(""),
        Spans::from(vec![
            Span::raw("Name: "),
            Span::styled(field, Style::default().add_modifier(Modifier::REVERSED)),
        ]),
        Spans::from(""),
        Spans::from("Enter: save   Esc: skip"),
    ];
    f.render_widget(Paragraph::new(Text::from(lines)).alignment(Alignment::Center), inner);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width - width) / 2;
    let y = r.y + (r.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msw_session::Status;

    fn app<'a>(cfg: &'a mut Config, scores: &'a mut HighScoreTable) -> App<'a> {
        App::new(cfg, Path::new("mswpr-test.toml"), scores)
    }

    #[test]
    fn closing_scores_keeps_a_manual_pause() {
        let mut cfg = Config::default();
        let mut scores = HighScoreTable::in_memory();
        let mut app = app(&mut cfg, &mut scores);
        app.on_key(KeyCode::Char('p'));
        assert!(app.session.is_paused());
        app.on_key(KeyCode::Char('h'));
        assert_eq!(app.modal, Modal::Scores);
        app.on_key(KeyCode::Char('h'));
        assert_eq!(app.modal, Modal::None);
        assert!(app.session.is_paused());
    }

    #[test]
    fn closing_scores_resumes_a_running_clock() {
        let mut cfg = Config::default();
        let mut scores = HighScoreTable::in_memory();
        let mut app = app(&mut cfg, &mut scores);
        app.on_key(KeyCode::F(4));
        assert!(app.session.is_paused());
        app.on_key(KeyCode::Esc);
        assert!(!app.session.is_paused());
        assert_eq!(app.session.status(), Status::Ongoing);
    }

    #[test]
    fn configured_seed_reproduces_the_layout() {
        let mut cfg = Config {
            seed: Some(7),
            ..Config::default()
        };
        let mut scores = HighScoreTable::in_memory();
        let first = app(&mut cfg, &mut scores).session.board().clone();
        let expected = GameSession::seeded(Difficulty::BEGINNER, 7);
        let mut a: Vec<_> = (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .filter(|&(r, c)| first.cell(r, c).mine)
            .collect();
        let mut b: Vec<_> = (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .filter(|&(r, c)| expected.board().cell(r, c).mine)
            .collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }
}
