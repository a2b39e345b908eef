use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tui_textarea::TextArea;

use crypto_escape::engine::{FeedbackKind, PuzzleStatus};
use crypto_escape::puzzle::{load_catalog, Theme};
use crypto_escape::store::{FileStore, MemoryStore, SessionStore, StoreEvent};
use crypto_escape::{AdvanceOutcome, GameConfig, ProgressionEngine, SubmitOutcome};

type Engine = ProgressionEngine<Box<dyn SessionStore>>;

enum Screen {
    Title,
    Playing,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Continue,
    NewGame,
    Quit,
}

impl MenuOption {
    fn next(self) -> Self {
        match self {
            MenuOption::Continue => MenuOption::NewGame,
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::Quit => MenuOption::Continue,
        }
    }

    fn prev(self) -> Self {
        self.next().next()
    }
}

#[derive(PartialEq, Eq)]
enum Focus {
    Puzzles,
    Answer,
}

struct App<'a> {
    engine: Engine,
    score: Rc<Cell<u32>>,
    screen: Screen,
    menu_selection: MenuOption,
    focus: Focus,
    cursor: usize,
    answer: TextArea<'a>,
    notice: Option<(String, Style)>,
    command_mode: bool,
    command_buffer: String,
}

fn answer_box<'a>() -> TextArea<'a> {
    let mut answer = TextArea::default();
    answer.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Answer [Enter: Submit | Esc: Back] "),
    );
    answer.set_cursor_line_style(Style::default());
    answer
}

impl<'a> App<'a> {
    fn new(engine: Engine, score: Rc<Cell<u32>>) -> Self {
        let menu_selection = if engine.is_started() {
            MenuOption::Continue
        } else {
            MenuOption::NewGame
        };
        App {
            engine,
            score,
            screen: Screen::Title,
            menu_selection,
            focus: Focus::Puzzles,
            cursor: 0,
            answer: answer_box(),
            notice: None,
            command_mode: false,
            command_buffer: String::new(),
        }
    }

    fn notify(&mut self, message: impl Into<String>, color: Color) {
        self.notice = Some((message.into(), Style::default().fg(color)));
    }

    fn continue_game(&mut self) {
        self.engine.start_game();
        self.screen = Screen::Playing;
        self.focus = Focus::Puzzles;
        self.cursor = 0;
        self.notice = None;
    }

    fn new_game(&mut self) {
        self.engine.reset_game();
        self.continue_game();
    }

    fn reset(&mut self) {
        self.engine.reset_game();
        self.answer = answer_box();
        self.screen = Screen::Title;
        self.menu_selection = MenuOption::NewGame;
    }

    fn move_cursor(&mut self, down: bool) {
        let count = self.engine.current_room().puzzles.len();
        self.cursor = if down {
            (self.cursor + 1) % count
        } else {
            (self.cursor + count - 1) % count
        };
    }

    fn choose_puzzle(&mut self) {
        let Some(id) = self
            .engine
            .current_room()
            .puzzles
            .get(self.cursor)
            .map(|p| p.id.clone())
        else {
            return;
        };
        match self.engine.select_puzzle(&id) {
            Ok(()) => {
                self.notice = None;
                self.answer = answer_box();
                self.focus = Focus::Answer;
            }
            Err(err) => self.notify(err.to_string(), Color::Red),
        }
    }

    fn submit(&mut self) {
        let candidate = self.answer.lines().join("\n");
        match self.engine.submit_solution(&candidate) {
            Ok(SubmitOutcome::Solved { awarded, .. }) => {
                self.answer = answer_box();
                self.focus = Focus::Puzzles;
                self.notice = (awarded == 0).then(|| {
                    (
                        "Already solved, no points this time.".to_string(),
                        Style::default().fg(Color::DarkGray),
                    )
                });
            }
            Ok(SubmitOutcome::Incorrect { .. }) => self.notice = None,
            Err(err) => self.notify(err.to_string(), Color::Red),
        }
    }

    fn hint(&mut self) {
        if let Err(err) = self.engine.request_hint() {
            self.notify(format!("{} Pick a puzzle first.", err), Color::DarkGray);
        }
    }

    fn next_room(&mut self) {
        match self.engine.advance_room() {
            Ok(AdvanceOutcome::Advanced { .. }) => {
                self.cursor = 0;
                self.focus = Focus::Puzzles;
                self.answer = answer_box();
                self.notify(
                    format!("You enter {}.", self.engine.current_room().name()),
                    Color::Yellow,
                );
            }
            Ok(AdvanceOutcome::GameComplete) => self.notice = None,
            Err(err) => self.notify(err.to_string(), Color::Red),
        }
    }

    /// Runs a `:` command. Returns false when the player asked to quit.
    fn run_command(&mut self) -> bool {
        let command = std::mem::take(&mut self.command_buffer);
        self.command_mode = false;
        match command.as_str() {
            "q" | "quit" => return false,
            "hint" => self.hint(),
            "next" => self.next_room(),
            "reset" => self.reset(),
            "help" => self.notify(
                "Commands: :q (quit), :hint, :next (next room), :reset",
                Color::Cyan,
            ),
            "" => {}
            other => self.notify(format!("Unknown command: {}", other), Color::Red),
        }
        true
    }

    /// Handles one key on the room screen. Returns false to quit.
    fn handle_playing_key(&mut self, key: KeyEvent) -> bool {
        if self.command_mode {
            match key.code {
                KeyCode::Esc => {
                    self.command_mode = false;
                    self.command_buffer.clear();
                }
                KeyCode::Enter => return self.run_command(),
                KeyCode::Backspace => {
                    self.command_buffer.pop();
                    if self.command_buffer.is_empty() {
                        self.command_mode = false;
                    }
                }
                KeyCode::Char(c) => self.command_buffer.push(c),
                _ => {}
            }
            return true;
        }

        match (key.code, key.modifiers) {
            (KeyCode::F(1), _) => self.hint(),
            (KeyCode::F(2), _) => self.next_room(),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => self.reset(),
            _ if self.focus == Focus::Answer => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Esc => self.focus = Focus::Puzzles,
                _ => {
                    self.answer.input(key);
                }
            },
            (KeyCode::Char(':'), _) => {
                self.command_mode = true;
                self.command_buffer.clear();
            }
            (KeyCode::Up | KeyCode::Char('k'), _) => self.move_cursor(false),
            (KeyCode::Down | KeyCode::Char('j'), _) => self.move_cursor(true),
            (KeyCode::Enter, _) => self.choose_puzzle(),
            (KeyCode::Tab, _) if self.engine.active_puzzle().is_some() => {
                self.focus = Focus::Answer
            }
            (KeyCode::Esc, _) => self.notify("Type :q to quit", Color::DarkGray),
            _ => {}
        }
        true
    }
}

fn init_logging(config: &GameConfig) -> Result<()> {
    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_store(config: &GameConfig) -> Box<dyn SessionStore> {
    match FileStore::open(&config.save_dir, &config.session_key) {
        Ok(store) => {
            info!(path = %store.path().display(), "using file session store");
            Box::new(store)
        }
        Err(err) => {
            warn!(error = %err, "session file unavailable, progress will not be kept");
            Box::new(MemoryStore::new(config.session_key.clone()))
        }
    }
}

fn main() -> Result<()> {
    let config = GameConfig::load().context("loading configuration")?;
    init_logging(&config)?;

    let catalog = load_catalog(&config.catalog_dir)
        .with_context(|| format!("loading rooms from {}", config.catalog_dir.display()))?;
    info!(
        rooms = catalog.len(),
        puzzles = catalog.puzzle_count(),
        "catalog loaded"
    );

    let mut store = open_store(&config);
    let score = Rc::new(Cell::new(0));
    {
        let score = Rc::clone(&score);
        store.subscribe(Box::new(move |event| match event {
            StoreEvent::Saved(session) => score.set(session.score),
            StoreEvent::Cleared => score.set(0),
        }));
    }
    let engine = ProgressionEngine::resume(catalog, store, config.timing());
    score.set(engine.score());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine, score);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if app.engine.is_game_complete() {
        println!(
            "\nAll rooms cleared. Final score: {}\n",
            app.engine.score()
        );
    }

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.engine.expire_transients(Instant::now());
        terminal.draw(|f| draw_ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match app.screen {
            Screen::Title => match key.code {
                KeyCode::Up | KeyCode::Char('k') => app.menu_selection = app.menu_selection.prev(),
                KeyCode::Down | KeyCode::Char('j') => {
                    app.menu_selection = app.menu_selection.next()
                }
                KeyCode::Enter => match app.menu_selection {
                    MenuOption::Continue => app.continue_game(),
                    MenuOption::NewGame => app.new_game(),
                    MenuOption::Quit => return Ok(()),
                },
                KeyCode::Char('q') => return Ok(()),
                _ => {}
            },
            Screen::Playing => {
                if !app.handle_playing_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn draw_ui(f: &mut Frame, app: &App) {
    if matches!(app.screen, Screen::Title) {
        draw_title_screen(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_status(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    draw_puzzle_list(f, app, main_chunks[0]);
    draw_puzzle_detail(f, app, main_chunks[1]);
    draw_message(f, app, chunks[2]);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let room = app.engine.current_room();
    let (solved, total) = app.engine.progress();
    let theme_color = match room.meta.theme {
        Theme::Cryptography => Color::Magenta,
        Theme::Cybersecurity => Color::Blue,
    };
    let status = Line::from(vec![
        Span::styled(
            " CRYPTO ESCAPE ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", room.name()),
            Style::default().fg(Color::White).bg(theme_color),
        ),
        Span::raw("  "),
        Span::styled(
            format!(
                " Room {}/{} ",
                app.engine.current_room_index() + 1,
                app.engine.catalog().len()
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Solved: {}/{} ", solved, total),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Score: {} ", app.score.get()),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let status_block = Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(status_block, area);
}

fn draw_puzzle_list(f: &mut Frame, app: &App, area: Rect) {
    let room = app.engine.current_room();
    let mut lines = vec![
        Line::from(Span::styled(
            room.meta.description.as_str(),
            Style::default().fg(Color::Gray),
        )),
        Line::raw(""),
    ];

    for (i, view) in app.engine.puzzles().iter().enumerate() {
        let (marker, style) = match view.status() {
            PuzzleStatus::Solved => ("✓", Style::default().fg(Color::Green)),
            PuzzleStatus::Active => ("▶", Style::default().fg(Color::Yellow)),
            PuzzleStatus::Locked => ("·", Style::default().fg(Color::White)),
        };
        let style = if i == app.cursor && app.focus == Focus::Puzzles {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        lines.push(Line::from(Span::styled(
            format!(" {} {} ", marker, view.puzzle.name),
            style,
        )));
    }

    if app.engine.can_advance_room() {
        lines.push(Line::raw(""));
        let prompt = if app.engine.is_last_room() {
            "All rooms unlocked. F2 to finish."
        } else {
            "Room cleared! F2 for the next room."
        };
        lines.push(Line::from(Span::styled(
            prompt,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
    }

    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Puzzles "))
        .wrap(Wrap { trim: false });
    f.render_widget(list, area);
}

fn draw_puzzle_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(puzzle) = app.engine.active_puzzle() else {
        let idle = Paragraph::new("Select a puzzle with ↑/↓ and ENTER.")
            .block(Block::default().borders(Borders::ALL).title(" Puzzle "))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(idle, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("[{}]", puzzle.kind.label()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::raw(puzzle.description.as_str()),
        Line::raw(""),
        Line::from(Span::styled(
            puzzle.challenge.display(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(hint) = app.engine.current_hint() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("HINT {}/{}: {}", hint.index + 1, hint.total, hint.text),
            Style::default().fg(Color::Cyan),
        )));
    }

    let detail = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} [F1: Hint] ", puzzle.name)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(detail, chunks[0]);
    f.render_widget(&app.answer, chunks[1]);
}

fn draw_message(f: &mut Frame, app: &App, area: Rect) {
    let (content, style) = if app.command_mode {
        (
            format!(":{}", app.command_buffer),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        )
    } else if let Some(feedback) = app.engine.feedback() {
        let style = match feedback.kind {
            FeedbackKind::Solved | FeedbackKind::RoomCleared => {
                Style::default().fg(Color::Black).bg(Color::Green)
            }
            FeedbackKind::Incorrect => Style::default().fg(Color::Red),
            FeedbackKind::GameComplete => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };
        (feedback.message.clone(), style)
    } else if let Some((notice, style)) = &app.notice {
        (notice.clone(), *style)
    } else {
        (
            "↑/↓ select • ENTER open • F1 hint • F2 next room • Ctrl-R reset • :q quit".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let message = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Terminal "))
        .wrap(Wrap { trim: false })
        .style(style);
    f.render_widget(message, area);
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let title_art = r#"
    ╔═══════════════════════════════════════════════════╗
    ║                                                   ║
    ║        ░█▀▀░█▀▄░█░█░█▀█░▀█▀░█▀█                    ║
    ║        ░█░░░█▀▄░░█░░█▀▀░░█░░█░█                    ║
    ║        ░▀▀▀░▀░▀░░▀░░▀░░░░▀░░▀▀▀                    ║
    ║                                                   ║
    ║              ░█▀▀░█▀▀░█▀▀░█▀█░█▀█░█▀▀              ║
    ║              ░█▀▀░▀▀█░█░░░█▀█░█▀▀░█▀▀              ║
    ║              ░▀▀▀░▀▀▀░▀▀▀░▀░▀░▀░░░▀▀▀              ║
    ║                                                   ║
    ║        "Crack the ciphers. Unlock the rooms."     ║
    ║                                                   ║
    ╚═══════════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(16),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(f.area());

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let continue_label = if app.engine.is_started() {
        format!("  CONTINUE (score {})  ", app.score.get())
    } else {
        "  START  ".to_string()
    };
    let options = [
        (MenuOption::Continue, continue_label),
        (MenuOption::NewGame, "  NEW GAME  ".to_string()),
        (MenuOption::Quit, "  QUIT  ".to_string()),
    ];
    for ((option, label), area) in options.into_iter().zip(&chunks[1..4]) {
        let style = if app.menu_selection == option {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let item = Paragraph::new(label)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(item, *area);
    }

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}
