pub mod ui;

use crate::ui::text_input::TextInput;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use webbrowser::Browser;
use zenfocus::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::Controller,
    daily_reset::SystemClock,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, ZenEvent},
    store::{FileRecordStore, RecordStore},
    timer::TimerMode,
    ZenError,
};

const TICK_RATE_MS: u64 = 200;

/// calm terminal focus timer with a task checklist, quick notes, and bookmarks
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A calm terminal focus timer. Counts focus sessions per day, keeps a task checklist, a scratch pad for notes, and a list of bookmarks, all saved to a single local file."
)]
pub struct Cli {
    /// data file to read and write (defaults to the platform data directory)
    #[clap(short = 'd', long)]
    data_file: Option<PathBuf>,

    /// focus session length in minutes
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=600))]
    focus: Option<u32>,

    /// short break length in minutes
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=600))]
    short_break: Option<u32>,

    /// long break length in minutes
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=600))]
    long_break: Option<u32>,

    /// log level for the log file (trace, debug, info, warn, error, off)
    #[clap(long, value_parser = parse_log_level)]
    log_level: Option<String>,
}

fn parse_log_level(s: &str) -> Result<String, String> {
    logging::normalize_level(s)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

impl Cli {
    /// Layer command line overrides on top of the stored configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(path) = &self.data_file {
            config.data_file = Some(path.clone());
        }
        if let Some(m) = self.focus {
            config.focus_minutes = m;
        }
        if let Some(m) = self.short_break {
            config.short_break_minutes = m;
        }
        if let Some(m) = self.long_break {
            config.long_break_minutes = m;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum View {
    Timer,
    Tasks,
    Notes,
    Links,
}

impl View {
    pub const ALL: [View; 4] = [View::Timer, View::Tasks, View::Notes, View::Links];

    fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn prev(&self) -> View {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }

    pub fn icon(&self) -> &'static str {
        match self {
            View::Timer => "⏱",
            View::Tasks => "✅",
            View::Notes => "📝",
            View::Links => "🔗",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditingTask,
    EditingNotes,
    EditingLinkName,
    EditingLinkUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
}

/// Modal message; the next key press dismisses it
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Continue,
    Quit,
    Open(String),
}

pub struct App<S: RecordStore> {
    pub controller: Controller<S>,
    pub view: View,
    pub input_mode: InputMode,
    pub task_input: TextInput,
    pub link_name_input: TextInput,
    pub link_url_input: TextInput,
    pub notes_input: TextInput,
    pub selected_task: usize,
    pub selected_link: usize,
    pub notice: Option<Notice>,
}

impl<S: RecordStore> App<S> {
    pub fn new(controller: Controller<S>) -> Self {
        let notes_input = TextInput::new(controller.session().notes());
        Self {
            controller,
            view: View::Timer,
            input_mode: InputMode::Normal,
            task_input: TextInput::default(),
            link_name_input: TextInput::default(),
            link_url_input: TextInput::default(),
            notes_input,
            selected_task: 0,
            selected_link: 0,
            notice: None,
        }
    }

    /// Leaving the notes view captures and saves the notes text
    pub fn switch_view(&mut self, view: View) {
        if self.view == View::Notes {
            self.controller.commit_notes(self.notes_input.value());
        }
        if view == View::Notes {
            self.notes_input = TextInput::new(self.controller.session().notes());
        }
        self.input_mode = InputMode::Normal;
        self.view = view;
    }

    /// Saves everything, including notes still being edited
    pub fn persist(&mut self) {
        if self.view == View::Notes {
            self.controller.commit_notes(self.notes_input.value());
        } else {
            self.controller.save();
        }
    }

    /// Advances the countdown; returns true when the screen needs a redraw
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if let Some(event) = self.controller.advance(now) {
            self.notice = Some(Notice::info(event.message()));
            return true;
        }
        self.controller.timer().is_running()
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return KeyOutcome::Quit,
                KeyCode::Char('s') => {
                    self.persist();
                    return KeyOutcome::Continue;
                }
                _ => {}
            }
        }

        if self.notice.take().is_some() {
            return KeyOutcome::Continue;
        }

        if let KeyCode::F(n @ 1..=4) = key.code {
            self.switch_view(View::ALL[(n - 1) as usize]);
            return KeyOutcome::Continue;
        }

        match self.input_mode {
            InputMode::Normal => return self.handle_normal_key(key, now),
            InputMode::EditingTask => self.handle_task_input(key),
            InputMode::EditingNotes => self.handle_notes_input(key),
            InputMode::EditingLinkName | InputMode::EditingLinkUrl => self.handle_link_input(key),
        }
        KeyOutcome::Continue
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.prev()),
            KeyCode::Char(c @ '1'..='4') => {
                self.switch_view(View::ALL[c as usize - '1' as usize]);
            }
            _ => match self.view {
                View::Timer => self.handle_timer_key(key, now),
                View::Tasks => self.handle_tasks_key(key),
                View::Notes => {
                    if matches!(key.code, KeyCode::Char('i') | KeyCode::Enter) {
                        self.input_mode = InputMode::EditingNotes;
                    }
                }
                View::Links => return self.handle_links_key(key),
            },
        }
        KeyOutcome::Continue
    }

    fn handle_timer_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(' ') => self.controller.toggle_timer(now),
            KeyCode::Char('r') => self.controller.reset_timer(),
            KeyCode::Char('f') => self.controller.set_mode(TimerMode::Focus),
            KeyCode::Char('s') => self.controller.set_mode(TimerMode::ShortBreak),
            KeyCode::Char('l') => self.controller.set_mode(TimerMode::LongBreak),
            _ => {}
        }
    }

    fn handle_tasks_key(&mut self, key: KeyEvent) {
        let len = self.controller.tasks().len();
        match key.code {
            KeyCode::Char('a') | KeyCode::Char('i') => self.input_mode = InputMode::EditingTask,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_task + 1 < len {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Err(e) = self.controller.toggle_task(self.selected_task) {
                    log::debug!("toggle ignored: {e}");
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                match self.controller.remove_task(self.selected_task) {
                    Ok(task) => log::debug!("removed task {:?}", task.text),
                    Err(e) => log::debug!("remove ignored: {e}"),
                }
                self.selected_task = clamp_selection(self.selected_task, self.controller.tasks().len());
            }
            _ => {}
        }
    }

    fn handle_links_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let len = self.controller.links().len();
        match key.code {
            KeyCode::Char('a') | KeyCode::Char('i') => self.input_mode = InputMode::EditingLinkName,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_link = self.selected_link.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_link + 1 < len {
                    self.selected_link += 1;
                }
            }
            KeyCode::Char('o') | KeyCode::Enter => {
                if let Some(link) = self.controller.links().get(self.selected_link) {
                    return KeyOutcome::Open(link.url.clone());
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                match self.controller.remove_link(self.selected_link) {
                    Ok(link) => log::debug!("removed link {:?}", link.name),
                    Err(e) => log::debug!("remove ignored: {e}"),
                }
                self.selected_link = clamp_selection(self.selected_link, self.controller.links().len());
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_task_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                if self.controller.add_task(self.task_input.value()) {
                    self.task_input.clear();
                    self.selected_task = self.controller.tasks().len() - 1;
                }
            }
            _ => {
                self.task_input.handle_key(key);
            }
        }
    }

    fn handle_notes_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => self.notes_input.insert_char('\n'),
            _ => {
                self.notes_input.handle_key(key);
            }
        }
    }

    fn handle_link_input(&mut self, key: KeyEvent) {
        match (self.input_mode, key.code) {
            (_, KeyCode::Esc) => self.input_mode = InputMode::Normal,
            (InputMode::EditingLinkName, KeyCode::Tab | KeyCode::Enter) => {
                self.input_mode = InputMode::EditingLinkUrl;
            }
            (InputMode::EditingLinkUrl, KeyCode::Tab | KeyCode::BackTab) => {
                self.input_mode = InputMode::EditingLinkName;
            }
            (InputMode::EditingLinkUrl, KeyCode::Enter) => self.submit_link(),
            (InputMode::EditingLinkName, _) => {
                self.link_name_input.handle_key(key);
            }
            _ => {
                self.link_url_input.handle_key(key);
            }
        }
    }

    fn submit_link(&mut self) {
        let result = self
            .controller
            .add_link(self.link_name_input.value(), self.link_url_input.value());
        match result {
            Ok(link) => {
                log::debug!("added link {:?} -> {}", link.name, link.url);
                self.link_name_input.clear();
                self.link_url_input.clear();
                self.selected_link = self.controller.links().len() - 1;
                self.input_mode = InputMode::Normal;
            }
            Err(ZenError::Validation(msg)) => self.notice = Some(Notice::warning(msg)),
            Err(e) => self.notice = Some(Notice::warning(e.to_string())),
        }
    }
}

fn clamp_selection(selected: usize, len: usize) -> usize {
    selected.min(len.saturating_sub(1))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.apply_to(FileConfigStore::new().load());
    let _logger = AppDirs::log_dir().and_then(|dir| {
        logging::init_logging(&config.log_level, &dir)
            .map_err(|e| eprintln!("zenfocus: file logging disabled: {e}"))
            .ok()
    });

    let store = FileRecordStore::with_path(config.data_file());
    let controller = Controller::open(store, &SystemClock, config);
    let mut app = App::new(controller);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);
    app.persist();
    log::info!("shutting down");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: RecordStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step_until(app.controller.next_tick_due(), Instant::now()) {
            ZenEvent::Tick => {
                if !app.on_tick(Instant::now()) {
                    continue;
                }
            }
            ZenEvent::Resize => {}
            ZenEvent::Key(key) => match app.on_key(key, Instant::now()) {
                KeyOutcome::Continue => {}
                KeyOutcome::Quit => break,
                KeyOutcome::Open(url) => open_in_browser(app, &url),
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn open_in_browser<S: RecordStore>(app: &mut App<S>, url: &str) {
    if !Browser::is_available() {
        app.notice = Some(Notice::warning("No web browser available"));
        return;
    }
    if let Err(e) = webbrowser::open(url) {
        log::warn!("could not open {url}: {e}");
        app.notice = Some(Notice::warning(format!("Could not open {url}")));
    }
}

fn ui<S: RecordStore>(app: &App<S>, f: &mut Frame) {
    f.render_widget(app, f.area());
}
