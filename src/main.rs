pub mod config;
pub mod game;
pub mod report;
pub mod runtime;
pub mod scenario;
pub mod scoring;
pub mod ui;

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::game::{Game, Phase, TICK_RATE_MS};
use crate::report::CsvSink;
use crate::runtime::{CrosstermEventSource, GameEvent, Runner};
use crate::scenario::Catalog;
use crate::scoring::Choice;
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
    sync::Arc,
    time::Duration,
};

/// timed terminal drill for spotting unsafe credential habits
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed quiz in the terminal: classify emails, texts, and login prompts as safe or unsafe practice. Fast, correct answers build a streak; the final score lands in a local CSV log."
)]
pub struct Cli {
    /// seconds on the whole-game clock
    #[clap(short = 's', long)]
    session_secs: Option<f64>,

    /// seconds allowed per scenario
    #[clap(short = 'q', long)]
    question_secs: Option<f64>,

    /// seconds the answer explanation stays on screen
    #[clap(short = 'f', long)]
    feedback_secs: Option<f64>,

    /// pre-fill the player name on the intro screen
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// skip score submission at game over
    #[clap(long)]
    no_report: bool,

    /// where submitted scores are appended (defaults to the platform data dir)
    #[clap(long)]
    scores_file: Option<PathBuf>,
}

impl Cli {
    /// Layer CLI overrides on top of the persisted config.
    fn merged(&self, mut cfg: Config) -> Config {
        if let Some(secs) = self.session_secs {
            cfg.session_secs = secs;
        }
        if let Some(secs) = self.question_secs {
            cfg.question_secs = secs;
        }
        if let Some(secs) = self.feedback_secs {
            cfg.feedback_secs = secs;
        }
        if self.no_report {
            cfg.report = false;
        }
        cfg
    }
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub game: Game,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let file_cfg = FileConfigStore::new().load();
        Self::from_settings(cli, file_cfg)
    }

    pub fn from_settings(cli: Cli, file_cfg: Config) -> Self {
        let settings = cli.merged(file_cfg);

        let mut game = Game::new(Catalog::builtin(), settings.game_config());
        if settings.report {
            let sink = match &cli.scores_file {
                Some(path) => CsvSink::with_path(path),
                None => CsvSink::new(),
            };
            game = game.with_reporter(Arc::new(sink));
        }
        if let Some(name) = &cli.name {
            game.name_entry = name.clone();
        }

        Self {
            cli: Some(cli),
            game,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    let result = run_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                let running = matches!(app.game.phase, Phase::Active | Phase::Feedback);
                app.game.on_tick();
                if running {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

/// Apply one key event to the game. Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return true;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.game.phase {
        Phase::Intro => match key.code {
            KeyCode::Enter => app.game.submit_entered_name(),
            KeyCode::Backspace => app.game.pop_name_char(),
            KeyCode::Char(c) => app.game.push_name_char(c),
            _ => {}
        },
        Phase::Active => match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => app.game.submit_choice(Choice::Safe),
            KeyCode::Char('u') | KeyCode::Char('U') => app.game.submit_choice(Choice::Unsafe),
            _ => {}
        },
        // The explanation stays up for the full delay; keys are ignored.
        Phase::Feedback => {}
        Phase::GameOver => {
            if key.code == KeyCode::Char('r') {
                app.game.request_replay();
            }
        }
    }

    false
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
