use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use partizip::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    enrich::{GeminiConfig, GeminiEnricher},
    logging,
    runtime::{self, AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    seed,
    session::Session,
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

/// terminal flashcards for German verbs: auxiliary and Partizip II
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Terminal flashcards for German verbs. A language model fills in the auxiliary (hat/ist), the Partizip II and a translation for each verb once at startup; you then flip through the cards, mark what you knew, and review your mistakes."
)]
pub struct Cli {
    /// model used to enrich the verb list
    #[clap(short = 'm', long)]
    model: Option<String>,

    /// base URL of the generative language API
    #[clap(long)]
    api_base: Option<String>,

    /// name of the environment variable holding the API key
    #[clap(long)]
    api_key_env: Option<String>,

    /// pause before the next card is shown, in milliseconds
    #[clap(long)]
    reveal_delay_ms: Option<u64>,

    /// whitespace separated infinitives to study instead of the built-in list
    #[clap(long)]
    verbs: Option<String>,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// write debug output to the log file
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Overlay command line flags on the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if let Some(api_key_env) = &self.api_key_env {
            config.api_key_env = api_key_env.clone();
        }
        if let Some(delay) = self.reveal_delay_ms {
            config.reveal_delay_ms = delay;
        }
        config
    }

    fn infinitives(&self) -> Vec<String> {
        match &self.verbs {
            Some(list) => seed::parse_verb_list(list),
            None => seed::seed_infinitives(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir, cli.verbose).ok());

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved config");
    }

    let infinitives = cli.infinitives();
    tracing::info!(verbs = infinitives.len(), model = %config.model, "starting partizip");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    runtime::spawn_enrichment(
        GeminiEnricher::new(GeminiConfig::from_config(&config)),
        infinitives,
        events.sender(),
    );
    let runner = Runner::new(events, FixedTicker::default());

    let mut app = App::new(
        Session::new(),
        Duration::from_millis(config.reveal_delay_ms),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let event = runner.step();
        // plain ticks only matter while something is moving
        let redraw = !matches!(event, AppEvent::Tick) || app.is_animating();

        if app.on_event(event, Instant::now()) == Control::Quit {
            break;
        }
        if redraw {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use partizip::config::{DEFAULT_API_BASE, DEFAULT_MODEL};
    use partizip::runtime::TestEventSource;
    use partizip::session::Phase;
    use partizip::verb::{Auxiliary, VerbRecord};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["partizip"]);

        assert_eq!(cli.model, None);
        assert_eq!(cli.api_base, None);
        assert_eq!(cli.verbs, None);
        assert!(!cli.save_config);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_model() {
        let cli = Cli::parse_from(["partizip", "-m", "gemini-2.5-pro"]);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.5-pro"));

        let cli = Cli::parse_from(["partizip", "--model", "other"]);
        assert_eq!(cli.model.as_deref(), Some("other"));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "partizip",
            "--api-base",
            "http://localhost:1234",
            "--api-key-env",
            "MY_KEY",
            "--reveal-delay-ms",
            "0",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, "http://localhost:1234");
        assert_eq!(config.api_key_env, "MY_KEY");
        assert_eq!(config.reveal_delay_ms, 0);
    }

    #[test]
    fn test_cli_without_flags_keeps_config() {
        let stored = Config {
            model: "stored-model".into(),
            ..Config::default()
        };
        let config = Cli::parse_from(["partizip"]).apply(stored.clone());
        assert_eq!(config, stored);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_cli_verbs_replace_seed_list() {
        let cli = Cli::parse_from(["partizip", "--verbs", "gehen beiginnen"]);
        assert_eq!(cli.infinitives(), vec!["gehen", "beginnen"]);

        let cli = Cli::parse_from(["partizip"]);
        assert_eq!(cli.infinitives(), seed::seed_infinitives());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["partizip", "-v", "--save-config"]);
        assert!(cli.verbose);
        assert!(cli.save_config);
    }

    #[test]
    fn test_start_tui_quits_on_escape() {
        let (tx, rx) = mpsc::channel();
        tx.send(key(KeyCode::Esc)).unwrap();

        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = App::new(Session::with_seed(1), Duration::ZERO);

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(app.session.phase(), Phase::Loading);
    }

    #[test]
    fn test_start_tui_runs_a_session() {
        let (tx, rx) = mpsc::channel();
        let verbs = vec![VerbRecord::new("gehen", Auxiliary::Ist, "gegangen", "to go")];
        tx.send(AppEvent::Enriched(Ok(verbs))).unwrap();
        for code in [
            KeyCode::Char('o'),
            KeyCode::Char(' '),
            KeyCode::Char('n'),
            KeyCode::Esc,
        ] {
            tx.send(key(code)).unwrap();
        }

        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = App::new(Session::with_seed(1), Duration::ZERO);

        start_tui(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.session.phase(), Phase::Summary);
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Session Complete!"));
    }
}
