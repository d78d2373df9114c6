use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::QuizStep;
use services::{
    AlertModel, CatalogConfig, Clock, MoviesLoader, NetworkClient, QuizPhase, QuizPresenter,
    QuizView, SelectionPolicy, StatisticService,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_DB_URL: &str = "sqlite://moviequiz.sqlite3";
const ANSWER_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    MissingApiKey,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingApiKey => {
                write!(f, "no catalog API key; pass --api-key or set MOVIEQUIZ_API_KEY")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  moviequiz [--db <sqlite_url>] [--api-key <key>] [--catalog-url <url>] [--no-repeats]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MOVIEQUIZ_API_KEY, MOVIEQUIZ_CATALOG_URL, MOVIEQUIZ_DB_URL, MOVIEQUIZ_LOG");
    eprintln!();
    eprintln!("Commands while playing:");
    eprintln!("  y/yes, n/no   answer the current question");
    eprintln!("  r             confirm the current alert");
    eprintln!("  s             show statistics");
    eprintln!("  q             quit");
}

#[derive(Debug)]
struct Args {
    db_url: String,
    catalog: CatalogConfig,
    selection: SelectionPolicy,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = args.into_iter();
        let mut db_url = std::env::var("MOVIEQUIZ_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let env_catalog = CatalogConfig::from_env();
        let mut api_key = env_catalog.as_ref().map(|config| config.api_key.clone());
        let mut catalog_url = env_catalog.map(|config| config.base_url);
        let mut selection = SelectionPolicy::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api-key" => api_key = Some(require_value(&mut args, "--api-key")?),
                "--catalog-url" => catalog_url = Some(require_value(&mut args, "--catalog-url")?),
                "--no-repeats" => selection = SelectionPolicy::WithoutReplacement,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ArgsError::MissingApiKey)?;
        let mut catalog = CatalogConfig::new(api_key);
        if let Some(url) = catalog_url {
            catalog = catalog.with_base_url(url);
        }

        Ok(Some(Self {
            db_url,
            catalog,
            selection,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MOVIEQUIZ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to initialize tracing subscriber: {err}"))?;

    Ok(())
}

//
// ─── TERMINAL VIEW ─────────────────────────────────────────────────────────────
//

struct TerminalView;

impl TerminalView {
    fn print_alert(alert: &AlertModel) {
        println!();
        println!("== {} ==", alert.title);
        println!("{}", alert.message);
        println!("[r] {}   [q] Quit", alert.button_text);
    }
}

impl QuizView for TerminalView {
    fn show_question(&self, step: &QuizStep) {
        println!();
        if step.image.is_empty() {
            println!("(poster unavailable)");
        } else {
            println!("(poster: {} bytes)", step.image.len());
        }
        println!("[{}] {}", step.question_number, step.question);
    }

    fn show_answer_outcome(&self, is_correct: bool) {
        println!("{}", if is_correct { "Correct!" } else { "Wrong!" });
    }

    fn show_final_summary(&self, alert: &AlertModel) {
        Self::print_alert(alert);
    }

    fn show_loading_indicator(&self) {
        println!("Loading...");
    }

    fn hide_loading_indicator(&self) {}

    fn set_input_enabled(&self, enabled: bool) {
        if enabled {
            println!("Answer with y or n:");
        }
    }

    fn show_recoverable_error(&self, alert: &AlertModel) {
        Self::print_alert(alert);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Yes,
    No,
    Confirm,
    Stats,
    Quit,
}

impl Command {
    fn from_input(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "r" => Some(Self::Confirm),
            "s" => Some(Self::Stats),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn print_statistics(statistics: &StatisticService) {
    println!("Quizzes played: {}", statistics.games_count());
    if let Some(best) = statistics.best_game() {
        println!(
            "Record: {}/{} ({})",
            best.correct(),
            best.total(),
            best.achieved_at().format("%d.%m.%y %H:%M")
        );
    }
    println!("Average accuracy: {:.2}%", statistics.total_accuracy());
}

/// Apply one line of player input. Returns `false` when the player quits.
async fn handle_input(presenter: &mut QuizPresenter, line: &str) -> bool {
    let Some(command) = Command::from_input(line) else {
        if !line.trim().is_empty() {
            println!("Commands: y, n, r, s, q");
        }
        return true;
    };

    match command {
        Command::Yes | Command::No => {
            let answered = if command == Command::Yes {
                presenter.yes_button_clicked()
            } else {
                presenter.no_button_clicked()
            };
            if answered.is_some() {
                tokio::time::sleep(ANSWER_PAUSE).await;
                presenter.show_next_question_or_results().await;
            }
        }
        Command::Confirm => match presenter.pending_action() {
            Some(action) => presenter.perform(action),
            None => println!("Nothing to confirm right now."),
        },
        Command::Stats => print_statistics(presenter.statistics()),
        Command::Quit => return false,
    }
    true
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing()?;
    tracing::debug!(db = %args.db_url, selection = ?args.selection, "starting quiz");

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let statistics = StatisticService::load(Clock::default_clock(), storage.statistics).await?;

    let network = Arc::new(NetworkClient::new());
    let loader = MoviesLoader::new(network.clone(), args.catalog);
    let mut presenter = QuizPresenter::new(
        Arc::new(TerminalView),
        Arc::new(loader),
        network,
        statistics,
    )
    .with_selection(args.selection);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    presenter.start();

    loop {
        tokio::select! {
            event = presenter.next_event() => match event {
                Some(event) => presenter.handle_event(event),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(&mut presenter, &line).await {
                    break;
                }
            }
        }
    }

    if matches!(presenter.phase(), QuizPhase::Evaluating { .. }) {
        presenter.show_next_question_or_results().await;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
