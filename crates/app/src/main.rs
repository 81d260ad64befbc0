use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use karo_core::EngineConfig;
use karo_core::model::{LessonCatalog, LessonId};
use services::AppServices;

mod console;

use console::{Console, ConsolePresenter};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLessonId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidToggle { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid --lesson value: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidToggle { flag, raw } => {
                write!(f, "invalid {flag} value (expected on|off): {raw}")
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

fn parse_toggle(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<bool, ArgsError> {
    let value = require_value(args, flag)?;
    match value.as_str() {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        _ => Err(ArgsError::InvalidToggle { flag, raw: value }),
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz     [--lesson <id>] [common]");
    eprintln!("  cargo run -p app -- lessons  [common]");
    eprintln!(
        "  cargo run -p app -- settings [--toggle-theme] [--gyroscope on|off] \
         [--animations on|off] [--particles on|off] [common]"
    );
    eprintln!();
    eprintln!("Common:");
    eprintln!("  --db <sqlite_url>      default sqlite://karo.sqlite3");
    eprintln!("  --catalog <path.json>  lessons to use instead of the built-in ones");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KARO_DB_URL, KARO_CATALOG, KARO_LESSON, KARO_DELAY_MS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Lessons,
    Settings,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "lessons" => Some(Self::Lessons),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SettingsChanges {
    toggle_theme: bool,
    gyroscope: Option<bool>,
    animations: Option<bool>,
    particles: Option<bool>,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    catalog_path: Option<String>,
    lesson: Option<LessonId>,
    delay: Option<Duration>,
    settings: SettingsChanges,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("KARO_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://karo.sqlite3".into(), normalize_sqlite_url);
        let mut catalog_path = std::env::var("KARO_CATALOG")
            .ok()
            .filter(|path| !path.trim().is_empty());
        let mut lesson = std::env::var("KARO_LESSON")
            .ok()
            .and_then(|value| LessonId::new(value).ok());
        let delay = std::env::var("KARO_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis);
        let mut settings = SettingsChanges::default();

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                (_, "--catalog") => {
                    catalog_path = Some(require_value(args, "--catalog")?);
                }
                (Command::Quiz, "--lesson") => {
                    let value = require_value(args, "--lesson")?;
                    lesson = Some(
                        LessonId::new(value.clone())
                            .map_err(|_| ArgsError::InvalidLessonId { raw: value })?,
                    );
                }
                (Command::Settings, "--toggle-theme") => settings.toggle_theme = true,
                (Command::Settings, "--gyroscope") => {
                    settings.gyroscope = Some(parse_toggle(args, "--gyroscope")?);
                }
                (Command::Settings, "--animations") => {
                    settings.animations = Some(parse_toggle(args, "--animations")?);
                }
                (Command::Settings, "--particles") => {
                    settings.particles = Some(parse_toggle(args, "--particles")?);
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            catalog_path,
            lesson,
            delay,
            settings,
        })
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

fn load_catalog(path: Option<&str>) -> Result<LessonCatalog, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LessonCatalog::builtin()?);
    };
    let raw = std::fs::read_to_string(path)?;
    let catalog = LessonCatalog::from_json(&raw)?;
    log::info!("loaded {} lessons from {path}", catalog.len());
    Ok(catalog)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: run the quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = load_catalog(parsed.catalog_path.as_deref())?;

    let mut config = EngineConfig::default();
    if let Some(delay) = parsed.delay {
        config = config.with_presentation_delay(delay);
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let presenter = Arc::new(ConsolePresenter::new());
    let services =
        AppServices::new_sqlite(&parsed.db_url, config, catalog, presenter.clone()).await?;
    log::debug!("storage ready at {}", parsed.db_url);

    match cmd {
        Command::Quiz => {
            let mut console = Console::stdin();
            let streak =
                console::run_quiz(&services, &presenter, &mut console, parsed.lesson).await?;
            log::debug!("quiz finished with streak {streak}");
            Ok(())
        }
        Command::Lessons => {
            let items = services.progress().lesson_list().await?;
            console::render_lesson_list(&items);
            Ok(())
        }
        Command::Settings => {
            let settings_service = services.settings();
            let changes = parsed.settings;
            if changes.toggle_theme {
                settings_service.toggle_theme().await?;
            }
            if let Some(enabled) = changes.gyroscope {
                settings_service.set_gyroscope(enabled).await?;
            }
            if let Some(enabled) = changes.animations {
                settings_service.set_animations(enabled).await?;
            }
            if let Some(enabled) = changes.particles {
                settings_service.set_particles(enabled).await?;
            }
            console::render_settings(&settings_service.load().await?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
