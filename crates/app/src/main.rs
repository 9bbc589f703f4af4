mod config;
mod logging;

use std::fmt;
use std::path::PathBuf;

use config::ServerConfig;
use server::{AppState, router};
use services::AppServices;
use storage::sqlite::SqliteRepository;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    db_url: Option<String>,
    port: Option<u16>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  sketchquiz [serve]  [--config <path>] [--db <sqlite_url>] [--port <port>]");
    eprintln!("  sketchquiz migrate  [--config <path>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://sketchquiz.sqlite3");
    eprintln!("  --port 8080");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SKETCHQUIZ_CONFIG, SKETCHQUIZ_DB_URL, PORT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Migrate,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "migrate" => Some(Self::Migrate),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            config: std::env::var_os("SKETCHQUIZ_CONFIG").map(PathBuf::from),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    parsed.config = Some(PathBuf::from(require_value(args, "--config")?));
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(value);
                }
                "--port" => {
                    let value = require_value(args, "--port")?;
                    let port = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                    parsed.port = Some(port);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// Command-line flags take precedence over the file and the environment.
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(url) = &self.db_url {
            config.database.url.clone_from(url);
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }
    }
}

fn is_memory_url(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains("mode=memory")
}

fn normalize_sqlite_url(raw: String) -> String {
    if is_memory_url(&raw) || raw.starts_with("sqlite://") {
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
    if is_memory_url(db_url) {
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means serve.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let args = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = ServerConfig::load(args.config.as_deref()).await?;
    config.apply_env(|key| std::env::var(key).ok())?;
    args.apply(&mut config);
    config.database.url = normalize_sqlite_url(config.database.url);
    config.validate()?;
    logging::init_tracing(&config.logging)?;

    if let Some(path) = &args.config {
        tracing::info!(path = %path.display(), "loaded config file");
    }
    tracing::info!(db = %config.database.url, "using database");

    prepare_sqlite_file(&config.database.url)?;

    match cmd {
        Command::Migrate => {
            let repo =
                SqliteRepository::connect(&config.database.url, config.pool_settings()).await?;
            repo.migrate().await?;
            repo.close().await;
            tracing::info!("database migrated");
            Ok(())
        }
        Command::Serve => {
            let services = AppServices::new_sqlite(&config.services()).await?;
            let options = config.router_options();
            if !options.index_path().exists() {
                tracing::warn!(
                    index = %options.index_path().display(),
                    "index document not found; unknown routes will return 404"
                );
            }

            let app = router(AppState::from_services(&services), &options);
            let addr = config.bind_addr()?;
            server::serve(addr, app).await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_overrides() {
        let args = parse(&["--db", "sqlite://x.db", "--port", "9001"]).unwrap();
        assert_eq!(args.db_url.as_deref(), Some("sqlite://x.db"));
        assert_eq!(args.port, Some(9001));

        let mut config = ServerConfig::default();
        args.apply(&mut config);
        assert_eq!(config.database.url, "sqlite://x.db");
        assert_eq!(config.http.port, 9001);
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(parse(&["--port"]), Err(ArgsError::MissingValue { .. })));
        assert!(matches!(parse(&["--port", "http"]), Err(ArgsError::InvalidPort { .. })));
        assert!(matches!(parse(&["--stage", "1"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(parse(&["--db", " "]), Err(ArgsError::InvalidDbUrl { .. })));
    }

    #[test]
    fn memory_urls_are_left_alone() {
        let url = "sqlite:file:memdb?mode=memory&cache=shared".to_string();
        assert_eq!(normalize_sqlite_url(url.clone()), url);
        prepare_sqlite_file(&url).unwrap();
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/quiz.db".into());
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("data/quiz.db"));
    }
}
