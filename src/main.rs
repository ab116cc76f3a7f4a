use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use geotime::config::Config;
use geotime::location::{
    Backend, Command, DirectBackend, IpLocator, LocationSession, ProxyBackend, Resolution, SessionState,
};
use geotime::presenter::{Labels, TextPresenter};

/// geotime: local time, time-zone name and sunrise/sunset for any place.
///
/// Examples:
///   geotime Paris
///   geotime "New York" --date 2024-12-25
///   geotime --lat 35.6762 --lng 139.6503 --json
///   geotime --auto --lang fr
///   geotime --interactive
///   geotime --languages
///   geotime --serve --port 8000
#[derive(Parser)]
#[command(name = "geotime", version, about, long_about = None)]
struct Cli {
    /// Place name to search for.
    #[arg(index = 1)]
    place: Option<String>,

    /// Latitude (-90 to 90). Use with --lng instead of a place name.
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lng: Option<f64>,

    /// Locate this machine via IP geolocation.
    #[arg(long, short = 'a')]
    auto: bool,

    /// Sunrise/sunset date (YYYY-MM-DD). Repeat to list several dates.
    #[arg(long, short = 'd', value_parser = parse_date)]
    date: Vec<NaiveDate>,

    /// UI language code for labels (e.g. fr).
    #[arg(long)]
    lang: Option<String>,

    /// Base URL of the /api proxy.
    #[arg(long)]
    api: Option<String>,

    /// Skip the proxy and call the upstream services directly.
    #[arg(long)]
    direct: bool,

    /// Print the resolution as JSON instead of labelled lines.
    #[arg(long)]
    json: bool,

    /// Read commands from stdin: search, point, date, locate, reset.
    #[arg(long, short = 'i')]
    interactive: bool,

    /// List the languages the proxy offers and exit.
    #[arg(long)]
    languages: bool,

    /// Run the /api proxy server.
    #[arg(long)]
    serve: bool,

    /// Server bind address.
    #[arg(long)]
    host: Option<String>,

    /// Server port.
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Config file (default: ~/.geotime/config.json).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.serve { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(geotime::server::start(&config)) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.languages {
        list_languages(&config);
        return;
    }

    let backend: Box<dyn Backend> = if cli.direct {
        Box::new(DirectBackend::new(config.upstream.clone(), config.timeout()))
    } else {
        Box::new(ProxyBackend::new(config.api_base.clone(), config.timeout()))
    };
    let locator = IpLocator::new(config.upstream.ip_locate_url.clone(), config.timeout());
    let mut session = LocationSession::new(backend).with_locator(Box::new(locator));

    let labels = load_labels(&config);
    let mut presenter = TextPresenter::new(io::stdout(), labels);

    if cli.interactive {
        run_interactive(&mut session, &mut presenter);
        return;
    }

    let command = match initial_command(&cli) {
        Some(command) => command,
        None => {
            eprintln!("Error: No location specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  geotime Paris");
            eprintln!("  geotime --lat 48.8566 --lng 2.3522");
            eprintln!("  geotime --auto");
            eprintln!("  geotime --interactive");
            std::process::exit(1);
        }
    };

    if cli.json {
        run_json(&mut session, command, &cli.date);
        return;
    }

    session.dispatch(command, &mut presenter);
    flush(&mut presenter);
    for date in &cli.date {
        if session.state() != SessionState::Ready {
            break;
        }
        session.dispatch(Command::ChangeDate(*date), &mut presenter);
        flush(&mut presenter);
    }

    if !matches!(session.state(), SessionState::Ready) {
        std::process::exit(1);
    }
}

/// File, then environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<Config, geotime::config::ConfigError> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(api) = &cli.api {
        config.api_base = api.clone();
    }
    if let Some(lang) = &cli.lang {
        config.language = Some(lang.clone());
    }
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

/// English labels, overlaid with the proxy's translations when a language
/// is configured. A failed fetch keeps English.
fn load_labels(config: &Config) -> Labels {
    let labels = Labels::english();
    let lang = match config.language.as_deref() {
        Some(lang) if lang != "en" => lang,
        _ => return labels,
    };
    match ProxyBackend::new(config.api_base.clone(), config.timeout()).translations(lang) {
        Ok(map) => labels.with_translations(map),
        Err(e) => {
            tracing::warn!(lang, error = %e, "translations unavailable, using English");
            labels
        }
    }
}

fn list_languages(config: &Config) {
    match ProxyBackend::new(config.api_base.clone(), config.timeout()).supported_languages() {
        Ok(langs) => {
            for lang in langs {
                println!("{:<8} {}", lang.code, lang.name);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn initial_command(cli: &Cli) -> Option<Command> {
    // Priority: positional place > --lat/--lng > --auto
    if let Some(place) = &cli.place {
        return Some(Command::Search(place.clone()));
    }
    if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
        return Some(Command::SelectPoint { lat, lng });
    }
    if cli.auto {
        return Some(Command::Locate);
    }
    None
}

fn run_json<B: Backend>(session: &mut LocationSession<B>, command: Command, dates: &[NaiveDate]) {
    let outcome = match command {
        Command::Search(query) => session.search(&query),
        Command::SelectPoint { lat, lng } => session.select_point(lat, lng),
        _ => session.locate(),
    };
    let mut resolution: Resolution = match outcome {
        Ok(resolution) => resolution,
        Err(reason) => {
            let body = serde_json::json!({ "error": reason.key(), "message": reason.to_string() });
            println!("{}", body);
            std::process::exit(1);
        }
    };

    // Later dates replace the daylight block; the last one wins.
    for date in dates {
        resolution.daylight = session.change_date(*date).ok();
    }
    match serde_json::to_string_pretty(&resolution) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_interactive<B: Backend, W: Write>(session: &mut LocationSession<B>, presenter: &mut TextPresenter<W>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "quit" | "exit") {
            break;
        }
        match trimmed.parse::<Command>() {
            Ok(command) => {
                session.dispatch(command, presenter);
                flush(presenter);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

fn flush<W: Write>(presenter: &mut TextPresenter<W>) {
    if let Err(e) = presenter.flush() {
        tracing::warn!(error = %e, "write failed");
    }
}
