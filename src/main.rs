//! Terminal front end for tile-review.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use clap::Parser;
use web_time::Instant;

use tile_review::command::{self, Command, HELP};
use tile_review::config::LogLevel;
use tile_review::constants::{DEFAULT_IMAGE_DIR, DEFAULT_TABLE_FILE};
use tile_review::render::TerminalOutput;
use tile_review::state::{SessionState, list_images};
use tile_review::table::ReviewTable;
use tile_review::{Message, ReviewApp, ReviewConfig, ReviewError};

/// Wait used when no lookup is pending, so auto-export still gets checked.
const IDLE_POLL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "tile-review")]
#[command(about = "Review flagged image tiles and correct their artifact labels")]
struct Cli {
    /// Directory holding the prediction table and the image folder
    root: PathBuf,

    /// Prediction table (defaults to <root>/test_outputs.csv)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Image folder (defaults to <root>/test_full)
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Directory previews are written to (defaults to <root>/preview)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(short, long)]
    log_level: Option<LogLevel>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tile-review: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ReviewConfig, ReviewError> {
    match path {
        Some(path) => Ok(ReviewConfig::load_from_path(path)?),
        None => Ok(ReviewConfig::load_from_default_path().unwrap_or_default()),
    }
}

/// `<stem>_reviewed.csv` next to the input table.
fn default_export_path(table: &Path) -> PathBuf {
    let stem = table
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("table");
    table.with_file_name(format!("{}_reviewed.csv", stem))
}

fn run(cli: Cli) -> Result<(), ReviewError> {
    let config = load_config(cli.config.as_deref())?;
    let level = cli.log_level.unwrap_or(config.log_level);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Log level {}", level.name());

    if cli.write_config {
        let path = cli
            .config
            .or_else(ReviewConfig::default_path)
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no config directory")
            })?;
        config.save_to_path(&path)?;
        println!("Wrote configuration to {:?}", path);
        return Ok(());
    }

    let table_path = cli
        .table
        .unwrap_or_else(|| cli.root.join(DEFAULT_TABLE_FILE));
    let image_dir = cli.images.unwrap_or_else(|| cli.root.join(DEFAULT_IMAGE_DIR));
    let preview_dir = cli.output.unwrap_or_else(|| cli.root.join("preview"));
    let export_path = config
        .auto_export
        .path
        .clone()
        .unwrap_or_else(|| default_export_path(&table_path));

    let table = ReviewTable::load(&table_path, config.initial_label)?;
    let images = list_images(&image_dir, &config.image_extension)?;
    let session = SessionState::new(table, images);
    let missing = session.images_without_rows();
    if !missing.is_empty() {
        log::warn!(
            "{} listed images have no table rows, e.g. '{}'",
            missing.len(),
            missing[0]
        );
    }
    let output = TerminalOutput::new(preview_dir, std::io::stdout());
    let mut app = ReviewApp::new(session, config, image_dir, output);

    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    println!("{}", HELP);
    if let Err(e) = app.update(Message::Next, Instant::now()) {
        println!("{}", e);
    }

    loop {
        let now = Instant::now();
        app.tick(now);
        let timeout = app.time_until_next(now).unwrap_or(IDLE_POLL);

        let line = match rx.recv_timeout(timeout) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let command = match command::parse(&line) {
            Ok(command) => command,
            Err(command::CommandError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::App(message) => {
                if let Err(e) = app.update(message, Instant::now()) {
                    println!("{}", e);
                }
            }
            Command::ListImages => {
                for image in app.session().image_order() {
                    let count = app.session().table().error_ids(image).len();
                    println!("{:>4}  {}", count, image);
                }
            }
            Command::Show => {
                if let Err(e) = app.show() {
                    println!("{}", e);
                }
            }
            Command::Status => app.render_status(),
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| export_path.clone());
                match app.export(&path) {
                    Ok(changed) => println!("Exported {:?} ({} changed labels)", path, changed),
                    Err(e) => println!("Export failed: {}", e),
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    app.flush_auto_export(Instant::now());
    log::info!(
        "Session ended with {} changed labels",
        app.session().table().changed_count()
    );
    Ok(())
}
