use clap::Parser;
use sqledit::config::{self, Config};
use sqledit::repl::{self, TerminalView};
use sqledit::{Session, SqliteEngine};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

/// Browse and edit SQLite databases from the terminal.
#[derive(Debug, Parser)]
#[command(name = "sqledit", version, about)]
struct Cli {
    /// Database file to open on start
    database: Option<PathBuf>,

    /// Configuration file (defaults to <config dir>/sqledit/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print notices without colors
    #[arg(long)]
    no_color: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => config.log.max_level().unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sqledit: {}", e);
            return ExitCode::from(2);
        }
    };
    init_logging(cli.verbose, &config);
    info!("Starting sqledit...");

    let view = TerminalView::new(io::stdin().lock(), io::stdout())
        .with_color(config.ui.color && !cli.no_color)
        .with_max_column_width(config.ui.max_column_width);
    let mut session: Session<SqliteEngine, _> =
        Session::new(view, config.sqlite.connect_options());

    if let Some(path) = &cli.database {
        session.open_database(path);
    }
    repl::run(&mut session);

    info!("Leaving sqledit");
    ExitCode::SUCCESS
}
