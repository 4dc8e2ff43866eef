use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chime_core::board::Board;
use chime_core::config::Config;
use chime_core::session::run_session;
use chime_core::sleeper::shutdown_channel;

const USAGE: &str = "usage: chime [-v|--verbose] [--config <path>]";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    verbose: bool,
    config: Option<PathBuf>,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" | "--verbose" => parsed.verbose = true,
                "--config" => match args.next() {
                    Some(path) => parsed.config = Some(PathBuf::from(path)),
                    None => bail!("--config needs a path\n{}", USAGE),
                },
                other => bail!("unknown argument {:?}\n{}", other, USAGE),
            }
        }
        Ok(parsed)
    }
}

/// Progress goes to stderr; everything, including debug output with
/// `--verbose`, also goes to `chime.log` under the config dir.
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use simplelog::{
        ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger,
    };

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("chime")
        .join("chime.log");
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let log_file =
        File::create(&log_path).or_else(|_| File::create(std::env::temp_dir().join("chime.log")));
    let file_error = match log_file {
        Ok(file) => {
            loggers.push(WriteLogger::new(log_level, simplelog::Config::default(), file));
            None
        }
        Err(e) => Some(e),
    };

    CombinedLogger::init(loggers).context("failed to initialize logger")?;

    if let Some(e) = file_error {
        log::warn!("no log file, logging to the terminal only: {}", e);
    }
    log::debug!("chime starting (log level: {:?})", log_level);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    init_logging(args.verbose)?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => Config::load(),
    };
    let plan = config.playback_plan();
    let settings = config.serial_settings();

    // Installed before the port opens so an early Ctrl+C still goes
    // through teardown.
    let (trigger, mut signal) = shutdown_channel();
    ctrlc::set_handler(move || trigger.trigger()).context("could not install Ctrl+C handler")?;

    let board = Board::open(&settings)
        .with_context(|| format!("could not connect to the board on {}", settings.port))?;

    log::info!(
        "🎼 {} at {}, speaker on pin {}. Ctrl+C to stop",
        plan.melody.name(),
        plan.tempo,
        plan.speaker
    );

    let summary = run_session(board, plan, &mut signal)?;
    log::info!("👋 done after {} full pass(es)", summary.passes_completed);
    Ok(())
}
