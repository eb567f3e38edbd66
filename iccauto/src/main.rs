//! ICCA report export automation.
//!
//! Replays a recorded click sequence for every patient in `MRN.txt`, and on
//! the report screen pages through reports by reading button colors.

mod capture;
mod config;
mod diagnose;
mod input;
mod logging;
mod navigate;
mod observer;
mod roster;
mod settle;
mod snapshot;
mod stop;
mod workflow;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::capture::{Capture, ReferenceDisplay};
use crate::config::Config;
use crate::workflow::{Driver, RunError};

#[derive(Parser, Debug)]
#[command(name = "iccauto", version, about = "Per-patient report export for ICCA")]
struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every remaining patient (default)
    Run,
    /// Line search on a saved screenshot
    Locate {
        image: PathBuf,
        /// Region to search, as x,y,w,h (default: the whole image)
        #[arg(long, value_parser = diagnose::parse_rect)]
        region: Option<ie::Rect>,
        /// Write an annotated copy here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Count checkbox rows on a saved screenshot
    CountBoxes {
        image: PathBuf,
        #[arg(long, default_value_t = 53)]
        column: u32,
        /// Write an annotated copy here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate every calibrated probe on a screenshot, or on the live display
    Probe { image: Option<PathBuf> },
    /// Write the default configuration
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let path = match cli.config {
        Some(path) => path,
        None => Config::path().unwrap_or_else(|_| PathBuf::from("iccauto.json")),
    };
    let (config, load_err) = match Config::try_load(&path) {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    let command = cli.command.unwrap_or(Command::Run);
    if matches!(command, Command::Run) {
        logging::init(&config.files)?;
    } else {
        logging::init_console();
    }
    if let Some(err) = load_err {
        tracing::warn!(?path, "failed to load config, using defaults: {err:#}");
    }

    let ie = ie::Ie::new(config.calibration.clone());
    match command {
        Command::Run => export(&config, &ie),
        Command::Locate { image, region, out } => diagnose::locate(&ie, &image, region, out.as_deref()),
        Command::CountBoxes { image, column, out } => {
            let layout = ie::BoxLayout {
                column,
                ..Default::default()
            };
            diagnose::count_boxes(&image, layout, out.as_deref())
        }
        Command::Probe { image } => {
            let image = match image {
                Some(path) => ie::OwnedImage::open(&path)?,
                None => ReferenceDisplay.capture()?.image,
            };
            print!("{}", diagnose::describe_probes(&ie, image.as_image()));
            Ok(())
        }
        Command::InitConfig { force } => {
            if path.exists() && !force {
                anyhow::bail!("{:?} already exists (use --force to replace it)", path);
            }
            Config::default().save(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn export(config: &Config, ie: &ie::Ie) -> Result<()> {
    let roster = roster::Roster::load(&config.files.mrn, &config.files.last_patient)?;
    let steps = workflow::load_steps(&config.files.steps)?;
    tracing::info!(
        patients = roster.mrns.len(),
        remaining = roster.remaining().len(),
        steps = steps.len(),
        "application started"
    );

    let stop = stop::Stop::default();
    stop.listen_stdin();
    tracing::info!(delay_ms = config.start_delay_ms, "starting shortly; enter q to stop");
    if !stop.sleep(config.start_delay()) {
        tracing::warn!("stopped before start");
        return Ok(());
    }

    let input = input::Desktop::new(config.click_delay())?;
    let snapshots = snapshot::Snapshots::from_env(&config.files.log_dir);
    let mut driver = Driver::new(ReferenceDisplay, input, ie, config, stop).with_snapshots(snapshots);

    match driver.run(&roster, &steps) {
        Ok(summary) => {
            tracing::info!(patients = summary.patients, reports = summary.reports, "application completed");
            Ok(())
        }
        Err(RunError::Aborted) => {
            tracing::warn!("application stopped by operator");
            Ok(())
        }
        Err(err) => Err(err).context("report export stopped"),
    }
}
