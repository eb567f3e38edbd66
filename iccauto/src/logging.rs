use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Files;

/// Target of the per-patient summary events.
pub const PATIENT: &str = "patient";

fn append(path: &Path) -> Result<File> {
	OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.with_context(|| format!("open log {:?}", path))
}

/// Console (`RUST_LOG`, default `info`), the step log with everything down to
/// debug, and the patient log with only `patient` events.
pub fn init(files: &Files) -> Result<()> {
	let step_log = append(&files.step_log)?;
	let patient_log = append(&files.patient_log)?;

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())),
		)
		.with(
			fmt::layer()
				.with_writer(Mutex::new(step_log))
				.with_ansi(false)
				.with_filter(LevelFilter::DEBUG),
		)
		.with(
			fmt::layer()
				.with_writer(Mutex::new(patient_log))
				.with_ansi(false)
				.with_target(false)
				.with_filter(Targets::new().with_target(PATIENT, Level::INFO)),
		)
		.try_init()
		.context("install log subscriber")
}

/// Console only, for the diagnostic subcommands.
pub fn init_console() {
	let _ = tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.try_init();
}
