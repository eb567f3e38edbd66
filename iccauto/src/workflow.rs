//! Per-patient step list, replayed for every MRN of the roster.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use ie::{Ie, Point};

use crate::capture::Capture;
use crate::config::Config;
use crate::input::Input;
use crate::logging::PATIENT;
use crate::navigate::{NavError, Navigator};
use crate::observer::ScreenObserver;
use crate::roster::{self, Roster};
use crate::settle::Settled;
use crate::snapshot::Snapshots;
use crate::stop::Stop;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	#[default]
	Click,
	/// Click the search field, then type the patient's MRN and confirm.
	EnterMrn,
	/// Click, then page through the report screen until print is reached.
	GenerateReports,
}

/// One entry of `locations.json`. Coordinates are relative to the reference
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
	#[serde(rename = "xpos")]
	pub x: i32,
	#[serde(rename = "ypos")]
	pub y: i32,
	#[serde(default)]
	pub instruction: String,
	#[serde(default)]
	pub action: Action,
	/// Sort key; steps with equal numbers keep file order.
	#[serde(default, alias = "StepNumber")]
	pub step_number: i32,
	#[serde(default = "default_pre_click_delay")]
	pub pre_click_delay: u64,
	#[serde(default = "default_post_click_delay")]
	pub post_click_delay: u64,
	#[serde(default = "default_input_delay")]
	pub input_delay: u64,
}

fn default_pre_click_delay() -> u64 {
	500
}

fn default_post_click_delay() -> u64 {
	2000
}

fn default_input_delay() -> u64 {
	500
}

impl Step {
	#[inline]
	pub fn at(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

pub fn load_steps(path: &Path) -> Result<Vec<Step>> {
	let json = fs::read_to_string(path).with_context(|| format!("read step list {:?}", path))?;
	if json.trim().is_empty() {
		bail!("step list {:?} is empty", path);
	}
	let mut steps: Vec<Step> = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
	if steps.is_empty() {
		bail!("no steps in {:?}", path);
	}
	steps.sort_by_key(|s| s.step_number);
	Ok(steps)
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
	#[error("patient {mrn} failed")]
	Patient { mrn: String, source: NavError },
	#[error("stopped by operator")]
	Aborted,
	#[error(transparent)]
	Io(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
	pub patients: usize,
	pub reports: u32,
}

pub struct Driver<'a, C, I> {
	capture: C,
	input: I,
	ie: &'a Ie,
	config: &'a Config,
	stop: Stop,
	snapshots: Option<Snapshots>,
}

impl<'a, C: Capture, I: Input> Driver<'a, C, I> {
	pub fn new(capture: C, input: I, ie: &'a Ie, config: &'a Config, stop: Stop) -> Self {
		Self {
			capture,
			input,
			ie,
			config,
			stop,
			snapshots: None,
		}
	}

	pub fn with_snapshots(mut self, snapshots: Option<Snapshots>) -> Self {
		self.snapshots = snapshots;
		self
	}

	/// Process every remaining patient, stopping at the first failure.
	pub fn run(&mut self, roster: &Roster, steps: &[Step]) -> Result<Summary, RunError> {
		let mut summary = Summary::default();

		for mrn in roster.remaining() {
			if self.stop.is_raised() {
				return Err(RunError::Aborted);
			}
			tracing::info!(target: PATIENT, %mrn, "started processing");

			match self.patient(mrn, steps) {
				Ok(reports) => {
					roster::record_processed(&self.config.files.last_patient, mrn)?;
					summary.patients += 1;
					summary.reports += reports;
					tracing::info!(target: PATIENT, %mrn, reports, "completed processing");
				}
				Err(NavError::Aborted { .. }) => {
					tracing::warn!(target: PATIENT, %mrn, "stopped before completion");
					return Err(RunError::Aborted);
				}
				Err(err) => {
					tracing::error!(target: PATIENT, %mrn, error = %err, "failed processing; stopping");
					return Err(RunError::Patient {
						mrn: mrn.clone(),
						source: err,
					});
				}
			}
		}

		tracing::info!(patients = summary.patients, reports = summary.reports, "roster finished");
		Ok(summary)
	}

	fn patient(&mut self, mrn: &str, steps: &[Step]) -> Result<u32, NavError> {
		let mut reports = 0;
		for (i, step) in steps.iter().enumerate() {
			let n = i + 1;
			let _span = tracing::info_span!("step", n, instruction = %step.instruction).entered();
			tracing::info!(%mrn, action = ?step.action, at = %step.at(), "executing step");

			self.pause(step.pre_click_delay)?;
			match step.action {
				Action::Click => self.click(n, step.at())?,
				Action::EnterMrn => {
					self.click(n, step.at())?;
					self.wait_ready()?;
					self.pause(step.input_delay)?;
					self.input.type_text(mrn)?;
					self.pause(step.input_delay)?;
					self.input.press_enter()?;
				}
				Action::GenerateReports => {
					self.click(n, step.at())?;
					reports += self.generate_reports()?;
				}
			}
			self.pause(step.post_click_delay)?;
			tracing::info!(%mrn, "completed step");
		}
		Ok(reports)
	}

	fn pause(&self, ms: u64) -> Result<(), NavError> {
		if self.stop.sleep(Duration::from_millis(ms)) {
			Ok(())
		} else {
			Err(NavError::Aborted { reports_generated: 0 })
		}
	}

	/// Click at reference-display coordinates.
	fn click(&mut self, n: usize, at: Point) -> Result<(), NavError> {
		if self.stop.is_raised() {
			return Err(NavError::Aborted { reports_generated: 0 });
		}
		let frame = self.capture.capture()?;
		let abs = at.offset(frame.origin);
		self.input.click(abs)?;
		tracing::info!(%at, %abs, "clicked");

		// The mark goes on the frame the click was aimed at.
		if let Some(snaps) = &self.snapshots {
			snaps.save(
				"screenshot_with_click",
				&format!("Step_{n}_Click"),
				&ie::debug::mark_click(frame.image.as_image(), at),
			);
		}
		Ok(())
	}

	fn wait_ready(&mut self) -> Result<(), NavError> {
		let ie = self.ie;
		let capture = &mut self.capture;
		let settled = self.config.settle.until(
			&self.stop,
			|| Ok(ie.report_is_ready(capture.capture()?.image.as_image())),
			|ready| *ready,
		)?;
		match settled {
			Settled::Stable(_) => Ok(()),
			Settled::TimedOut(_) => {
				let ready = &ie.calibration().ready;
				Err(anyhow!("ready probe at {} never showed {}", ready.at, ready.color).into())
			}
			Settled::Stopped(_) => Err(NavError::Aborted { reports_generated: 0 }),
		}
	}

	fn generate_reports(&mut self) -> Result<u32, NavError> {
		let observer = ScreenObserver::new(&mut self.capture, self.ie, self.config.settle, self.stop.clone())
			.with_snapshots(self.snapshots.clone());
		let mut nav = Navigator::new(observer, &mut self.input, self.config.max_attempts, self.stop.clone());
		let reports = nav.run()?;
		let session = nav.session();
		tracing::info!(
			reports,
			files = reports + 1,
			iterations = session.iterations,
			state = ?session.state,
			"reports generated"
		);
		Ok(reports)
	}
}
