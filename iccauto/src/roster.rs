//! Patient list and resume point.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
	pub mrns: Vec<String>,
	/// Index of the first patient still to process.
	pub start: usize,
}

impl Roster {
	/// Read MRNs (blank lines dropped) and resume after the last processed one.
	///
	/// A recorded MRN that is no longer in the list restarts from the beginning.
	pub fn load(mrn_file: &Path, last_patient_file: &Path) -> Result<Self> {
		let text = fs::read_to_string(mrn_file).with_context(|| format!("read MRN list {:?}", mrn_file))?;
		let mrns = text
			.lines()
			.map(str::trim)
			.filter(|l| !l.is_empty())
			.map(str::to_string)
			.collect::<Vec<_>>();

		let start = match last_processed(last_patient_file)? {
			Some(last) => match mrns.iter().position(|m| *m == last) {
				Some(i) => {
					tracing::info!(mrn = %last, "resuming after last processed patient");
					i + 1
				}
				None => {
					tracing::info!(mrn = %last, "last processed MRN not in list; starting from the beginning");
					0
				}
			},
			None => {
				tracing::info!("no last patient record; starting from the beginning");
				0
			}
		};

		Ok(Self { mrns, start })
	}

	pub fn remaining(&self) -> &[String] {
		self.mrns.get(self.start..).unwrap_or_default()
	}
}

fn last_processed(path: &Path) -> Result<Option<String>> {
	if !path.exists() {
		return Ok(None);
	}
	let text = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
	let mrn = text.trim();
	Ok((!mrn.is_empty()).then(|| mrn.to_string()))
}

pub fn record_processed(path: &Path, mrn: &str) -> Result<()> {
	fs::write(path, mrn).with_context(|| format!("write {:?}", path))
}
