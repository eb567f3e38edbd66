//! Waiting for the driven application to finish rendering.
//!
//! Instead of one blind delay after each input, the screen is re-sampled until
//! two consecutive samples agree or a timeout passes.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::stop::Stop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Settle {
	pub interval_ms: u64,
	pub timeout_ms: u64,
}

impl Default for Settle {
	fn default() -> Self {
		Self {
			interval_ms: 250,
			timeout_ms: 3000,
		}
	}
}

/// How a wait ended. Every variant carries the last sample taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<T> {
	Stable(T),
	TimedOut(T),
	Stopped(T),
}

impl<T> Settled<T> {
	pub fn into_inner(self) -> T {
		match self {
			Settled::Stable(v) | Settled::TimedOut(v) | Settled::Stopped(v) => v,
		}
	}
}

impl Settle {
	#[inline]
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}

	#[inline]
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Sample until two consecutive samples are `same`.
	pub fn until_stable<T>(
		&self,
		stop: &Stop,
		mut sample: impl FnMut() -> Result<T>,
		same: impl Fn(&T, &T) -> bool,
	) -> Result<Settled<T>> {
		let deadline = Instant::now() + self.timeout();
		let mut last = sample()?;
		loop {
			if Instant::now() >= deadline {
				return Ok(Settled::TimedOut(last));
			}
			if !stop.sleep(self.interval()) {
				return Ok(Settled::Stopped(last));
			}
			let next = sample()?;
			if same(&last, &next) {
				return Ok(Settled::Stable(next));
			}
			last = next;
		}
	}

	/// Sample until `done` holds for a sample.
	pub fn until<T>(
		&self,
		stop: &Stop,
		mut sample: impl FnMut() -> Result<T>,
		done: impl Fn(&T) -> bool,
	) -> Result<Settled<T>> {
		let deadline = Instant::now() + self.timeout();
		loop {
			let current = sample()?;
			if done(&current) {
				return Ok(Settled::Stable(current));
			}
			if Instant::now() >= deadline {
				return Ok(Settled::TimedOut(current));
			}
			if !stop.sleep(self.interval()) {
				return Ok(Settled::Stopped(current));
			}
		}
	}
}
