use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Operator abort request, shared with the stdin listener.
#[derive(Debug, Clone, Default)]
pub struct Stop(Arc<AtomicBool>);

const SLICE: Duration = Duration::from_millis(50);

impl Stop {
	pub fn raise(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_raised(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}

	/// Sleep for `dur` in short slices. Returns `false` if the stop was raised.
	pub fn sleep(&self, dur: Duration) -> bool {
		let until = Instant::now() + dur;
		loop {
			if self.is_raised() {
				return false;
			}
			let now = Instant::now();
			if now >= until {
				return true;
			}
			std::thread::sleep(SLICE.min(until - now));
		}
	}

	/// Raise the stop when the operator enters `q` on stdin.
	pub fn listen_stdin(&self) {
		let stop = self.clone();
		std::thread::spawn(move || {
			let stdin = std::io::stdin();
			for line in stdin.lock().lines() {
				let Ok(line) = line else { break };
				if line.trim().eq_ignore_ascii_case("q") {
					tracing::warn!("stop requested by operator");
					stop.raise();
					break;
				}
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raised_stop_cuts_sleep_short() {
		let stop = Stop::default();
		assert!(stop.sleep(Duration::from_millis(1)));

		stop.raise();
		let start = Instant::now();
		assert!(!stop.sleep(Duration::from_secs(10)));
		assert!(start.elapsed() < Duration::from_secs(1));
	}

	#[test]
	fn clones_share_the_flag() {
		let stop = Stop::default();
		let other = stop.clone();
		other.raise();
		assert!(stop.is_raised());
	}
}
