use anyhow::Result;

use ie::screen::report::{Controls, TimeRange};
use ie::{ControlState, Ie, Image, Point};

use crate::capture::{Capture, Frame};
use crate::navigate::Observer;
use crate::settle::{Settle, Settled};
use crate::snapshot::Snapshots;
use crate::stop::Stop;

/// Observes the live report screen, waiting for it to settle before every
/// classification.
pub struct ScreenObserver<'a, C> {
	capture: C,
	ie: &'a Ie,
	settle: Settle,
	stop: Stop,
	snapshots: Option<Snapshots>,
	origin: Point,
}

impl<'a, C: Capture> ScreenObserver<'a, C> {
	pub fn new(capture: C, ie: &'a Ie, settle: Settle, stop: Stop) -> Self {
		Self {
			capture,
			ie,
			settle,
			stop,
			snapshots: None,
			origin: Point::default(),
		}
	}

	pub fn with_snapshots(mut self, snapshots: Option<Snapshots>) -> Self {
		self.snapshots = snapshots;
		self
	}

	/// Capture until `key` gives the same answer twice in a row.
	fn settled<K: PartialEq>(&mut self, what: &str, key: impl Fn(&Ie, Image) -> K) -> Result<(K, Frame)> {
		let ie = self.ie;
		let capture = &mut self.capture;
		let settled = self.settle.until_stable(
			&self.stop,
			|| {
				let frame = capture.capture()?;
				let k = key(ie, frame.image.as_image());
				Ok((k, frame))
			},
			|a, b| a.0 == b.0,
		)?;

		if let Settled::TimedOut(_) = settled {
			tracing::warn!(what, timeout_ms = self.settle.timeout_ms, "screen did not settle; using last capture");
		}
		let (k, frame) = settled.into_inner();
		self.origin = frame.origin;
		Ok((k, frame))
	}
}

impl<C: Capture> Observer for ScreenObserver<'_, C> {
	fn time_range(&mut self) -> Result<TimeRange> {
		let (_, frame) = self.settled("time range", |ie, img| {
			ie.calibration().time_range.indicator.find(img)
		})?;
		let range = self.ie.report_time_range(frame.image.as_image());

		if let (TimeRange::Unset { scan, .. }, Some(snaps)) = (&range, &self.snapshots) {
			let region = self.ie.calibration().time_range.region();
			snaps.save(
				"lines",
				"time_range",
				&ie::debug::draw_scan(frame.image.as_image(), scan, region.w),
			);
		}
		Ok(range)
	}

	fn controls(&mut self) -> Result<Controls> {
		let (controls, _) = self.settled("controls", |ie, img| ie.report_controls(img))?;

		let cal = self.ie.calibration();
		if controls.next_page.state == ControlState::Unknown {
			tracing::debug!(
				sampled = ?controls.next_page.sampled,
				expected = %cal.next_page.expected(),
				"next page color not in palette"
			);
		}
		if controls.print.state == ControlState::Unknown {
			tracing::debug!(
				sampled = ?controls.print.sampled,
				expected = %cal.print.expected(),
				"print color not in palette"
			);
		}
		Ok(controls)
	}

	fn origin(&self) -> Point {
		self.origin
	}
}
