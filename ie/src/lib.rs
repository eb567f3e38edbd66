//! Image engine: pixel-level inference of what the driven application shows.
//!
//! Nothing here reads text. Targets are found by the width of a line's ink,
//! and control states by exact colors at calibrated points.

mod raster;
pub use raster::*;
mod geometry;
pub use geometry::*;
pub mod binarize;
mod lines;
pub use lines::*;
mod matcher;
pub use matcher::*;
mod probe;
pub use probe::*;
mod calibration;
pub use calibration::*;
mod checkbox;
pub use checkbox::*;
pub mod debug;

pub mod screen;

pub struct Ie {
	calibration: Calibration,
}

impl Ie {
	pub fn new(calibration: Calibration) -> Self {
		Self { calibration }
	}

	pub fn calibration(&self) -> &Calibration {
		&self.calibration
	}

	pub fn report_time_range(&self, image: Image) -> screen::report::TimeRange {
		screen::report::time_range(image, &self.calibration.time_range)
	}

	pub fn report_controls(&self, image: Image) -> screen::report::Controls {
		screen::report::controls(image, &self.calibration)
	}

	/// Cheap check that the input field is showing before typing into it.
	pub fn report_is_ready(&self, image: Image) -> bool {
		screen::report::is_ready(image, &self.calibration)
	}

	/// Line search over an arbitrary region of a capture.
	pub fn locate(&self, image: Image, region: Rect) -> Scan {
		let probe = &self.calibration.time_range;
		probe.matcher.scan(image.region(region), probe.direction)
	}
}
