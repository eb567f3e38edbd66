use anyhow::{Context, Result};
use xcap::image::EncodableLayout;

use ie::{OwnedImage, Point};

/// One capture of the reference display.
#[derive(Debug, Clone)]
pub struct Frame {
	pub image: OwnedImage,
	/// Desktop position of the captured display's top-left pixel.
	pub origin: Point,
}

/// Source of frames. Implemented over xcap for the real desktop.
pub trait Capture {
	fn capture(&mut self) -> Result<Frame>;
}

impl<C: Capture + ?Sized> Capture for &mut C {
	fn capture(&mut self) -> Result<Frame> {
		(**self).capture()
	}
}

/// Captures the leftmost attached monitor, the display every calibrated
/// coordinate is relative to.
#[derive(Debug, Default)]
pub struct ReferenceDisplay;

pub fn reference_monitor() -> Result<xcap::Monitor> {
	let monitors = xcap::Monitor::all().context("enumerate monitors")?;
	monitors
		.into_iter()
		.filter_map(|m| m.x().ok().map(|x| (x, m)))
		.min_by_key(|(x, _)| *x)
		.map(|(_, m)| m)
		.context("no monitor attached")
}

impl Capture for ReferenceDisplay {
	fn capture(&mut self) -> Result<Frame> {
		let monitor = reference_monitor()?;
		let origin = Point::new(
			monitor.x().context("monitor x")?,
			monitor.y().context("monitor y")?,
		);
		let img = monitor.capture_image().context("capture monitor")?;

		Ok(Frame {
			image: OwnedImage::from_rgba(img.width() as usize, img.as_bytes()),
			origin,
		})
	}
}
