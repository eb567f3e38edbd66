//! Optional debug images, enabled with `ICCAUTO_WRITE_IMAGE=1`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ie::debug::RgbImage;

#[derive(Debug, Clone)]
pub struct Snapshots {
	dir: PathBuf,
}

impl Snapshots {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn from_env(dir: &Path) -> Option<Self> {
		if std::env::var("ICCAUTO_WRITE_IMAGE").as_deref() == Ok("1") {
			Some(Self::new(dir))
		} else {
			None
		}
	}

	fn path(&self, kind: &str, name: &str) -> PathBuf {
		let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
		let name = name.replace(' ', "_");
		self.dir.join(format!("_{kind}_{timestamp}_{name}.png"))
	}

	pub fn try_save(&self, kind: &str, name: &str, image: &RgbImage) -> Result<PathBuf> {
		std::fs::create_dir_all(&self.dir).with_context(|| format!("create {:?}", self.dir))?;
		let path = self.path(kind, name);
		image
			.save(&path)
			.with_context(|| format!("write {:?}", path))?;
		Ok(path)
	}

	/// Save and log; a failed snapshot never interrupts the run.
	pub fn save(&self, kind: &str, name: &str, image: &RgbImage) {
		match self.try_save(kind, name, image) {
			Ok(path) => tracing::debug!(?path, kind, "saved snapshot"),
			Err(err) => tracing::warn!(error = %err, kind, "failed to save snapshot"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn writes_timestamped_png() {
		let dir = tempfile::tempdir().unwrap();
		let snaps = Snapshots::new(dir.path().join("Log"));
		let img = RgbImage::new(4, 4);

		let path = snaps.try_save("screenshot", "Step 1", &img).unwrap();
		assert!(path.exists());
		let name = path.file_name().unwrap().to_string_lossy().into_owned();
		assert!(name.starts_with("_screenshot_"));
		assert!(name.ends_with("_Step_1.png"));
	}
}
