/// Pixel coordinates.
///
/// Signed so the same type carries raster coordinates and absolute desktop
/// coordinates (displays left of or above the primary have negative origins).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Point {
	pub x: i32,
	pub y: i32,
}

impl Point {
	#[inline]
	pub const fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}

	/// Translate by another point (e.g. a region or screen origin).
	#[inline]
	pub const fn offset(self, by: Point) -> Self {
		Self::new(self.x + by.x, self.y + by.y)
	}
}

impl std::fmt::Display for Point {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// Axis-aligned rectangle in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Rect {
	pub x: u32,
	pub y: u32,
	pub w: u32,
	pub h: u32,
}

impl Rect {
	#[inline]
	pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
		Self { x, y, w, h }
	}

	#[inline]
	pub fn right(&self) -> u32 {
		self.x + self.w
	}

	#[inline]
	pub fn bottom(&self) -> u32 {
		self.y + self.h
	}

	/// Middle of the last row, where a click lands when nothing better is known.
	pub fn bottom_center(&self) -> Point {
		Point::new(
			(self.x + self.w / 2) as i32,
			(self.y + self.h.saturating_sub(1)) as i32,
		)
	}
}
