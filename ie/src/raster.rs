//! Rasters.
//!
//! A capture is held once as an `OwnedImage`; everything downstream works on
//! `Image` views that share its pixels. Only the binarizer and the debug
//! overlays copy.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{Point, Rect};

/// Row-major RGB pixels. Alpha is never kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color; width as usize * height as usize],
        }
    }

    /// From a packed RGBA buffer as returned by screen capture. A trailing
    /// partial row is ignored.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let rows = bytes.len() / 4 / width.max(1);
        let data = bytes
            .chunks_exact(4)
            .take(width * rows)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();
        Self {
            width: width as u32,
            height: rows as u32,
            data,
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)
            .with_context(|| format!("decode {:?}", path))?
            .into_rgb8();
        Ok(Self {
            width: rgb.width(),
            height: rgb.height(),
            data: rgb.pixels().map(|&image::Rgb([r, g, b])| Color::new(r, g, b)).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.data[i] = color;
        }
    }

    /// Paint a solid rectangle, clipped to the image.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let right = rect.right().min(self.width);
        for y in rect.y..rect.bottom().min(self.height) {
            if rect.x < right {
                let (start, end) = (self.index(rect.x, y), self.index(right, y));
                self.data[start..end].fill(color);
            }
        }
    }

    pub fn map_pixels(&mut self, f: impl Fn(&mut Color)) {
        self.data.iter_mut().for_each(f);
    }

    pub fn as_image(&self) -> Image<'_> {
        Image {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

/// A rectangular window onto an `OwnedImage`.
///
/// Accessors take view-relative coordinates; `origin()` is where the window
/// sits in the backing raster.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    stride: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    /// Caller guarantees `x < width` and `y < height`.
    #[inline(always)]
    fn at(&self, x: u32, y: u32) -> Color {
        self.data[(self.y + y) as usize * self.stride as usize + (self.x + x) as usize]
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.at(x, y))
    }

    /// Like `get`, for signed points (negative is outside).
    #[inline]
    pub fn sample(&self, at: Point) -> Option<Color> {
        let x = u32::try_from(at.x).ok()?;
        let y = u32::try_from(at.y).ok()?;
        self.get(x, y)
    }

    /// Pixels of one view-relative row, left to right.
    pub fn row(&self, y: u32) -> impl Iterator<Item = Color> + 'a {
        let start = (self.y + y) as usize * self.stride as usize + self.x as usize;
        let data = self.data;
        data[start..start + self.width as usize].iter().copied()
    }

    pub fn to_owned_image(self) -> OwnedImage {
        OwnedImage {
            width: self.width,
            height: self.height,
            data: (0..self.height).flat_map(|y| self.row(y)).collect(),
        }
    }

    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.at(x, y);
            image::Rgb([c.r, c.g, c.b])
        })
    }

    /// Narrower view (relative coordinates), clipped to this one.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width);
        let y = y.min(self.height);
        Self {
            x: self.x + x,
            y: self.y + y,
            width: width.min(self.width - x),
            height: height.min(self.height - y),
            ..*self
        }
    }

    #[inline]
    pub fn region(&self, rect: Rect) -> Self {
        self.sub_image(rect.x, rect.y, rect.w, rect.h)
    }

    /// Lowest row in column `x` whose pixel satisfies `pred`.
    pub fn find_in_column_up(&self, x: u32, pred: impl Fn(Color) -> bool) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        (0..self.height).rev().find(|&y| pred(self.at(x, y)))
    }

    /// Highest row in column `x` whose pixel satisfies `pred`.
    pub fn find_in_column_down(&self, x: u32, pred: impl Fn(Color) -> bool) -> Option<u32> {
        if x >= self.width {
            return None;
        }
        (0..self.height).find(|&y| pred(self.at(x, y)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `(30R + 59G + 11B) / 100`, truncated. The weights sum to 100, so the
    /// result fits a `u8`.
    #[inline]
    pub fn luminance(&self) -> u8 {
        let [r, g, b] = [self.r, self.g, self.b].map(u32::from);
        ((30 * r + 59 * g + 11 * b) / 100) as u8
    }

    /// A black pixel of a binarized raster.
    #[inline]
    pub fn is_ink(&self) -> bool {
        *self == Self::BLACK
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
