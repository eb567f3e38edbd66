//! Checkbox row counting.
//!
//! A column of checkboxes is bounded by the first and last dark pixel found
//! along a fixed scan column. The number of rows is how many fixed-height
//! boxes (plus spacing) fit between those limits.

use crate::{binarize, Image, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct BoxLayout {
    /// Column scanned for the top and bottom limits.
    pub column: u32,
    pub box_height: u32,
    /// Gap below each box.
    pub spacing: u32,
}

impl Default for BoxLayout {
    fn default() -> Self {
        Self {
            column: 53,
            box_height: 12,
            spacing: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxCount {
    pub top: u32,
    pub bottom: u32,
    pub count: u32,
}

impl BoxLayout {
    /// Count the boxes in `image` (binarized internally).
    ///
    /// `None` when the scan column holds no dark pixel.
    pub fn count(&self, image: Image) -> Option<BoxCount> {
        let bin = binarize::binarize(image);
        let bin = bin.as_image();

        let top = bin.find_in_column_down(self.column, |c| c.is_ink())?;
        let bottom = bin.find_in_column_up(self.column, |c| c.is_ink())?;

        let step = (self.box_height + self.spacing).max(1);
        let available = bottom - top;
        Some(BoxCount {
            top,
            bottom,
            count: available.div_ceil(step),
        })
    }

    /// Rectangles of the counted boxes: 80% of the image width, centered,
    /// stacked from the top limit.
    pub fn boxes(&self, count: BoxCount, image_width: u32) -> Vec<Rect> {
        let w = image_width * 4 / 5;
        let x = (image_width - w) / 2;
        (0..count.count)
            .map(|i| {
                Rect::new(
                    x,
                    count.top + i * (self.box_height + self.spacing),
                    w,
                    self.box_height,
                )
            })
            .collect()
    }
}
