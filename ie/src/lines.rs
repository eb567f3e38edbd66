//! Text line segmentation on binarized rasters.
//!
//! A "line" is a run of rows that contain at least one black pixel, padded by
//! a small cushion above and below. Lines are never recognized, only measured:
//! the horizontal extent of their ink is used as a fingerprint.

use crate::Image;

/// Rows of padding added on each side of a run of inked rows.
pub const CUSHION: u32 = 2;

/// Row interval `[top, bottom]` (inclusive) judged to contain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub top: u32,
    pub bottom: u32,
}

impl Line {
    #[inline]
    pub fn center_y(&self) -> u32 {
        (self.top + self.bottom) / 2
    }

    /// Horizontal extent of the black pixels inside this line's rows.
    ///
    /// `None` when the rows hold no ink at all, which cushion padding can
    /// produce on hand-built or clipped lines. Such lines must not be matched.
    pub fn extent(&self, image: Image) -> Option<Extent> {
        let mut min_x = u32::MAX;
        let mut max_x = None;

        let last = self.bottom.min(image.height().saturating_sub(1));
        for y in self.top..=last {
            if y >= image.height() {
                break;
            }
            for (x, clr) in image.row(y).enumerate() {
                if clr.is_ink() {
                    let x = x as u32;
                    min_x = min_x.min(x);
                    max_x = Some(max_x.map_or(x, |m: u32| m.max(x)));
                }
            }
        }

        max_x.map(|max_x| Extent { min_x, max_x })
    }
}

/// Columns `[min_x, max_x]` (inclusive) of a line's ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub min_x: u32,
    pub max_x: u32,
}

impl Extent {
    #[inline]
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    #[inline]
    pub fn center_x(&self) -> u32 {
        (self.min_x + self.max_x) / 2
    }
}

/// Order in which rows are visited.
///
/// Bottom-up is used when the interesting text is anchored to the bottom of
/// its container. Emitted lines are always normalized so `top <= bottom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanDirection {
    #[default]
    TopDown,
    BottomUp,
}

/// Segment a binarized view into lines, in scan order.
///
/// The returned iterator is cheap to clone; cloning restarts nothing but lets
/// the caller replay the remaining lines.
pub fn segment(image: Image, direction: ScanDirection) -> Lines<'_> {
    Lines {
        image,
        direction,
        scanned: 0,
        open: None,
    }
}

#[derive(Clone)]
pub struct Lines<'a> {
    image: Image<'a>,
    direction: ScanDirection,
    /// Rows visited so far.
    scanned: u32,
    /// Row where the current run of ink started.
    open: Option<u32>,
}

impl Lines<'_> {
    fn close(&self, start: u32, end: u32) -> Line {
        let last = self.image.height() - 1;
        match self.direction {
            ScanDirection::TopDown => Line {
                top: start.saturating_sub(CUSHION),
                bottom: (end + CUSHION).min(last),
            },
            ScanDirection::BottomUp => Line {
                top: end.saturating_sub(CUSHION),
                bottom: (start + CUSHION).min(last),
            },
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let height = self.image.height();

        while self.scanned < height {
            let y = match self.direction {
                ScanDirection::TopDown => self.scanned,
                ScanDirection::BottomUp => height - 1 - self.scanned,
            };
            self.scanned += 1;

            let has_ink = self.image.row(y).any(|c| c.is_ink());
            match (has_ink, self.open) {
                (true, None) => self.open = Some(y),
                (false, Some(start)) => {
                    self.open = None;
                    // The previous row was the last inked one.
                    let end = match self.direction {
                        ScanDirection::TopDown => y - 1,
                        ScanDirection::BottomUp => y + 1,
                    };
                    return Some(self.close(start, end));
                }
                _ => {}
            }
        }

        // The raster ended inside a run of ink: close at the edge, no cushion.
        let start = self.open.take()?;
        Some(match self.direction {
            ScanDirection::TopDown => Line {
                top: start.saturating_sub(CUSHION),
                bottom: height - 1,
            },
            ScanDirection::BottomUp => Line {
                top: 0,
                bottom: (start + CUSHION).min(height - 1),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, OwnedImage, Rect};

    fn page(height: u32) -> OwnedImage {
        OwnedImage::filled(200, height, Color::WHITE)
    }

    #[test]
    fn single_band_gets_cushion() {
        let mut img = page(40);
        img.fill_rect(Rect::new(30, 10, 20, 11), Color::BLACK);

        let lines = segment(img.as_image(), ScanDirection::TopDown).collect::<Vec<_>>();
        assert_eq!(lines, vec![Line { top: 8, bottom: 22 }]);
    }

    #[test]
    fn cushion_is_clamped_to_raster() {
        let mut img = page(12);
        img.fill_rect(Rect::new(0, 0, 5, 2), Color::BLACK);
        img.fill_rect(Rect::new(0, 8, 5, 3), Color::BLACK);

        let lines = segment(img.as_image(), ScanDirection::TopDown).collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![Line { top: 0, bottom: 3 }, Line { top: 6, bottom: 11 }]
        );
    }

    #[test]
    fn ink_reaching_the_last_row_closes_there() {
        let mut img = page(20);
        img.fill_rect(Rect::new(0, 15, 5, 5), Color::BLACK);

        let lines = segment(img.as_image(), ScanDirection::TopDown).collect::<Vec<_>>();
        assert_eq!(lines, vec![Line { top: 13, bottom: 19 }]);
    }

    #[test]
    fn blank_raster_has_no_lines() {
        let img = page(50);
        assert_eq!(segment(img.as_image(), ScanDirection::TopDown).count(), 0);
        assert_eq!(segment(img.as_image(), ScanDirection::BottomUp).count(), 0);

        let empty = OwnedImage::filled(10, 0, Color::WHITE);
        assert_eq!(segment(empty.as_image(), ScanDirection::TopDown).count(), 0);
    }

    #[test]
    fn bottom_up_mirrors_and_normalizes() {
        let mut img = page(60);
        img.fill_rect(Rect::new(0, 10, 5, 11), Color::BLACK);
        img.fill_rect(Rect::new(0, 40, 5, 5), Color::BLACK);

        let down = segment(img.as_image(), ScanDirection::TopDown).collect::<Vec<_>>();
        let mut up = segment(img.as_image(), ScanDirection::BottomUp).collect::<Vec<_>>();
        assert_eq!(up[0], Line { top: 38, bottom: 46 });
        up.reverse();
        assert_eq!(down, up);
    }

    #[test]
    fn bottom_up_run_touching_first_row() {
        let mut img = page(20);
        img.fill_rect(Rect::new(0, 0, 5, 3), Color::BLACK);

        let lines = segment(img.as_image(), ScanDirection::BottomUp).collect::<Vec<_>>();
        assert_eq!(lines, vec![Line { top: 0, bottom: 4 }]);
    }

    #[test]
    fn segmentation_is_restartable() {
        let mut img = page(60);
        img.fill_rect(Rect::new(0, 5, 5, 5), Color::BLACK);
        img.fill_rect(Rect::new(0, 30, 5, 5), Color::BLACK);

        let lines = segment(img.as_image(), ScanDirection::TopDown);
        let first: Vec<_> = lines.clone().collect();
        let second: Vec<_> = lines.collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn extent_measures_ink_columns() {
        let mut img = page(30);
        img.fill_rect(Rect::new(100, 10, 68, 4), Color::BLACK);

        let line = segment(img.as_image(), ScanDirection::TopDown)
            .next()
            .expect("one line");
        let extent = line.extent(img.as_image()).expect("inked line");
        assert_eq!(extent, Extent { min_x: 100, max_x: 167 });
        assert_eq!(extent.width(), 68);
        assert_eq!(extent.center_x(), 133);
    }

    #[test]
    fn extent_of_inkless_rows_is_none() {
        let mut img = page(30);
        img.fill_rect(Rect::new(10, 20, 5, 5), Color::BLACK);

        let cushion_only = Line { top: 0, bottom: 5 };
        assert_eq!(cushion_only.extent(img.as_image()), None);
    }
}
