//! Click-target selection by line width.
//!
//! No text is read. A line is "the one we want" when the width of its ink
//! is in the accepted set, which is fast but only as good as the calibration.

use crate::{binarize, lines, Extent, Image, Line, Point, ScanDirection};

/// How to pick among several lines with an accepted width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earliest line in scan order.
    First,
    /// Latest line in scan order (reference behavior).
    #[default]
    Last,
    /// Line whose width is listed earliest in the accepted set; later scan
    /// order wins among equals.
    Preferred,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TargetMatcher {
    pub accepted: Vec<u32>,
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for TargetMatcher {
    fn default() -> Self {
        Self {
            accepted: vec![67, 68],
            tie_break: TieBreak::Last,
        }
    }
}

/// A segmented line that holds ink, with its measured extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub line: Line,
    pub extent: Extent,
}

impl Candidate {
    #[inline]
    pub fn width(&self) -> u32 {
        self.extent.width()
    }

    /// Center of the line's bounding box, in scanned-region coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.extent.center_x() as i32, self.line.center_y() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMatch {
    Found(Point),
    NotFound,
}

impl TargetMatch {
    pub fn point(&self) -> Option<Point> {
        match self {
            TargetMatch::Found(p) => Some(*p),
            TargetMatch::NotFound => None,
        }
    }
}

/// Everything one scan pass saw, kept for logging and debug overlays.
#[derive(Debug, Clone)]
pub struct Scan {
    /// Origin of the scanned region inside the full raster.
    pub origin: Point,
    pub candidates: Vec<Candidate>,
    /// Index into `candidates` of the selected line.
    pub selected: Option<usize>,
    /// Selected center translated to full-raster coordinates.
    pub target: TargetMatch,
    /// Widths the candidates were checked against.
    pub accepted: Vec<u32>,
    matches: usize,
}

impl Scan {
    /// Number of candidates whose width was accepted.
    #[inline]
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// More than one line passed the width check; the tie-break decided.
    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }

    pub fn widths(&self) -> Vec<u32> {
        self.candidates.iter().map(|c| c.width()).collect()
    }
}

impl TargetMatcher {
    pub fn new(accepted: impl Into<Vec<u32>>, tie_break: TieBreak) -> Self {
        Self {
            accepted: accepted.into(),
            tie_break,
        }
    }

    #[inline]
    pub fn accepts(&self, width: u32) -> bool {
        self.accepted.contains(&width)
    }

    /// Binarize `region`, segment it, measure every line and select a target.
    ///
    /// `region` is a view into the full capture; the returned point is
    /// translated by the view's origin.
    pub fn scan(&self, region: Image, direction: ScanDirection) -> Scan {
        let bin = binarize::binarize(region);
        let bin = bin.as_image();

        let candidates = lines::segment(bin, direction)
            .filter_map(|line| line.extent(bin).map(|extent| Candidate { line, extent }))
            .collect::<Vec<_>>();

        let matches = candidates.iter().filter(|c| self.accepts(c.width())).count();
        let selected = self.select(&candidates);
        let origin = region.origin();
        let target = match selected {
            Some(i) => TargetMatch::Found(candidates[i].center().offset(origin)),
            None => TargetMatch::NotFound,
        };

        Scan {
            origin,
            candidates,
            selected,
            target,
            accepted: self.accepted.clone(),
            matches,
        }
    }

    /// Index of the candidate to click, according to the tie-break policy.
    pub fn select(&self, candidates: &[Candidate]) -> Option<usize> {
        let mut accepted = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| self.accepts(c.width()));

        match self.tie_break {
            TieBreak::First => accepted.next().map(|(i, _)| i),
            TieBreak::Last => accepted.last().map(|(i, _)| i),
            TieBreak::Preferred => {
                let rank = |c: &Candidate| {
                    self.accepted
                        .iter()
                        .position(|w| *w == c.width())
                        .unwrap_or(usize::MAX)
                };
                let mut best: Option<(usize, usize)> = None;
                for (i, c) in accepted {
                    let r = rank(c);
                    match best {
                        Some((_, best_r)) if r > best_r => {}
                        _ => best = Some((i, r)),
                    }
                }
                best.map(|(i, _)| i)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, OwnedImage, Rect};

    /// Light gray page with dark "text" bars of the given widths, one per row band.
    fn page(bars: &[(u32, u32, u32)]) -> OwnedImage {
        let mut img = OwnedImage::filled(400, 200, Color::new(250, 250, 250));
        for &(x, y, w) in bars {
            img.fill_rect(Rect::new(x, y, w, 8), Color::new(20, 20, 20));
        }
        img
    }

    #[test]
    fn finds_line_by_width() {
        let img = page(&[(10, 10, 40), (100, 40, 68), (20, 80, 90)]);
        let scan = TargetMatcher::default().scan(img.as_image(), ScanDirection::TopDown);

        assert_eq!(scan.widths(), vec![40, 68, 90]);
        // Line rows 38..=49 after cushion, center (100+167)/2.
        assert_eq!(scan.target, TargetMatch::Found(Point::new(133, 43)));
        assert_eq!(scan.matches(), 1);
        assert!(!scan.is_ambiguous());
    }

    #[test]
    fn blank_region_is_not_found() {
        let img = page(&[]);
        let scan = TargetMatcher::default().scan(img.as_image(), ScanDirection::TopDown);
        assert!(scan.candidates.is_empty());
        assert_eq!(scan.target, TargetMatch::NotFound);
        assert_eq!(scan.target.point(), None);
    }

    #[test]
    fn off_by_more_than_one_pixel_is_rejected() {
        let img = page(&[(10, 10, 66), (10, 40, 69)]);
        let scan = TargetMatcher::default().scan(img.as_image(), ScanDirection::TopDown);
        assert_eq!(scan.target, TargetMatch::NotFound);
        assert_eq!(scan.candidates.len(), 2);
        // Measured and expected widths both travel with the result.
        assert_eq!(scan.widths(), vec![66, 69]);
        assert_eq!(scan.accepted, vec![67, 68]);
    }

    #[test]
    fn last_match_wins_by_default() {
        let img = page(&[(10, 10, 67), (50, 60, 68), (5, 120, 30)]);
        let matcher = TargetMatcher::default();

        for _ in 0..3 {
            let scan = matcher.scan(img.as_image(), ScanDirection::TopDown);
            assert!(scan.is_ambiguous());
            assert_eq!(scan.selected, Some(1));
            assert_eq!(scan.target, TargetMatch::Found(Point::new(83, 63)));
        }
    }

    #[test]
    fn other_tie_breaks() {
        let img = page(&[(10, 10, 68), (50, 60, 67), (0, 110, 68), (0, 150, 67)]);

        let first = TargetMatcher::new(vec![67, 68], TieBreak::First)
            .scan(img.as_image(), ScanDirection::TopDown);
        assert_eq!(first.selected, Some(0));

        let preferred = TargetMatcher::new(vec![68, 67], TieBreak::Preferred)
            .scan(img.as_image(), ScanDirection::TopDown);
        assert_eq!(preferred.selected, Some(2));

        let strict = TargetMatcher::new(vec![68], TieBreak::Last)
            .scan(img.as_image(), ScanDirection::TopDown);
        assert_eq!(strict.selected, Some(2));
        assert_eq!(strict.matches(), 2);
    }

    #[test]
    fn region_origin_is_added() {
        let img = page(&[(150, 110, 68)]);
        let region = img.as_image().region(Rect::new(120, 100, 200, 50));
        let scan = TargetMatcher::default().scan(region, ScanDirection::TopDown);

        assert_eq!(scan.origin, Point::new(120, 100));
        // In-region: x 30..=97, rows 8..=19 -> (63, 13); plus origin.
        assert_eq!(scan.target, TargetMatch::Found(Point::new(183, 113)));
    }

    #[test]
    fn bottom_up_last_match_is_topmost() {
        let img = page(&[(10, 10, 68), (10, 60, 68)]);
        let scan = TargetMatcher::default().scan(img.as_image(), ScanDirection::BottomUp);
        assert_eq!(scan.target, TargetMatch::Found(Point::new(43, 13)));
    }
}
