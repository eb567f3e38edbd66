//! Report export screen.
//!
//! The screen has a time-range list (one entry must be highlighted before a
//! report can be produced) and two buttons at the bottom: "next page" and
//! "print". Everything here is a read-only query on one capture.

use crate::{Calibration, ControlReading, Image, Point, Scan, TimeRangeProbe};

/// What the time-range list currently shows.
#[derive(Debug, Clone)]
pub enum TimeRange {
    /// The selection highlight was found at this row.
    Indicated { row: u32 },
    /// Nothing highlighted. `scan` holds the line search over the list.
    Unset { scan: Scan, fallback: Point },
}

impl TimeRange {
    /// Where to click to select a range, `None` when one is already selected.
    pub fn click_point(&self) -> Option<Point> {
        match self {
            TimeRange::Indicated { .. } => None,
            TimeRange::Unset { scan, fallback } => Some(scan.target.point().unwrap_or(*fallback)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub next_page: ControlReading,
    pub print: ControlReading,
}

pub fn time_range(image: Image, probe: &TimeRangeProbe) -> TimeRange {
    if let Some(row) = probe.indicator.find(image) {
        return TimeRange::Indicated { row };
    }

    let region = image.region(probe.region());
    TimeRange::Unset {
        scan: probe.matcher.scan(region, probe.direction),
        fallback: probe.fallback(),
    }
}

pub fn controls(image: Image, calibration: &Calibration) -> Controls {
    Controls {
        next_page: calibration.next_page.read(image),
        print: calibration.print.read(image),
    }
}

pub fn is_ready(image: Image, calibration: &Calibration) -> bool {
    calibration.ready.matches(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, ControlState, OwnedImage, Rect, TargetMatch};

    fn screen() -> OwnedImage {
        OwnedImage::filled(1920, 1080, Color::WHITE)
    }

    #[test]
    fn highlighted_range_needs_no_click() {
        let cal = Calibration::default();
        let mut img = screen();
        img.fill_rect(Rect::new(833, 400, 562, 16), cal.time_range.indicator.color);

        let range = time_range(img.as_image(), &cal.time_range);
        assert!(matches!(range, TimeRange::Indicated { row: 415 }));
        assert_eq!(range.click_point(), None);
    }

    #[test]
    fn unset_range_clicks_matching_line() {
        let cal = Calibration::default();
        let mut img = screen();
        img.fill_rect(Rect::new(850, 380, 120, 9), Color::BLACK);
        img.fill_rect(Rect::new(850, 420, 68, 9), Color::BLACK);

        let range = time_range(img.as_image(), &cal.time_range);
        let TimeRange::Unset { scan, .. } = &range else {
            panic!("expected unset range");
        };
        assert_eq!(scan.widths(), vec![120, 68]);
        // Line rows 418..=430 (full-screen), columns 850..=917.
        assert_eq!(scan.target, TargetMatch::Found(Point::new(883, 424)));
        assert_eq!(range.click_point(), Some(Point::new(883, 424)));
    }

    #[test]
    fn unset_range_without_match_falls_back() {
        let cal = Calibration::default();
        let img = screen();

        let range = time_range(img.as_image(), &cal.time_range);
        assert_eq!(range.click_point(), Some(cal.time_range.fallback()));
    }

    #[test]
    fn reads_both_controls() {
        let cal = Calibration::default();
        let mut img = screen();
        img.set(1236, 1003, Color::new(0xE1, 0xE1, 0xE1));
        img.set(1302, 1003, Color::new(0xF4, 0xF4, 0xF4));

        let c = controls(img.as_image(), &cal);
        assert_eq!(c.next_page.state, ControlState::Enabled("enabled-gray".into()));
        assert_eq!(c.print.state, ControlState::Disabled("disabled".into()));
        assert!(is_ready(img.as_image(), &cal));
    }
}
