use crate::{
    Color, ColumnProbe, ControlProbe, PixelProbe, Point, Rect, ScanDirection, Swatch,
    TargetMatcher,
};

/// Probe positions, widths and colors for one rendering of the driven
/// application.
///
/// All coordinates are relative to the reference display (the leftmost one
/// when several are attached). The defaults reproduce a 1920×1080 deployment
/// and will need recalibrating for any other resolution, DPI or theme.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Calibration {
    pub time_range: TimeRangeProbe,
    pub next_page: ControlProbe,
    pub print: ControlProbe,
    /// Background that must be showing before text input is sent.
    pub ready: PixelProbe,
}

/// The time-range list: a highlight that shows whether a range is selected,
/// and the line to click when it is not.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TimeRangeProbe {
    pub indicator: ColumnProbe,
    pub matcher: TargetMatcher,
    #[serde(default)]
    pub direction: ScanDirection,
    /// Where to click when no line matches; bottom-center of the region if unset.
    #[serde(default)]
    pub fallback: Option<Point>,
}

impl TimeRangeProbe {
    #[inline]
    pub fn region(&self) -> Rect {
        self.indicator.region
    }

    pub fn fallback(&self) -> Point {
        self.fallback.unwrap_or_else(|| self.region().bottom_center())
    }
}

pub const SELECTION_BLUE: Color = Color::new(51, 153, 255);

impl Default for TimeRangeProbe {
    fn default() -> Self {
        Self {
            indicator: ColumnProbe {
                region: Rect::new(833, 345, 562, 145),
                // Middle of the list.
                column: 281,
                color: SELECTION_BLUE,
            },
            matcher: TargetMatcher::default(),
            direction: ScanDirection::TopDown,
            fallback: None,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            time_range: TimeRangeProbe::default(),
            next_page: ControlProbe {
                at: Point::new(1236, 1003),
                palette: vec![
                    Swatch::disabled("disabled", Color::new(0xF4, 0xF4, 0xF4)),
                    Swatch::enabled("enabled-light-gray", Color::new(0xF0, 0xF0, 0xF0)),
                    Swatch::enabled("enabled-gray", Color::new(0xE1, 0xE1, 0xE1)),
                    Swatch::enabled("enabled-blue-highlight", Color::new(0xE5, 0xF1, 0xFB)),
                ],
            },
            print: ControlProbe {
                at: Point::new(1302, 1003),
                palette: vec![
                    Swatch::disabled("disabled", Color::new(0xF4, 0xF4, 0xF4)),
                    Swatch::enabled("enabled-light-gray", Color::new(0xF0, 0xF0, 0xF0)),
                ],
            },
            ready: PixelProbe {
                at: Point::new(700, 250),
                color: Color::WHITE,
            },
        }
    }
}
