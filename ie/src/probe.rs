//! Exact-color probes.
//!
//! Controls of the driven application are classified by sampling a single
//! pixel and comparing it to a small palette. Comparison is exact: a one unit
//! difference in any channel is a miss.

use crate::{Color, Image, Point, Rect};

/// Named reference color.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Swatch {
    pub name: String,
    pub color: Color,
    /// Whether this color means the control can be clicked.
    #[serde(default)]
    pub enabled: bool,
}

impl Swatch {
    pub fn enabled(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            enabled: true,
        }
    }

    pub fn disabled(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlState {
    Enabled(String),
    Disabled(String),
    /// Nothing in the palette matched (or the probe fell outside the capture).
    Unknown,
}

impl ControlState {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self, ControlState::Enabled(_))
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlState::Enabled(name) => write!(f, "enabled ({name})"),
            ControlState::Disabled(name) => write!(f, "disabled ({name})"),
            ControlState::Unknown => write!(f, "unknown"),
        }
    }
}

/// One pixel whose color tells the state of a control.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ControlProbe {
    pub at: Point,
    pub palette: Vec<Swatch>,
}

/// Result of sampling a control probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReading {
    pub at: Point,
    pub sampled: Option<Color>,
    pub state: ControlState,
}

impl ControlProbe {
    /// First swatch whose color equals `sampled` exactly.
    pub fn classify_color(&self, sampled: Color) -> ControlState {
        match self.palette.iter().find(|s| s.color == sampled) {
            Some(s) if s.enabled => ControlState::Enabled(s.name.clone()),
            Some(s) => ControlState::Disabled(s.name.clone()),
            None => ControlState::Unknown,
        }
    }

    pub fn read(&self, image: Image) -> ControlReading {
        let sampled = image.sample(self.at);
        ControlReading {
            at: self.at,
            sampled,
            state: sampled.map_or(ControlState::Unknown, |c| self.classify_color(c)),
        }
    }

    /// Palette rendered as `name=#RRGGBB` pairs, for logs.
    pub fn expected(&self) -> String {
        self.palette
            .iter()
            .map(|s| format!("{}={}", s.name, s.color))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A pixel that must show one exact color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct PixelProbe {
    pub at: Point,
    pub color: Color,
}

impl PixelProbe {
    pub fn matches(&self, image: Image) -> bool {
        image.sample(self.at) == Some(self.color)
    }
}

/// A highlight color searched for along one column of a region, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ColumnProbe {
    pub region: Rect,
    /// Column within `region`.
    pub column: u32,
    pub color: Color,
}

impl ColumnProbe {
    /// Row (in full-image coordinates) of the lowest pixel with the color.
    pub fn find(&self, image: Image) -> Option<u32> {
        let region = image.region(self.region);
        region
            .find_in_column_up(self.column, |c| c == self.color)
            .map(|y| y + self.region.y)
    }
}
