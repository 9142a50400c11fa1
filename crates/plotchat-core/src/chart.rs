//! Chart payloads attached to bot replies
//!
//! The same shape is used for charts returned by the backend (`plotData`)
//! and for the locally generated demo series.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of points in a generated demo series
pub const DEMO_POINTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
        }
    }

    /// Unknown names fall back to a line chart
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            "scatter" => ChartKind::Scatter,
            _ => ChartKind::Line,
        }
    }

    /// Pick a chart kind from free text: "bar" wins over "scatter", anything else is a line.
    pub fn from_prompt(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("bar") {
            ChartKind::Bar
        } else if lower.contains("scatter") {
            ChartKind::Scatter
        } else {
            ChartKind::Line
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line chart",
            ChartKind::Bar => "Bar chart",
            ChartKind::Scatter => "Scatter chart",
        }
    }
}

impl Serialize for ChartKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ChartKind::from_name(&name))
    }
}

/// One record of a chart series.
///
/// Line and scatter charts plot `x`/`y`; bar charts use `name`/`value`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    #[serde(rename = "data", default)]
    pub points: Vec<ChartPoint>,
}

impl ChartPayload {
    pub fn new(kind: ChartKind, points: Vec<ChartPoint>) -> Self {
        Self { kind, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Generate a random sample series for the "plot" demo reply
    pub fn demo(kind: ChartKind) -> Self {
        Self::demo_with_rng(kind, &mut fastrand::Rng::new())
    }

    pub fn demo_with_rng(kind: ChartKind, rng: &mut fastrand::Rng) -> Self {
        let points = (0..DEMO_POINTS)
            .map(|i| ChartPoint {
                x: i as f64,
                y: rng.u32(10..110) as f64,
                name: format!("Point {}", i + 1),
                value: rng.u32(10..110) as f64,
            })
            .collect();

        Self { kind, points }
    }
}
