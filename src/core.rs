use crate::{QcError, Result};
use error_stack::ResultExt;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Common metadata for all charts
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotMeta {
    /// Title displayed at the top of the chart
    pub title: Option<String>,
    /// Optional description displayed below the title
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb8(0, 128, 0);
}

/// Qualitative palette used to color one trace per group.
pub const PALETTE: [Color; 10] = [
    Color::rgb8(99, 110, 250),
    Color::rgb8(239, 85, 59),
    Color::rgb8(0, 204, 150),
    Color::rgb8(171, 99, 250),
    Color::rgb8(255, 161, 90),
    Color::rgb8(25, 211, 243),
    Color::rgb8(255, 102, 146),
    Color::rgb8(182, 232, 128),
    Color::rgb8(255, 151, 255),
    Color::rgb8(254, 203, 82),
];

/// Palette color for the `idx`-th trace, cycling when groups outnumber colors.
pub fn palette_color(idx: usize) -> Color {
    PALETTE[idx % PALETTE.len()]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDash {
    #[default]
    Solid,
    Dash,
    Dot,
}

/// Stroke of a reference line
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Color,
    pub dash: LineDash,
    pub width: f32,
}

impl LineStyle {
    pub const fn new(color: Color, dash: LineDash) -> Self {
        Self {
            color,
            dash,
            width: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    #[default]
    Linear,
    Categorical,
}

/// Which axis carries the measured quantity, and so which way limit lines run.
///
/// `Horizontal` lines sit at a constant y, `Vertical` lines at a constant x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Box plot statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    /// Lower whisker: smallest value inside the lower fence
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Upper whisker: largest value inside the upper fence
    pub max: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Five-number summary with 1.5 IQR fences. Non-finite values are ignored.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);

        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let min = sorted
            .iter()
            .copied()
            .find(|&x| x >= lower_fence)
            .unwrap_or(q1);
        let max = sorted
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= upper_fence)
            .unwrap_or(q3);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&x| x < lower_fence || x > upper_fence)
            .collect();

        Some(Self {
            min,
            q1,
            median,
            q3,
            max,
            outliers,
        })
    }
}

// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxTrace {
    /// Legend name; the group key, or empty for an ungrouped chart
    pub name: String,
    /// Position on the categorical axis when grouped
    pub category: Option<String>,
    pub values: Vec<f64>,
    /// `None` when the sample has no finite values
    pub stats: Option<BoxStats>,
    pub color: Color,
}

impl BoxTrace {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        let stats = BoxStats::compute(&values);
        Self {
            name: name.into(),
            category: None,
            values,
            stats,
            color: PALETTE[0],
        }
    }
}

/// Empirical cumulative distribution drawn as a horizontal-then-vertical step line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EcdfTrace {
    pub name: String,
    /// (value, cumulative proportion) pairs sorted by value
    pub points: Vec<DVec2>,
    pub color: Color,
}

impl EcdfTrace {
    pub fn new(name: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let points = sorted
            .iter()
            .enumerate()
            .map(|(i, &x)| DVec2::new(x, (i + 1) as f64 / n))
            .collect();

        Self {
            name: name.into(),
            points,
            color: PALETTE[0],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Trace {
    Box(BoxTrace),
    Ecdf(EcdfTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Box(b) => &b.name,
            Trace::Ecdf(e) => &e.name,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Trace::Box(b) => b.color,
            Trace::Ecdf(e) => e.color,
        }
    }
}

/// Where a reference line's text label sits relative to the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelAnchor {
    /// Above the right end of a horizontal line
    End,
    /// Right of the top of a vertical line, clear of the stroke
    Beside,
}

/// A constant-value line spanning the whole plot area.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefLine {
    pub orientation: Orientation,
    pub value: f64,
    pub style: LineStyle,
    pub label: String,
    pub anchor: LabelAnchor,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Chart {
    pub meta: PlotMeta,
    pub traces: Vec<Trace>,
    /// Reference lines in drawing order
    pub ref_lines: Vec<RefLine>,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal line at `y` with its label at the line end.
    pub fn add_hline(&mut self, y: f64, style: LineStyle, label: impl Into<String>) {
        self.ref_lines.push(RefLine {
            orientation: Orientation::Horizontal,
            value: y,
            style,
            label: label.into(),
            anchor: LabelAnchor::End,
        });
    }

    /// Vertical line at `x` with its label beside the top of the line.
    pub fn add_vline(&mut self, x: f64, style: LineStyle, label: impl Into<String>) {
        self.ref_lines.push(RefLine {
            orientation: Orientation::Vertical,
            value: x,
            style,
            label: label.into(),
            anchor: LabelAnchor::Beside,
        });
    }

    /// Data extent as `(min, max)` over (x, y), reference lines included.
    ///
    /// Box traces occupy x = trace index. Returns `None` when nothing finite
    /// has been plotted.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        let mut any = false;

        let mut include = |axis: usize, v: f64| {
            if v.is_finite() {
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
                any = true;
            }
        };

        for (idx, trace) in self.traces.iter().enumerate() {
            match trace {
                Trace::Box(b) => {
                    if b.stats.is_some() {
                        include(0, idx as f64);
                    }
                    for &v in &b.values {
                        include(1, v);
                    }
                }
                Trace::Ecdf(e) => {
                    for p in &e.points {
                        if p.x.is_finite() && p.y.is_finite() {
                            include(0, p.x);
                            include(1, p.y);
                        }
                    }
                }
            }
        }
        for line in &self.ref_lines {
            match line.orientation {
                Orientation::Horizontal => include(1, line.value),
                Orientation::Vertical => include(0, line.value),
            }
        }

        any.then_some((min, max))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .change_context(QcError::Export)
            .attach("Failed to serialize chart")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .change_context(QcError::Export)
            .attach("Failed to parse chart JSON")
    }
}
