//! Specification-limit reference lines.

use crate::core::{Chart, Color, LineDash, LineStyle, Orientation};
use crate::table::{Cell, SpecTable};
use crate::QcError;
use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitKind {
    Lsl,
    Target,
    Usl,
}

impl LimitKind {
    /// Row label of this limit in a [`SpecTable`].
    pub fn label(self) -> &'static str {
        match self {
            LimitKind::Lsl => "LSL",
            LimitKind::Target => "Target",
            LimitKind::Usl => "USL",
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Limits in drawing order with their fixed stroke.
pub const LIMIT_LINES: [(LimitKind, LineStyle); 3] = [
    (LimitKind::Lsl, LineStyle::new(Color::RED, LineDash::Dash)),
    (LimitKind::Target, LineStyle::new(Color::GREEN, LineDash::Dot)),
    (LimitKind::Usl, LineStyle::new(Color::RED, LineDash::Dash)),
];

/// Draw the LSL, Target and USL lines for `column` onto `chart`.
///
/// Limits that are absent or missing are skipped silently. A value that
/// cannot be read as a finite number is skipped too, logged, and returned
/// as a [`QcError::LimitDraw`] report; the remaining limits still draw.
pub fn annotate(
    chart: &mut Chart,
    specs: &SpecTable,
    column: &str,
    orientation: Orientation,
) -> Vec<Report<QcError>> {
    let mut failures = Vec::new();
    if !specs.has_column(column) {
        return failures;
    }

    for (kind, style) in LIMIT_LINES {
        if !specs.has_row(kind.label()) {
            continue;
        }
        let Some(cell) = specs.get(kind.label(), column) else {
            continue;
        };

        let value = match limit_value(kind, cell) {
            Ok(Some(value)) => value,
            Ok(None) => continue,
            Err(report) => {
                warn!("Could not draw {kind}: {report:?}");
                failures.push(report);
                continue;
            }
        };

        let label = format!("{kind}: {value}");
        match orientation {
            Orientation::Horizontal => chart.add_hline(value, style, label),
            Orientation::Vertical => chart.add_vline(value, style, label),
        }
        debug!(limit = kind.label(), value, ?orientation, "drew limit line");
    }
    failures
}

// `Ok(None)` for a missing value; `Err` for one that is present but unusable.
// Blank text and text spelling NaN count as missing.
fn limit_value(kind: LimitKind, cell: &Cell) -> Result<Option<f64>, Report<QcError>> {
    if cell.is_missing() {
        return Ok(None);
    }

    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Text(s) if s.trim().is_empty() => return Ok(None),
        Cell::Text(s) => s.trim().parse::<f64>().map_err(|e| {
            Report::new(QcError::LimitDraw {
                kind,
                reason: format!("{s:?} is not a number"),
            })
            .attach(e.to_string())
        })?,
        Cell::Missing => return Ok(None),
    };

    if value.is_nan() {
        return Ok(None);
    }
    if !value.is_finite() {
        return Err(Report::new(QcError::LimitDraw {
            kind,
            reason: format!("{value} is not a finite value"),
        }));
    }
    Ok(Some(value))
}
