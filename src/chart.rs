//! Chart construction: one closed set of chart kinds, each with its own
//! builder and the orientation its limit lines take.

use crate::core::{
    BoxTrace, Chart, EcdfTrace, Orientation, PlotMeta, Scale, Trace, palette_color,
};
use crate::table::MeasurementTable;
use crate::{QcError, Result};
use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    /// Box summary per group; measured value on the y axis
    #[default]
    Box,
    /// Empirical cumulative distribution; measured value on the x axis
    Ecdf,
}

impl ChartKind {
    pub const ALL: [ChartKind; 2] = [ChartKind::Box, ChartKind::Ecdf];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Box => "box",
            ChartKind::Ecdf => "ecdf",
        }
    }

    /// Orientation of limit lines on this kind of chart.
    pub fn orientation(self) -> Orientation {
        match self {
            ChartKind::Box => Orientation::Horizontal,
            ChartKind::Ecdf => Orientation::Vertical,
        }
    }

    /// Build the base chart of `column`, optionally split by `group_by`.
    pub fn build(
        self,
        data: &MeasurementTable,
        column: &str,
        group_by: Option<&str>,
    ) -> Result<(Chart, Orientation)> {
        let chart = match self {
            ChartKind::Box => build_box(data, column, group_by)?,
            ChartKind::Ecdf => build_ecdf(data, column, group_by)?,
        };
        debug!(
            kind = self.as_str(),
            column,
            traces = chart.traces.len(),
            "built base chart"
        );
        Ok((chart, self.orientation()))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = Report<QcError>;

    fn from_str(s: &str) -> Result<Self> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                Report::new(QcError::InvalidArgument(
                    "plot kind must be 'box' or 'ecdf'".to_string(),
                ))
                .attach(format!("Got: {s:?}"))
            })
    }
}

// Group key and its finite sample, or one unnamed group when ungrouped.
fn samples(
    data: &MeasurementTable,
    column: &str,
    group_by: Option<&str>,
) -> Result<Vec<(String, Vec<f64>)>> {
    match group_by {
        Some(group) => data.grouped_numeric(column, group),
        None => Ok(vec![(String::new(), data.numeric(column)?)]),
    }
}

fn build_box(data: &MeasurementTable, column: &str, group_by: Option<&str>) -> Result<Chart> {
    let mut chart = Chart {
        meta: PlotMeta {
            title: Some(format!("Boxplot: {column}")),
            description: None,
        },
        y_label: Some(column.to_string()),
        x_label: group_by.map(str::to_string),
        x_scale: if group_by.is_some() {
            Scale::Categorical
        } else {
            Scale::Linear
        },
        ..Chart::default()
    };

    for (idx, (key, values)) in samples(data, column, group_by)?.into_iter().enumerate() {
        let mut trace = BoxTrace::new(key.clone(), values);
        trace.color = palette_color(idx);
        if group_by.is_some() {
            trace.category = Some(key);
        }
        chart.traces.push(Trace::Box(trace));
    }
    Ok(chart)
}

fn build_ecdf(data: &MeasurementTable, column: &str, group_by: Option<&str>) -> Result<Chart> {
    let mut chart = Chart {
        meta: PlotMeta {
            title: Some(format!("Cumulative Frequency: {column}")),
            description: None,
        },
        x_label: Some(column.to_string()),
        y_label: Some("probability".to_string()),
        ..Chart::default()
    };

    for (idx, (key, values)) in samples(data, column, group_by)?.into_iter().enumerate() {
        let mut trace = EcdfTrace::new(key, &values);
        trace.color = palette_color(idx);
        chart.traces.push(Trace::Ecdf(trace));
    }
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> MeasurementTable {
        MeasurementTable::new()
            .with_numeric("value", [10.0, 11.0, 12.0, 13.0, 14.0, 15.0])
            .unwrap()
            .with_column("line", ["L1", "L2", "L1", "L3", "L2", "L1"])
            .unwrap()
    }

    #[test]
    fn parse_kinds() {
        assert_eq!("box".parse::<ChartKind>().unwrap(), ChartKind::Box);
        assert_eq!("ecdf".parse::<ChartKind>().unwrap(), ChartKind::Ecdf);
        assert_eq!(ChartKind::default(), ChartKind::Box);
    }

    #[test]
    fn unknown_kind_names_allowed_values() {
        let err = "violin".parse::<ChartKind>().unwrap_err();
        match err.current_context() {
            QcError::InvalidArgument(msg) => {
                assert!(msg.contains("'box'"));
                assert!(msg.contains("'ecdf'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn box_groups_on_categorical_axis() {
        let (chart, orientation) = ChartKind::Box.build(&data(), "value", Some("line")).unwrap();
        assert_eq!(orientation, Orientation::Horizontal);
        assert_eq!(chart.x_scale, Scale::Categorical);
        assert_eq!(chart.x_label.as_deref(), Some("line"));
        assert_eq!(chart.meta.title.as_deref(), Some("Boxplot: value"));

        let names: Vec<&str> = chart.traces.iter().map(Trace::name).collect();
        assert_eq!(names, vec!["L1", "L2", "L3"]);
        assert_ne!(chart.traces[0].color(), chart.traces[1].color());
    }

    #[test]
    fn ungrouped_box_is_single_trace() {
        let (chart, _) = ChartKind::Box.build(&data(), "value", None).unwrap();
        assert_eq!(chart.traces.len(), 1);
        assert_eq!(chart.x_scale, Scale::Linear);
        let Trace::Box(b) = &chart.traces[0] else {
            panic!("expected box trace");
        };
        assert!(b.category.is_none());
        assert_eq!(b.stats.as_ref().unwrap().median, 12.5);
    }

    #[test]
    fn ecdf_colors_by_group_without_category_axis() {
        let (chart, orientation) = ChartKind::Ecdf.build(&data(), "value", Some("line")).unwrap();
        assert_eq!(orientation, Orientation::Vertical);
        assert_eq!(chart.x_scale, Scale::Linear);
        assert_eq!(chart.x_label.as_deref(), Some("value"));
        assert_eq!(chart.traces.len(), 3);
        assert!(chart.traces.iter().all(|t| matches!(t, Trace::Ecdf(_))));
    }

    #[test]
    fn unknown_measurement_column_surfaces_table_error() {
        let err = ChartKind::Box.build(&data(), "width", None).unwrap_err();
        assert_eq!(
            err.current_context(),
            &QcError::UnknownColumn("width".to_string())
        );
    }
}
