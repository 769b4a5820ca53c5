use crate::QcError;
use crate::Result;
use crate::chart::ChartKind;
use crate::core::Chart;
use crate::limits::annotate;
use crate::table::{MeasurementTable, SpecTable};
use error_stack::Report;

/// Box or ECDF chart of `column` with its specification limits drawn.
///
/// # Arguments
/// * `data` - Measurement values
/// * `specs` - Limits with rows `LSL`, `Target`, `USL` and a column named like `column`
/// * `column` - Name of the measured quantity to plot
/// * `kind` - `ChartKind::Box` (limits as horizontal lines) or `ChartKind::Ecdf` (vertical)
/// * `group_by` - Optional grouping column, e.g. batch or machine
pub fn plot(
    data: &MeasurementTable,
    specs: &SpecTable,
    column: &str,
    kind: ChartKind,
    group_by: Option<&str>,
) -> Result<Chart> {
    let config = PlotConfig {
        kind,
        group_by: group_by.map(str::to_string),
    };
    plot_with(data, specs, column, &config)
}

/// Same as [`plot`], with the chart kind given by name (`"box"` or `"ecdf"`).
///
/// An unknown name fails with [`QcError::InvalidArgument`] before any table
/// is read.
pub fn plot_by_name(
    data: &MeasurementTable,
    specs: &SpecTable,
    column: &str,
    kind: &str,
    group_by: Option<&str>,
) -> Result<Chart> {
    let kind: ChartKind = kind.parse()?;
    plot(data, specs, column, kind, group_by)
}

pub fn plot_with(
    data: &MeasurementTable,
    specs: &SpecTable,
    column: &str,
    config: &PlotConfig,
) -> Result<Chart> {
    plot_reporting(data, specs, column, config).map(|(chart, _)| chart)
}

fn plot_reporting(
    data: &MeasurementTable,
    specs: &SpecTable,
    column: &str,
    config: &PlotConfig,
) -> Result<(Chart, Vec<Report<QcError>>)> {
    let (mut chart, orientation) = config.kind.build(data, column, config.group_by.as_deref())?;
    let failures = annotate(&mut chart, specs, column, orientation);
    Ok((chart, failures))
}

/// Chart options
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotConfig {
    /// Chart kind (default: box)
    pub kind: ChartKind,
    /// Column whose values split the data into colored groups
    pub group_by: Option<String>,
}

impl PlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }
}

pub fn qc_plot<'a>(
    data: &'a MeasurementTable,
    specs: &'a SpecTable,
    column: &'a str,
) -> QcPlotBuilder<'a> {
    QcPlotBuilder {
        data,
        specs,
        column,
        config: PlotConfig::default(),
    }
}

/// Fluent front end for [`plot_with`].
pub struct QcPlotBuilder<'a> {
    data: &'a MeasurementTable,
    specs: &'a SpecTable,
    column: &'a str,
    config: PlotConfig,
}

impl QcPlotBuilder<'_> {
    pub fn boxplot(mut self) -> Self {
        self.config.kind = ChartKind::Box;
        self
    }

    pub fn ecdf(mut self) -> Self {
        self.config.kind = ChartKind::Ecdf;
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.config = self.config.group_by(column);
        self
    }

    pub fn config(mut self, config: PlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Chart> {
        plot_with(self.data, self.specs, self.column, &self.config)
    }

    /// Build, also returning the limits that could not be drawn.
    pub fn build_reporting(self) -> Result<(Chart, Vec<Report<QcError>>)> {
        plot_reporting(self.data, self.specs, self.column, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Orientation, Trace};

    fn data() -> MeasurementTable {
        MeasurementTable::new()
            .with_numeric("value", [10.0, 12.0, 14.0, 16.0])
            .unwrap()
            .with_column("group", ["A", "A", "B", "B"])
            .unwrap()
    }

    #[test]
    fn config_defaults_to_ungrouped_box() {
        let config = PlotConfig::new();
        assert_eq!(config.kind, ChartKind::Box);
        assert!(config.group_by.is_none());
    }

    #[test]
    fn builder_matches_plot() {
        let specs = SpecTable::from_column("value", [("Target", 13.0)]);
        let built = qc_plot(&data(), &specs, "value")
            .ecdf()
            .group_by("group")
            .build()
            .unwrap();
        let direct = plot(&data(), &specs, "value", ChartKind::Ecdf, Some("group")).unwrap();

        assert_eq!(built.traces.len(), direct.traces.len());
        assert_eq!(built.ref_lines, direct.ref_lines);
        assert_eq!(built.ref_lines[0].orientation, Orientation::Vertical);
    }

    #[test]
    fn builder_reports_failed_limits() {
        let specs = SpecTable::from_column("value", [("LSL", "n/a"), ("USL", "16")]);
        let (chart, failures) = qc_plot(&data(), &specs, "value")
            .config(PlotConfig::new().kind(ChartKind::Box))
            .build_reporting()
            .unwrap();

        assert_eq!(chart.ref_lines.len(), 1);
        assert_eq!(failures.len(), 1);
        assert!(matches!(chart.traces[0], Trace::Box(_)));
    }

    #[test]
    fn invalid_name_fails_before_reading_tables() {
        let err =
            plot_by_name(&data(), &SpecTable::new(), "no-such-column", "pie", None).unwrap_err();
        assert!(matches!(err.current_context(), QcError::InvalidArgument(_)));
    }
}
