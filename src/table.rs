//! In-memory tables addressed by column name.

use crate::{QcError, Result};
use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single table value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Cell {
    /// True for `Missing` and for `NaN` numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(_) => false,
        }
    }

    /// Group-key equality: like `==`, except every missing cell matches
    /// every other missing cell.
    pub fn same_key(&self, other: &Cell) -> bool {
        (self.is_missing() && other.is_missing()) || self == other
    }

    /// Finite numeric value, if the cell holds one. Text is not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

// Missing cells, `NaN` included, render empty.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) if !v.is_nan() => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(_) | Cell::Missing => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Missing, Into::into)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Rows of observations stored column-wise; every column has the same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    columns: Vec<Column>,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column. Fails if its length differs from the
    /// columns already present.
    pub fn with_column<C: Into<Cell>>(
        mut self,
        name: impl Into<String>,
        cells: impl IntoIterator<Item = C>,
    ) -> Result<Self> {
        let name = name.into();
        let cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();

        let others = self.columns.iter().any(|c| c.name != name);
        if others && cells.len() != self.row_count() {
            return Err(Report::new(QcError::ShapeMismatch {
                rows: cells.len(),
                expected: self.row_count(),
                column: name,
            }));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.cells = cells,
            None => self.columns.push(Column { name, cells }),
        }
        Ok(self)
    }

    pub fn with_numeric(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
    ) -> Result<Self> {
        self.with_column(name, values)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Report::new(QcError::UnknownColumn(name.to_string())))
    }

    /// Finite numeric values of a column; text and missing rows are dropped.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.column(name)?.cells.iter().filter_map(Cell::as_f64).collect())
    }

    /// Finite values of `column` split by the cell in `group_by`, groups in
    /// first-appearance order and named by the rendered key.
    ///
    /// Keys compare as cells, so the number `3` and the text `"3"` are two
    /// groups. All missing keys fall into one group named `""`.
    pub fn grouped_numeric(
        &self,
        column: &str,
        group_by: &str,
    ) -> Result<Vec<(String, Vec<f64>)>> {
        let values = &self.column(column)?.cells;
        let keys = &self.column(group_by)?.cells;

        let mut groups: Vec<(&Cell, Vec<f64>)> = Vec::new();
        for (key, cell) in keys.iter().zip(values) {
            let idx = match groups.iter().position(|(k, _)| k.same_key(key)) {
                Some(idx) => idx,
                None => {
                    groups.push((key, Vec::new()));
                    groups.len() - 1
                }
            };
            if let Some(v) = cell.as_f64() {
                groups[idx].1.push(v);
            }
        }
        Ok(groups
            .into_iter()
            .map(|(key, sample)| (key.to_string(), sample))
            .collect())
    }
}

/// Specification limits: rows are limit names (`LSL`, `Target`, `USL`),
/// columns are measured-quantity names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecTable {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<(usize, usize, Cell)>,
}

impl SpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding a single measured-quantity column.
    pub fn from_column<R, C>(
        column: impl Into<String>,
        rows: impl IntoIterator<Item = (R, C)>,
    ) -> Self
    where
        R: Into<String>,
        C: Into<Cell>,
    {
        let column = column.into();
        let mut table = Self::new();
        table.add_column(column.clone());
        for (row, cell) in rows {
            table.set(row, column.clone(), cell);
        }
        table
    }

    /// Declare a column with no values yet.
    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn set(
        &mut self,
        row: impl Into<String>,
        column: impl Into<String>,
        cell: impl Into<Cell>,
    ) {
        let (row, column) = (row.into(), column.into());
        let r = match self.rows.iter().position(|x| *x == row) {
            Some(r) => r,
            None => {
                self.rows.push(row);
                self.rows.len() - 1
            }
        };
        self.add_column(column.clone());
        let c = self.columns.iter().position(|x| *x == column).unwrap_or_default();
        let cell = cell.into();

        match self.values.iter_mut().find(|(vr, vc, _)| *vr == r && *vc == c) {
            Some(slot) => slot.2 = cell,
            None => self.values.push((r, c, cell)),
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn has_row(&self, row: &str) -> bool {
        self.rows.iter().any(|r| r == row)
    }

    /// Value at (row, column). Unset cells of a known row and column read as
    /// `Missing`; an unknown row or column yields `None`.
    pub fn get(&self, row: &str, column: &str) -> Option<&Cell> {
        static MISSING: Cell = Cell::Missing;

        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(
            self.values
                .iter()
                .find(|(vr, vc, _)| *vr == r && *vc == c)
                .map_or(&MISSING, |(_, _, cell)| cell),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_column_is_lookup_error() {
        let table = MeasurementTable::new().with_numeric("value", [1.0]).unwrap();
        let err = table.numeric("width").unwrap_err();
        assert_eq!(
            err.current_context(),
            &QcError::UnknownColumn("width".to_string())
        );
    }

    #[test]
    fn mismatched_column_length_rejected() {
        let err = MeasurementTable::new()
            .with_numeric("value", [1.0, 2.0])
            .unwrap()
            .with_column("group", ["A"])
            .unwrap_err();
        assert_eq!(
            err.current_context(),
            &QcError::ShapeMismatch {
                column: "group".to_string(),
                rows: 1,
                expected: 2,
            }
        );
    }

    #[test]
    fn numeric_drops_text_and_missing() {
        let table = MeasurementTable::new()
            .with_column(
                "value",
                [Cell::from(1.0), Cell::from("bad"), Cell::Missing, Cell::from(f64::NAN)],
            )
            .unwrap();
        assert_eq!(table.numeric("value").unwrap(), vec![1.0]);
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let table = MeasurementTable::new()
            .with_numeric("value", [1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_column("batch", ["B", "A", "B", "C"])
            .unwrap();

        let groups = table.grouped_numeric("value", "batch").unwrap();
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        assert_eq!(groups[0].1, vec![1.0, 3.0]);
    }

    #[test]
    fn replacing_the_only_column_may_change_length() {
        let table = MeasurementTable::new()
            .with_numeric("value", [1.0, 2.0])
            .unwrap()
            .with_numeric("value", [1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn number_and_text_keys_are_distinct_groups() {
        let table = MeasurementTable::new()
            .with_numeric("value", [1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_column(
                "machine",
                [Cell::from(3_i64), Cell::from("3"), Cell::from(3_i64), Cell::from("3")],
            )
            .unwrap();

        let groups = table.grouped_numeric("value", "machine").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("3".to_string(), vec![1.0, 3.0]));
        assert_eq!(groups[1], ("3".to_string(), vec![2.0, 4.0]));
    }

    #[test]
    fn missing_keys_share_one_group() {
        let table = MeasurementTable::new()
            .with_numeric("value", [1.0, 2.0, 3.0])
            .unwrap()
            .with_column("machine", [Cell::from(f64::NAN), Cell::Missing, Cell::from(7_i64)])
            .unwrap();

        let groups = table.grouped_numeric("value", "machine").unwrap();
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["", "7"]);
        assert_eq!(groups[0].1, vec![1.0, 2.0]);
    }

    #[test]
    fn spec_lookup_distinguishes_unknown_and_unset() {
        let mut specs = SpecTable::from_column("value", [("LSL", 12.0)]);
        specs.set("USL", "width", 4.0);

        assert_eq!(specs.get("LSL", "value"), Some(&Cell::Number(12.0)));
        assert_eq!(specs.get("USL", "value"), Some(&Cell::Missing));
        assert_eq!(specs.get("Target", "value"), None);
        assert_eq!(specs.get("LSL", "height"), None);
        assert!(specs.has_column("width"));
        assert!(specs.has_row("USL"));
        assert!(!SpecTable::new().has_row("LSL"));
    }
}
