//! Box and ECDF charts of engineering measurements with automatically drawn
//! specification-limit lines (LSL, Target, USL).
//!
//! ```
//! use qc_charts::prelude::*;
//!
//! let data = MeasurementTable::new()
//!     .with_numeric("value", [10.0, 12.5, 14.0, 15.5, 17.0])
//!     .unwrap();
//! let specs = SpecTable::from_column("value", [("LSL", 12.0), ("Target", 15.0), ("USL", 18.0)]);
//!
//! let chart = plot(&data, &specs, "value", ChartKind::Box, None).unwrap();
//! assert_eq!(chart.ref_lines.len(), 3);
//! ```

pub mod chart;
pub mod core;
pub mod limits;
pub mod plot;
pub mod table;

use crate::limits::LimitKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QcError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column '{column}' has {rows} rows, table has {expected}")]
    ShapeMismatch {
        column: String,
        rows: usize,
        expected: usize,
    },

    #[error("Could not draw {kind}: {reason}")]
    LimitDraw { kind: LimitKind, reason: String },

    #[error("Chart export failed")]
    Export,
}

pub type Result<T> = std::result::Result<T, error_stack::Report<QcError>>;

pub mod prelude {
    pub use crate::QcError;
    pub use crate::chart::*;
    pub use crate::core::*;
    pub use crate::limits::*;
    pub use crate::plot::*;
    pub use crate::table::*;
}
