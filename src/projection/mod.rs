//! View projection
//!
//! Shapes aggregation output for display: a y-axis tree flattened under an
//! [`ExpansionState`], and the counts matrix lined up with it. Nothing here
//! mutates the hierarchy or the aggregation.

pub mod axis;
pub mod matrix;

pub use axis::{
    build_y_axis, expand_all, flatten_y_axis, project_y_axis, prune_y_axis, ExpansionState,
    YAxisItem, YAxisRow, LABEL_SEPARATOR,
};
pub use matrix::{
    min_max, non_empty_columns, normalized, project_detail, project_matrix, prune_columns,
    reorder_columns, row_statements, total_statements, DetailRow,
};
