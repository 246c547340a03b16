//! Error types shared by the pattern model, the file format and the print path.

use thiserror::Error;

use crate::stitch::StitchKind;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Invalid project: nil project or grid")]
    InvalidState,

    #[error("Coordinates out of bounds: [{row},{col}] (grid size: {width}x{height})")]
    OutOfBounds {
        row: i64,
        col: i64,
        width: u32,
        height: u32,
    },

    #[error("Invalid orientation {orientation} for stitch type {stitch_type}: must be between 0 and {max_orientation}")]
    InvalidOrientation {
        orientation: String,
        stitch_type: StitchKind,
        max_orientation: usize,
    },

    #[error("Invalid dimensions: width and height must be positive (got {width}x{height})")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Invalid project file format: {0}")]
    InvalidFormat(#[from] FormatError),

    #[error("No file selected")]
    NoFileSelected,

    #[error("Invalid hex color: {value}")]
    InvalidColor { value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The first rule a loaded document broke.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("not valid JSON ({0})")]
    Syntax(String),

    #[error("top-level value must be an object")]
    NotAnObject,

    #[error("`{field}` must be an integer")]
    MissingDimension { field: &'static str },

    #[error("`{field}` must be a non-negative 32-bit integer")]
    DimensionRange { field: &'static str },

    #[error("`grid` must be an array")]
    GridNotArray,

    #[error("`grid` has {actual} rows, expected {expected}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} must be an array of {expected} cells")]
    RowShape { row: usize, expected: usize },

    #[error("cell [{row},{col}] must be an object with a `stitches` array")]
    CellShape { row: usize, col: usize },

    #[error("stitch {index} in cell [{row},{col}]: {reason}")]
    StitchShape {
        row: usize,
        col: usize,
        index: usize,
        reason: String,
    },

    #[error("background: {0}")]
    Background(String),
}
