//! The `project.json` document format.
//!
//! Loading runs in two passes over a parsed [`serde_json::Value`]. The shape
//! pass checks structure in a fixed order (object, dimensions, grid, rows,
//! cells, stitches) and reports the first rule broken. The typed pass then
//! rejects values the model cannot hold: unknown stitch types, orientations
//! outside 0..=3, color channels outside 0..=255 and non-numeric background
//! settings. Per-kind orientation rules belong to the editing tools, so any
//! pattern the model can build loads back unchanged.

use serde_json::{Map, Value};

use crate::color::Color;
use crate::error::{FormatError, PatternError};
use crate::pattern::{BackgroundImage, Cell, Pattern, Position};
use crate::stitch::{Orientation, Stitch, StitchKind};

/// Pretty JSON, two-space indented. `background` is omitted when absent.
///
/// A background with a non-finite number is refused, since JSON would write
/// it as `null` and the document could not be read back.
pub fn serialize_pattern(pattern: &Pattern) -> Result<Vec<u8>, PatternError> {
    if let Some(background) = &pattern.background {
        background.check_finite()?;
    }
    let bytes = serde_json::to_vec_pretty(pattern)?;
    log::debug!(
        "Serialized {}x{} pattern ({} stitches, {} bytes)",
        pattern.width,
        pattern.height,
        pattern.stitch_count(),
        bytes.len()
    );
    Ok(bytes)
}

pub fn deserialize_pattern(bytes: &[u8]) -> Result<Pattern, PatternError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| FormatError::Syntax(err.to_string()))?;
    validate_shape(&value)?;
    let pattern = interpret(&value)?;
    log::debug!(
        "Loaded {}x{} pattern with {} stitches",
        pattern.width,
        pattern.height,
        pattern.stitch_count()
    );
    Ok(pattern)
}

/// Structural checks only. Ranges and stitch-type names are left to the
/// typed pass.
pub fn validate_shape(value: &Value) -> Result<(), FormatError> {
    let root = value.as_object().ok_or(FormatError::NotAnObject)?;

    let width = integer_field(root, "width")?;
    let height = integer_field(root, "height")?;

    let rows = root
        .get("grid")
        .and_then(Value::as_array)
        .ok_or(FormatError::GridNotArray)?;
    if height < 0 || rows.len() as i64 != height {
        return Err(FormatError::RowCount {
            expected: height.max(0) as usize,
            actual: rows.len(),
        });
    }

    let expected = width.max(0) as usize;
    for (row_idx, row) in rows.iter().enumerate() {
        let cells = row
            .as_array()
            .filter(|cells| width >= 0 && cells.len() == expected)
            .ok_or(FormatError::RowShape {
                row: row_idx,
                expected,
            })?;

        for (col_idx, cell) in cells.iter().enumerate() {
            let stitches = cell
                .as_object()
                .and_then(|cell| cell.get("stitches"))
                .and_then(Value::as_array)
                .ok_or(FormatError::CellShape {
                    row: row_idx,
                    col: col_idx,
                })?;

            for (index, stitch) in stitches.iter().enumerate() {
                check_stitch_shape(stitch).map_err(|reason| FormatError::StitchShape {
                    row: row_idx,
                    col: col_idx,
                    index,
                    reason: reason.to_string(),
                })?;
            }
        }
    }

    Ok(())
}

fn integer_field(root: &Map<String, Value>, field: &'static str) -> Result<i64, FormatError> {
    root.get(field)
        .and_then(as_integer)
        .ok_or(FormatError::MissingDimension { field })
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    if value.is_u64() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

fn check_stitch_shape(stitch: &Value) -> Result<(), &'static str> {
    let stitch = stitch.as_object().ok_or("must be an object")?;

    let color = stitch
        .get("color")
        .and_then(Value::as_object)
        .ok_or("`color` must be an object")?;
    for channel in ["r", "g", "b", "a"] {
        if !color.get(channel).is_some_and(Value::is_number) {
            return Err("`color` needs numeric r, g, b and a");
        }
    }

    if !stitch.get("stitchType").is_some_and(Value::is_string) {
        return Err("`stitchType` must be a string");
    }
    if !stitch.get("orientation").is_some_and(Value::is_number) {
        return Err("`orientation` must be a number");
    }
    Ok(())
}

fn interpret(value: &Value) -> Result<Pattern, FormatError> {
    // Shape already checked; the lookups below cannot miss.
    let root = value.as_object().ok_or(FormatError::NotAnObject)?;
    let width = dimension(root, "width")?;
    let height = dimension(root, "height")?;

    let rows = root
        .get("grid")
        .and_then(Value::as_array)
        .ok_or(FormatError::GridNotArray)?;

    let mut grid = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or(FormatError::RowShape {
            row: row_idx,
            expected: width as usize,
        })?;
        let mut out_row = Vec::with_capacity(cells.len());
        for (col_idx, cell) in cells.iter().enumerate() {
            let stitches = cell
                .get("stitches")
                .and_then(Value::as_array)
                .ok_or(FormatError::CellShape {
                    row: row_idx,
                    col: col_idx,
                })?;
            let stitches = stitches
                .iter()
                .enumerate()
                .map(|(index, stitch)| {
                    typed_stitch(stitch).map_err(|reason| FormatError::StitchShape {
                        row: row_idx,
                        col: col_idx,
                        index,
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            out_row.push(Cell { stitches });
        }
        grid.push(out_row);
    }

    let background = match root.get("background") {
        None | Some(Value::Null) => None,
        Some(bg) => Some(typed_background(bg).map_err(FormatError::Background)?),
    };

    Ok(Pattern {
        width,
        height,
        grid,
        background,
    })
}

fn dimension(root: &Map<String, Value>, field: &'static str) -> Result<u32, FormatError> {
    let value = integer_field(root, field)?;
    u32::try_from(value).map_err(|_| FormatError::DimensionRange { field })
}

fn typed_stitch(stitch: &Value) -> Result<Stitch, String> {
    let channel = |name: &str| -> Result<u8, String> {
        stitch["color"]
            .get(name)
            .and_then(as_integer)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| format!("color channel `{name}` must be an integer in 0..=255"))
    };
    let color = Color::new(channel("r")?, channel("g")?, channel("b")?, channel("a")?);

    let name = stitch["stitchType"].as_str().unwrap_or_default();
    let stitch_type = StitchKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == name)
        .ok_or_else(|| format!("unknown stitch type `{name}`"))?;

    let orientation = as_integer(&stitch["orientation"])
        .and_then(|v| u8::try_from(v).ok())
        .and_then(Orientation::new)
        .ok_or_else(|| {
            format!(
                "orientation {} must be an integer in 0..=3",
                stitch["orientation"]
            )
        })?;

    Ok(Stitch::new(color, stitch_type, orientation))
}

fn typed_background(bg: &Value) -> Result<BackgroundImage, String> {
    let bg = bg.as_object().ok_or("must be an object")?;
    let number = |value: Option<&Value>, what: &str| {
        value
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("`{what}` must be a number"))
    };

    let data_url = bg
        .get("dataUrl")
        .and_then(Value::as_str)
        .ok_or("`dataUrl` must be a string")?
        .to_string();
    let opacity = number(bg.get("opacity"), "opacity")?;
    let scale = number(bg.get("scale"), "scale")?;
    let position = bg
        .get("position")
        .and_then(Value::as_object)
        .ok_or("`position` must be an object")?;
    let x = number(position.get("x"), "position.x")?;
    let y = number(position.get("y"), "position.y")?;

    Ok(BackgroundImage {
        data_url,
        opacity,
        position: Position { x, y },
        scale,
    })
}
