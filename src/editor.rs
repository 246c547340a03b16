//! Editing session: the live pattern plus the tool the user has selected.

use crate::color::Color;
use crate::error::PatternError;
use crate::pattern::{BackgroundImage, Pattern};
use crate::stitch::{validate_orientation, OrientationTable, Stitch, StitchKind};

/// What a click on a cell does.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolState {
    pub color: Color,
    pub stitch_type: StitchKind,
    /// Kept as typed text; validated each time the tool is applied.
    pub orientation: String,
    pub eraser: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            color: Color::default(),
            stitch_type: StitchKind::Full,
            orientation: "0".to_string(),
            eraser: false,
        }
    }
}

impl ToolState {
    pub fn stitch(&self, table: &OrientationTable) -> Result<Stitch, PatternError> {
        let orientation = validate_orientation(&self.orientation, self.stitch_type, table)?;
        Ok(Stitch::new(self.color, self.stitch_type, orientation))
    }
}

/// Apply `tool` to one cell. The eraser empties the cell; any other tool
/// toggles the selected stitch.
pub fn apply_tool(
    pattern: &mut Pattern,
    tool: &ToolState,
    table: &OrientationTable,
    row: i64,
    col: i64,
) -> Result<(), PatternError> {
    if tool.eraser {
        return pattern.erase_cell(row, col);
    }
    let stitch = tool.stitch(table)?;
    pattern.toggle_stitch(row, col, stitch).map(|_| ())
}

pub struct Editor {
    pattern: Pattern,
    pub tool: ToolState,
    pub table: OrientationTable,
    pub cell_size: f64,
    custom_colors: Vec<Color>,
    drag: Option<(u32, u32)>,
}

impl Editor {
    pub fn new(pattern: Pattern, cell_size: f64) -> Self {
        let custom_colors = pattern.custom_colors();
        Self {
            pattern,
            tool: ToolState::default(),
            table: OrientationTable::default(),
            cell_size,
            custom_colors,
            drag: None,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn custom_colors(&self) -> &[Color] {
        &self.custom_colors
    }

    /// Owned copy for saving; later edits do not reach it.
    pub fn snapshot(&self) -> Pattern {
        self.pattern.clone()
    }

    pub fn add_custom_color(&mut self, color: Color) {
        if !color.is_default() && !self.custom_colors.contains(&color) {
            self.custom_colors.push(color);
        }
    }

    pub fn apply_at(&mut self, row: i64, col: i64) -> Result<(), PatternError> {
        apply_tool(&mut self.pattern, &self.tool, &self.table, row, col)?;
        if !self.tool.eraser {
            self.add_custom_color(self.tool.color);
        }
        Ok(())
    }

    /// Start a stroke. Returns the cell that was hit, if any.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<Option<(u32, u32)>, PatternError> {
        let Some((row, col)) = self.pattern.cell_at_point(x, y, self.cell_size) else {
            return Ok(None);
        };
        self.drag = Some((row, col));
        self.apply_at(row as i64, col as i64)?;
        Ok(Some((row, col)))
    }

    /// Continue a stroke. The tool fires once per newly entered cell.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<Option<(u32, u32)>, PatternError> {
        if self.drag.is_none() {
            return Ok(None);
        }
        let Some(cell) = self.pattern.cell_at_point(x, y, self.cell_size) else {
            return Ok(None);
        };
        if self.drag == Some(cell) {
            return Ok(None);
        }
        self.drag = Some(cell);
        self.apply_at(cell.0 as i64, cell.1 as i64)?;
        Ok(Some(cell))
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Resize the live pattern, keeping its background.
    pub fn resize(&mut self, width: i64, height: i64) -> Result<(), PatternError> {
        let mut resized = self.pattern.resize(width, height)?;
        resized.background = self.pattern.background.clone();
        log::info!(
            "Resized pattern {}x{} -> {}x{}",
            self.pattern.width,
            self.pattern.height,
            resized.width,
            resized.height
        );
        self.pattern = resized;
        self.drag = None;
        Ok(())
    }

    /// Swap in a freshly loaded pattern.
    pub fn replace_pattern(&mut self, pattern: Pattern) {
        self.custom_colors = pattern.custom_colors();
        self.pattern = pattern;
        self.drag = None;
    }

    /// Rejects a background that could not be saved.
    pub fn set_background(
        &mut self,
        background: Option<BackgroundImage>,
    ) -> Result<(), PatternError> {
        if let Some(background) = &background {
            background.check_finite()?;
        }
        self.pattern.background = background;
        Ok(())
    }
}
