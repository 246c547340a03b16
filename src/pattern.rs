//! The stitch grid and the primitive edits applied to it.
//!
//! A [`Pattern`] owns a row-major grid of [`Cell`]s. Every mutation is
//! bounds-checked before it touches the grid, so a rejected call leaves the
//! pattern exactly as it was.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{FormatError, PatternError};
use crate::stitch::Stitch;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub stitches: Vec<Stitch>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.stitches.is_empty()
    }

    /// Remove the stitch occupying the same slot, or append this one.
    /// Returns `true` when the stitch was added.
    pub fn toggle(&mut self, stitch: Stitch) -> bool {
        match self.stitches.iter().position(|s| s.same_slot(&stitch)) {
            Some(idx) => {
                self.stitches.remove(idx);
                false
            }
            None => {
                self.stitches.push(stitch);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.stitches.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Reference image drawn under the grid. Never consulted by stitch logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    pub data_url: String,
    pub opacity: f64,
    pub position: Position,
    pub scale: f64,
}

impl BackgroundImage {
    /// Scale an image to fit the canvas, centered, at half opacity.
    pub fn fitted(
        data_url: impl Into<String>,
        image_width: f64,
        image_height: f64,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let scale = if image_width > 0.0 && image_height > 0.0 {
            (canvas_width / image_width).min(canvas_height / image_height)
        } else {
            1.0
        };
        let x = (canvas_width - image_width * scale) / 2.0;
        let y = (canvas_height - image_height * scale) / 2.0;

        Self {
            data_url: data_url.into(),
            opacity: 0.5,
            position: Position { x, y },
            scale,
        }
    }

    pub fn check_finite(&self) -> Result<(), PatternError> {
        let fields = [
            ("opacity", self.opacity),
            ("scale", self.scale),
            ("position.x", self.position.x),
            ("position.y", self.position.y),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(FormatError::Background(format!(
                "`{name}` is {value}, not a finite number"
            ))
            .into()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub width: u32,
    pub height: u32,
    pub grid: Vec<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundImage>,
}

impl Pattern {
    /// An empty grid of `height` rows by `width` columns.
    ///
    /// Zero dimensions are not rejected here; they yield a degenerate pattern
    /// with no cells. Callers validate user input first.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            grid: vec![vec![Cell::default(); width as usize]; height as usize],
            background: None,
        }
    }

    /// The grid matches the declared dimensions.
    pub fn is_consistent(&self) -> bool {
        self.grid.len() == self.height as usize
            && self.grid.iter().all(|row| row.len() == self.width as usize)
    }

    fn checked_index(&self, row: i64, col: i64) -> Result<(usize, usize), PatternError> {
        if !self.is_consistent() {
            return Err(PatternError::InvalidState);
        }
        let in_bounds =
            row >= 0 && row < self.height as i64 && col >= 0 && col < self.width as i64;
        if !in_bounds {
            return Err(PatternError::OutOfBounds {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok((row as usize, col as usize))
    }

    pub fn cell(&self, row: i64, col: i64) -> Result<&Cell, PatternError> {
        let (r, c) = self.checked_index(row, col)?;
        Ok(&self.grid[r][c])
    }

    /// Add the stitch to the cell, or remove the stitch already occupying its
    /// `(stitch_type, orientation)` slot. Returns `true` when it was added.
    pub fn toggle_stitch(
        &mut self,
        row: i64,
        col: i64,
        stitch: Stitch,
    ) -> Result<bool, PatternError> {
        let (r, c) = self.checked_index(row, col)?;
        Ok(self.grid[r][c].toggle(stitch))
    }

    /// Drop every stitch in the cell.
    pub fn erase_cell(&mut self, row: i64, col: i64) -> Result<(), PatternError> {
        let (r, c) = self.checked_index(row, col)?;
        self.grid[r][c].clear();
        Ok(())
    }

    /// Build a new pattern of the requested size, copying every cell that
    /// exists in both. Cells outside the new bounds are dropped without
    /// warning and the background is not carried over.
    pub fn resize(&self, new_width: i64, new_height: i64) -> Result<Pattern, PatternError> {
        let (width, height) = match (u32::try_from(new_width), u32::try_from(new_height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(PatternError::InvalidDimensions {
                    width: new_width,
                    height: new_height,
                })
            }
        };

        let grid = (0..height as usize)
            .map(|y| {
                (0..width as usize)
                    .map(|x| {
                        self.grid
                            .get(y)
                            .and_then(|row| row.get(x))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Ok(Pattern {
            width,
            height,
            grid,
            background: None,
        })
    }

    /// Map a pixel position on the rendered grid to `(row, col)`.
    pub fn cell_at_point(&self, x: f64, y: f64, cell_size: f64) -> Option<(u32, u32)> {
        if cell_size.is_nan() || cell_size <= 0.0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let row = (y / cell_size).floor();
        let col = (x / cell_size).floor();
        if row < 0.0 || col < 0.0 || row >= self.height as f64 || col >= self.width as f64 {
            return None;
        }
        Some((row as u32, col as u32))
    }

    pub fn stitch_count(&self) -> usize {
        self.stitches().count()
    }

    /// Every stitch in row-major order with its `(row, col)`.
    pub fn stitches(&self) -> impl Iterator<Item = (usize, usize, &Stitch)> + '_ {
        self.grid.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .flat_map(move |(c, cell)| cell.stitches.iter().map(move |s| (r, c, s)))
        })
    }

    /// Distinct colors with their stitch counts, in first-seen order.
    pub fn color_usage(&self) -> Vec<(Color, usize)> {
        let mut usage: Vec<(Color, usize)> = Vec::new();
        for (_, _, stitch) in self.stitches() {
            match usage.iter_mut().find(|(color, _)| *color == stitch.color) {
                Some((_, count)) => *count += 1,
                None => usage.push((stitch.color, 1)),
            }
        }
        usage
    }

    pub fn used_colors(&self) -> Vec<Color> {
        self.color_usage().into_iter().map(|(color, _)| color).collect()
    }

    /// Used colors that are not part of the default palette.
    pub fn custom_colors(&self) -> Vec<Color> {
        self.used_colors()
            .into_iter()
            .filter(|color| !color.is_default())
            .collect()
    }
}
