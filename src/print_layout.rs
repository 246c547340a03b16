//! Lays the grid out on physical pages, in millimeters.
//!
//! Patterns wider than they are tall can be turned a quarter turn so that
//! the long side runs down the sheet. Rows that do not fit on one page
//! continue on the next.

use crate::config::PrintConfig;
use crate::error::PatternError;

#[derive(Debug, Clone, PartialEq)]
pub struct PrintLayout {
    pub rotated: bool,
    /// Columns and rows as printed, after any rotation.
    pub columns: u32,
    pub rows: u32,
    pub cell_mm: f32,
    pub grid_width_mm: f32,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Top-left corner of the grid on every page.
    pub origin_x_mm: f32,
    pub origin_y_mm: f32,
    pub rows_per_page: u32,
    pub page_count: u32,
    pattern_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: u32,
    /// Offsets from the grid origin on that page.
    pub top_mm: f32,
    pub left_mm: f32,
    /// Extra clockwise glyph rotation in degrees.
    pub rotation_deg: u32,
}

impl PrintLayout {
    pub fn new(width: u32, height: u32, config: &PrintConfig) -> Result<Self, PatternError> {
        if width == 0 || height == 0 {
            return Err(PatternError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }

        let rotated = config.rotate_wide_patterns && width > height;
        let (columns, rows) = if rotated {
            (height, width)
        } else {
            (width, height)
        };

        let (portrait_w, portrait_h) = config.page_size.dimensions_mm();
        let (page_width_mm, page_height_mm) = if rotated {
            (portrait_h, portrait_w)
        } else {
            (portrait_w, portrait_h)
        };
        let inset = config.margin_mm + config.padding_mm;
        let printable_w = (page_width_mm - 2.0 * inset).max(1.0);
        let printable_h = (page_height_mm - 2.0 * inset).max(1.0);

        let grid_width_mm = (columns as f32 * config.max_cell_size_mm)
            .min(config.max_width_mm)
            .min(printable_w);
        let cell_mm = grid_width_mm / columns as f32;

        let rows_per_page = ((printable_h / cell_mm).floor() as u32).clamp(1, rows);
        let page_count = rows.div_ceil(rows_per_page);

        Ok(Self {
            rotated,
            columns,
            rows,
            cell_mm,
            grid_width_mm,
            page_width_mm,
            page_height_mm,
            origin_x_mm: inset + (printable_w - grid_width_mm) * 0.5,
            origin_y_mm: inset,
            rows_per_page,
            page_count,
            pattern_height: height,
        })
    }

    /// Where the pattern cell `(row, col)` lands.
    pub fn place(&self, row: u32, col: u32) -> Placement {
        let (print_row, print_col, rotation_deg) = if self.rotated {
            (col, self.pattern_height - row - 1, 90)
        } else {
            (row, col, 0)
        };

        Placement {
            page: print_row / self.rows_per_page,
            top_mm: (print_row % self.rows_per_page) as f32 * self.cell_mm,
            left_mm: print_col as f32 * self.cell_mm,
            rotation_deg,
        }
    }

    /// Printed rows on `page`.
    pub fn rows_on_page(&self, page: u32) -> u32 {
        let first = page * self.rows_per_page;
        self.rows.saturating_sub(first).min(self.rows_per_page)
    }
}
