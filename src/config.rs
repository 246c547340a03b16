use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PatternError;
use crate::project_io::DEFAULT_FILE_NAME;

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Portrait `(width, height)` in millimeters.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrintConfig {
    pub title: String,
    pub page_size: PageSize,
    /// Cells never print larger than this, so small patterns stay compact.
    pub max_cell_size_mm: f32,
    pub max_width_mm: f32,
    pub margin_mm: f32,
    pub padding_mm: f32,
    /// Turn landscape patterns a quarter turn to fill a portrait sheet.
    pub rotate_wide_patterns: bool,
    pub include_legend: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            title: "Cross Stitch Pattern".to_string(),
            page_size: PageSize::A4,
            max_cell_size_mm: 4.0,
            max_width_mm: 180.0,
            margin_mm: 15.0,
            padding_mm: 2.0,
            rotate_wide_patterns: true,
            include_legend: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub default_grid_size: u32,
    /// Rendered cell edge in pixels, used for pointer mapping.
    pub default_cell_size: u32,
    pub default_file_name: String,
    pub log_level: String,
    pub print: PrintConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_grid_size: 20,
            default_cell_size: 30,
            default_file_name: DEFAULT_FILE_NAME.to_string(),
            log_level: "info".to_string(),
            print: PrintConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str::<EditorConfig>(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, PatternError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
