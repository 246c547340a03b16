pub mod cli;
pub mod color;
pub mod config;
pub mod document;
pub mod editor;
mod error;
pub mod glyph;
pub mod pattern;
pub mod pdf_export;
pub mod print_layout;
pub mod project_io;
pub mod stitch;

pub use color::{Color, DEFAULT_COLORS};
pub use config::{EditorConfig, PageSize, PrintConfig};
pub use document::{deserialize_pattern, serialize_pattern};
pub use editor::{apply_tool, Editor, ToolState};
pub use error::{FormatError, PatternError};
pub use pattern::{BackgroundImage, Cell, Pattern, Position};
pub use pdf_export::export_pattern_pdf;
pub use print_layout::{Placement, PrintLayout};
pub use stitch::{
    validate_orientation, Orientation, OrientationTable, Stitch, StitchKind, ORIENTATION_OPTIONS,
};

/// Entry point of the `stitchpad` binary.
pub fn run() {
    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
