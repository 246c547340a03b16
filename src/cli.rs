//! Command-line front end over the editing session.

use anyhow::Context;
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::config::{EditorConfig, PageSize};
use crate::editor::Editor;
use crate::pattern::Pattern;
use crate::pdf_export::export_pattern_pdf;
use crate::project_io::{
    load_pattern, load_pattern_with_dialog, pick_open_path, save_pattern, save_pattern_with_dialog,
    write_atomic,
};
use crate::stitch::StitchKind;

#[derive(Parser, Debug)]
#[command(name = "stitchpad", version, about = "Cross-stitch pattern designer")]
pub struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `stitchpad_lib=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty pattern
    New {
        path: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Toggle one stitch (or erase a cell) and save
    Stitch {
        path: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        row: i64,
        #[arg(long, allow_negative_numbers = true)]
        col: i64,
        /// `#RRGGBB` or `#RRGGBBAA`
        #[arg(long, default_value = "#000000")]
        color: String,
        #[arg(long, default_value = "Full")]
        kind: StitchKind,
        #[arg(long, default_value = "0")]
        orientation: String,
        #[arg(long)]
        erase: bool,
    },
    /// Resize the grid, dropping cells outside the new bounds
    Resize {
        path: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        width: i64,
        #[arg(long, allow_negative_numbers = true)]
        height: i64,
    },
    /// Show dimensions, stitch count and colors
    Info { path: Option<PathBuf> },
    /// Export a printable PDF
    Print {
        path: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_parser = parse_page_size)]
        page: Option<PageSize>,
        /// Open the PDF afterwards
        #[arg(long)]
        open: bool,
    },
    /// Choose a pattern with the file dialog and show its info
    Open,
}

fn parse_page_size(value: &str) -> Result<PageSize, String> {
    match value.to_ascii_lowercase().as_str() {
        "a4" => Ok(PageSize::A4),
        "letter" => Ok(PageSize::Letter),
        other => Err(format!("unknown page size `{other}` (expected a4 or letter)")),
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = EditorConfig::load_or_default(args.config.as_deref())
        .context("could not read configuration")?;

    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let _logger = Logger::try_with_env_or_str(level)?.log_to_stderr().start()?;
    log::debug!("Starting stitchpad {}", env!("CARGO_PKG_VERSION"));

    execute(args.command, &config)
}

fn resolve_open(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(pick_open_path()?),
    }
}

fn open_editor(path: &Path, config: &EditorConfig) -> anyhow::Result<Editor> {
    let pattern =
        load_pattern(path).with_context(|| format!("Failed to load project {}", path.display()))?;
    Ok(Editor::new(pattern, config.default_cell_size as f64))
}

pub fn execute(command: Command, config: &EditorConfig) -> anyhow::Result<()> {
    match command {
        Command::New {
            path,
            width,
            height,
        } => {
            let width = width.unwrap_or(config.default_grid_size);
            let height = height.unwrap_or(config.default_grid_size);
            if width == 0 || height == 0 {
                return Err(crate::PatternError::InvalidDimensions {
                    width: width as i64,
                    height: height as i64,
                }
                .into());
            }
            let pattern = Pattern::new(width, height);
            let path = match path {
                Some(path) => {
                    save_pattern(&path, &pattern)?;
                    path
                }
                None => save_pattern_with_dialog(&pattern, &config.default_file_name)?,
            };
            println!("Created {}x{} pattern at {}", width, height, path.display());
        }
        Command::Stitch {
            path,
            row,
            col,
            color,
            kind,
            orientation,
            erase,
        } => {
            let path = resolve_open(path)?;
            let mut editor = open_editor(&path, config)?;
            editor.tool.color = Color::from_hex(&color)?;
            editor.tool.stitch_type = kind;
            editor.tool.orientation = orientation;
            editor.tool.eraser = erase;
            editor.apply_at(row, col)?;
            save_pattern(&path, editor.pattern())?;
            let cell = editor.pattern().cell(row, col)?;
            println!("Cell [{},{}] now holds {} stitch(es)", row, col, cell.stitches.len());
        }
        Command::Resize {
            path,
            width,
            height,
        } => {
            let path = resolve_open(path)?;
            let mut editor = open_editor(&path, config)?;
            editor.resize(width, height)?;
            save_pattern(&path, editor.pattern())?;
            println!("Resized to {}x{}", width, height);
        }
        Command::Info { path } => {
            let path = resolve_open(path)?;
            let editor = open_editor(&path, config)?;
            print_info(&path, editor.pattern());
        }
        Command::Print {
            path,
            out,
            page,
            open,
        } => {
            let path = resolve_open(path)?;
            let editor = open_editor(&path, config)?;
            let mut print = config.print.clone();
            if let Some(page) = page {
                print.page_size = page;
            }
            let bytes = export_pattern_pdf(&editor.snapshot(), &print)?;
            write_atomic(&out, &bytes)?;
            println!("Wrote {}", out.display());
            if open {
                opener::open(&out).with_context(|| format!("could not open {}", out.display()))?;
            }
        }
        Command::Open => {
            let (path, pattern) = load_pattern_with_dialog()?;
            print_info(&path, &pattern);
        }
    }
    Ok(())
}

fn print_info(path: &Path, pattern: &Pattern) {
    println!("{}", path.display());
    println!("  size:     {}x{}", pattern.width, pattern.height);
    println!("  stitches: {}", pattern.stitch_count());
    println!(
        "  background: {}",
        if pattern.background.is_some() { "yes" } else { "no" }
    );
    for (color, count) in pattern.color_usage() {
        let marker = if color.is_default() { "" } else { " (custom)" };
        println!("  {} x{}{}", color, count, marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates_and_kinds() {
        let args = Args::try_parse_from([
            "stitchpad", "stitch", "p.json", "--row", "-1", "--col", "2", "--kind", "1/2",
        ])
        .unwrap();
        match args.command {
            Command::Stitch { row, col, kind, .. } => {
                assert_eq!((row, col), (-1, 2));
                assert_eq!(kind, StitchKind::Half);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(parse_page_size("Letter").is_ok());
        assert!(parse_page_size("a3").is_err());
    }

    #[test]
    fn commands_edit_a_saved_file() {
        let dir = std::env::temp_dir().join(format!("stitchpad-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("project.json");
        let config = EditorConfig::default();

        execute(
            Command::New {
                path: Some(path.clone()),
                width: Some(2),
                height: Some(2),
            },
            &config,
        )
        .unwrap();
        execute(
            Command::Stitch {
                path: Some(path.clone()),
                row: 0,
                col: 0,
                color: "#FF0000".to_string(),
                kind: StitchKind::Full,
                orientation: "0".to_string(),
                erase: false,
            },
            &config,
        )
        .unwrap();
        execute(
            Command::Resize {
                path: Some(path.clone()),
                width: 3,
                height: 3,
            },
            &config,
        )
        .unwrap();

        let pattern = load_pattern(&path).unwrap();
        assert_eq!((pattern.width, pattern.height), (3, 3));
        assert_eq!(pattern.stitch_count(), 1);

        let out_of_bounds = execute(
            Command::Stitch {
                path: Some(path.clone()),
                row: 3,
                col: 0,
                color: "#FF0000".to_string(),
                kind: StitchKind::Full,
                orientation: "0".to_string(),
                erase: false,
            },
            &config,
        );
        assert!(out_of_bounds.is_err());
        assert_eq!(load_pattern(&path).unwrap(), pattern);

        let pdf = dir.join("pattern.pdf");
        execute(
            Command::Print {
                path: Some(path.clone()),
                out: pdf.clone(),
                page: Some(PageSize::Letter),
                open: false,
            },
            &config,
        )
        .unwrap();
        assert!(fs::read(&pdf).unwrap().starts_with(b"%PDF-1.4"));

        fs::remove_dir_all(dir).ok();
    }
}
