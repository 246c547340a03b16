use rfd::FileDialog;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::document::{deserialize_pattern, serialize_pattern};
use crate::error::PatternError;
use crate::pattern::Pattern;

pub const DEFAULT_FILE_NAME: &str = "project.json";
const JSON_FILTER: (&str, &[&str]) = ("Stitch pattern", &["json"]);

/// Serialize and write through a temp file so a failed save never leaves a
/// truncated document behind.
pub fn save_pattern(path: &Path, pattern: &Pattern) -> Result<(), PatternError> {
    let contents = serialize_pattern(pattern)?;
    write_atomic(path, &contents)?;
    log::info!(
        "Saved {}x{} pattern to {}",
        pattern.width,
        pattern.height,
        path.display()
    );
    Ok(())
}

/// Read a whole document and validate it. Nothing is returned unless the
/// entire file is valid.
pub fn load_pattern(path: &Path) -> Result<Pattern, PatternError> {
    let raw = fs::read(path)?;
    let pattern = deserialize_pattern(&raw).inspect_err(|err| {
        log::warn!("Rejected {}: {}", path.display(), err);
    })?;
    log::info!(
        "Loaded {}x{} pattern from {}",
        pattern.width,
        pattern.height,
        path.display()
    );
    Ok(pattern)
}

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PatternError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("stitchpad-write"),
        stamp
    );
    let temp_path = path.with_file_name(temp_name);
    let written = fs::write(&temp_path, contents).and_then(|()| {
        fs::rename(&temp_path, path).or_else(|rename_err| {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&temp_path, path)
            } else {
                Err(rename_err)
            }
        })
    });
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written?;
    Ok(())
}

pub fn pick_open_path() -> Result<PathBuf, PatternError> {
    FileDialog::new()
        .set_title("Open pattern")
        .add_filter(JSON_FILTER.0, JSON_FILTER.1)
        .pick_file()
        .ok_or(PatternError::NoFileSelected)
}

pub fn pick_save_path(default_name: &str) -> Result<PathBuf, PatternError> {
    FileDialog::new()
        .set_title("Save pattern")
        .set_file_name(default_name)
        .add_filter(JSON_FILTER.0, JSON_FILTER.1)
        .save_file()
        .ok_or(PatternError::NoFileSelected)
}

pub fn load_pattern_with_dialog() -> Result<(PathBuf, Pattern), PatternError> {
    let path = pick_open_path()?;
    let pattern = load_pattern(&path)?;
    Ok((path, pattern))
}

pub fn save_pattern_with_dialog(
    pattern: &Pattern,
    default_name: &str,
) -> Result<PathBuf, PatternError> {
    let path = pick_save_path(default_name)?;
    save_pattern(&path, pattern)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::FormatError;
    use crate::stitch::{Orientation, Stitch, StitchKind};

    fn scratch_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "stitchpad-{}-{}-{}",
            name,
            std::process::id(),
            stamp
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("nested").join(DEFAULT_FILE_NAME);

        let mut pattern = Pattern::new(3, 3);
        pattern
            .toggle_stitch(
                2,
                1,
                Stitch::new(Color::rgb(3, 4, 5), StitchKind::ThreeQuarter, Orientation::new(2).unwrap()),
            )
            .unwrap();
        save_pattern(&path, &pattern).unwrap();
        assert_eq!(load_pattern(&path).unwrap(), pattern);

        // Overwriting an existing file works and leaves no temp files behind.
        save_pattern(&path, &Pattern::new(1, 1)).unwrap();
        assert_eq!(load_pattern(&path).unwrap(), Pattern::new(1, 1));
        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = scratch_dir("invalid");
        let path = dir.join("broken.json");
        fs::write(&path, br#"{ "width": 2, "height": 2, "grid": [] }"#).unwrap();

        assert!(matches!(
            load_pattern(&path),
            Err(PatternError::InvalidFormat(FormatError::RowCount {
                expected: 2,
                actual: 0
            }))
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = scratch_dir("failed-write");
        // A directory in the way makes both the rename and its fallback fail.
        let taken = dir.join("taken.json");
        fs::create_dir_all(taken.join("inner")).unwrap();

        assert!(matches!(
            write_atomic(&taken, b"{}"),
            Err(PatternError::Io(_))
        ));
        assert!(taken.is_dir());
        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        assert!(matches!(
            load_pattern(&dir.join("nope.json")),
            Err(PatternError::Io(_))
        ));
        fs::remove_dir_all(dir).ok();
    }
}
