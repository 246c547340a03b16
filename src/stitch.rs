use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::error::PatternError;

/// The closed set of stitch glyphs a cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StitchKind {
    Full,
    #[serde(rename = "3/4")]
    ThreeQuarter,
    #[serde(rename = "1/2")]
    Half,
    #[serde(rename = "1/4")]
    Quarter,
    Back,
    Solid,
}

impl StitchKind {
    pub const ALL: [StitchKind; 6] = [
        StitchKind::Full,
        StitchKind::ThreeQuarter,
        StitchKind::Half,
        StitchKind::Quarter,
        StitchKind::Back,
        StitchKind::Solid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StitchKind::Full => "Full",
            StitchKind::ThreeQuarter => "3/4",
            StitchKind::Half => "1/2",
            StitchKind::Quarter => "1/4",
            StitchKind::Back => "Back",
            StitchKind::Solid => "Solid",
        }
    }

    fn index(&self) -> usize {
        match self {
            StitchKind::Full => 0,
            StitchKind::ThreeQuarter => 1,
            StitchKind::Half => 2,
            StitchKind::Quarter => 3,
            StitchKind::Back => 4,
            StitchKind::Solid => 5,
        }
    }
}

impl fmt::Display for StitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StitchKind {
    type Err = String;

    /// Accepts the file-format names plus a few spelled-out aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(kind) = StitchKind::ALL.iter().find(|k| k.as_str() == trimmed) {
            return Ok(*kind);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "full" => Ok(StitchKind::Full),
            "three-quarter" | "3-4" => Ok(StitchKind::ThreeQuarter),
            "half" | "1-2" => Ok(StitchKind::Half),
            "quarter" | "1-4" => Ok(StitchKind::Quarter),
            "back" | "backstitch" => Ok(StitchKind::Back),
            "solid" => Ok(StitchKind::Solid),
            _ => Err(format!("unknown stitch type `{trimmed}`")),
        }
    }
}

/// Quarter-turn rotation step, always in 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn degrees(&self) -> u32 {
        self.0 as u32 * 90
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Orientation::new(value).ok_or_else(|| format!("orientation {value} is outside 0..=3"))
    }
}

impl From<Orientation> for u8 {
    fn from(value: Orientation) -> Self {
        value.0
    }
}

/// One placed glyph. Two stitches occupy the same slot of a cell when their
/// type and orientation match; the color is not part of that identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stitch {
    pub color: Color,
    pub stitch_type: StitchKind,
    pub orientation: Orientation,
}

impl Stitch {
    pub fn new(color: Color, stitch_type: StitchKind, orientation: Orientation) -> Self {
        Self {
            color,
            stitch_type,
            orientation,
        }
    }

    pub fn same_slot(&self, other: &Stitch) -> bool {
        self.stitch_type == other.stitch_type && self.orientation == other.orientation
    }
}

/// Legal orientation labels per stitch kind, indexed by orientation value.
#[derive(Debug, Clone, Copy)]
pub struct OrientationTable {
    options: [&'static [&'static str]; 6],
}

pub const ORIENTATION_OPTIONS: OrientationTable = OrientationTable {
    options: [
        &["0"],                 // Full
        &["0", "1", "2", "3"], // 3/4
        &["0", "1"],           // 1/2
        &["0", "1", "2", "3"], // 1/4
        &["0", "1", "2", "3"], // Back
        &["0"],                 // Solid
    ],
};

impl OrientationTable {
    pub fn options(&self, kind: StitchKind) -> &'static [&'static str] {
        self.options[kind.index()]
    }

    /// Replace the legal labels of one kind.
    pub fn with_options(mut self, kind: StitchKind, options: &'static [&'static str]) -> Self {
        self.options[kind.index()] = options;
        self
    }

    pub fn max_orientation(&self, kind: StitchKind) -> usize {
        self.options(kind).len().saturating_sub(1)
    }
}

impl Default for OrientationTable {
    fn default() -> Self {
        ORIENTATION_OPTIONS
    }
}

/// Parse an orientation typed by the user and check it against the table.
///
/// Leading whitespace is skipped and trailing garbage after the digits is
/// ignored, so `"2px"` reads as 2.
pub fn validate_orientation(
    orientation: &str,
    stitch_type: StitchKind,
    table: &OrientationTable,
) -> Result<Orientation, PatternError> {
    let max_orientation = table.max_orientation(stitch_type);
    let invalid = |shown: String| PatternError::InvalidOrientation {
        orientation: shown,
        stitch_type,
        max_orientation,
    };

    let parsed = parse_leading_int(orientation).ok_or_else(|| invalid(orientation.to_string()))?;
    let in_range = parsed >= 0 && (parsed as u64) <= max_orientation as u64;
    if !in_range || table.options(stitch_type).is_empty() {
        return Err(invalid(parsed.to_string()));
    }

    u8::try_from(parsed)
        .ok()
        .and_then(Orientation::new)
        .ok_or_else(|| invalid(parsed.to_string()))
}

fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs; they are out of range either way.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_only_allows_zero() {
        let table = OrientationTable::default();
        assert_eq!(
            validate_orientation("0", StitchKind::Full, &table).unwrap(),
            Orientation::new(0).unwrap()
        );

        let err = validate_orientation("4", StitchKind::Full, &table).unwrap_err();
        match err {
            PatternError::InvalidOrientation {
                orientation,
                stitch_type,
                max_orientation,
            } => {
                assert_eq!(orientation, "4");
                assert_eq!(stitch_type, StitchKind::Full);
                assert_eq!(max_orientation, 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn half_allows_two_orientations() {
        let table = OrientationTable::default();
        assert!(validate_orientation("1", StitchKind::Half, &table).is_ok());
        assert!(validate_orientation("2", StitchKind::Half, &table).is_err());
        assert!(validate_orientation("3", StitchKind::Back, &table).is_ok());
    }

    #[test]
    fn unparseable_and_negative_orientations_fail() {
        let table = OrientationTable::default();
        for input in ["", "abc", "-1", "  ", "99999999999999999999999"] {
            assert!(
                matches!(
                    validate_orientation(input, StitchKind::Quarter, &table),
                    Err(PatternError::InvalidOrientation { .. })
                ),
                "`{input}` should be rejected"
            );
        }
    }

    #[test]
    fn orientation_parse_reads_leading_digits() {
        let table = OrientationTable::default();
        let value = validate_orientation(" 2px", StitchKind::ThreeQuarter, &table).unwrap();
        assert_eq!(value.value(), 2);
    }

    #[test]
    fn error_message_names_range() {
        let table = OrientationTable::default();
        let err = validate_orientation("2", StitchKind::Half, &table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid orientation 2 for stitch type 1/2: must be between 0 and 1"
        );
    }

    #[test]
    fn custom_table_overrides_one_kind() {
        let table = OrientationTable::default().with_options(StitchKind::Full, &["0", "1"]);
        assert!(validate_orientation("1", StitchKind::Full, &table).is_ok());
        assert_eq!(table.max_orientation(StitchKind::Half), 1);
    }

    #[test]
    fn stitch_kind_names_round_trip_through_serde() {
        for kind in StitchKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<StitchKind>().unwrap(), kind);
        }
        assert_eq!("half".parse::<StitchKind>().unwrap(), StitchKind::Half);
        assert!("Cross".parse::<StitchKind>().is_err());
    }

    #[test]
    fn slot_identity_ignores_color() {
        let o = Orientation::new(1).unwrap();
        let red = Stitch::new(Color::rgb(255, 0, 0), StitchKind::Back, o);
        let blue = Stitch::new(Color::rgb(0, 0, 255), StitchKind::Back, o);
        let other = Stitch::new(Color::rgb(255, 0, 0), StitchKind::Back, Orientation::default());
        assert!(red.same_slot(&blue));
        assert!(!red.same_slot(&other));
    }

    #[test]
    fn orientation_serializes_as_integer() {
        let stitch = Stitch::new(
            Color::rgb(1, 2, 3),
            StitchKind::Quarter,
            Orientation::new(3).unwrap(),
        );
        let value = serde_json::to_value(stitch).unwrap();
        assert_eq!(value["orientation"], 3);
        assert_eq!(value["stitchType"], "1/4");
        assert!(Orientation::new(4).is_none());
    }
}
