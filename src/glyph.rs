//! Stitch glyph geometry in unit-cell coordinates.
//!
//! `(0, 0)` is the top-left corner of a cell and `(1, 1)` the bottom-right.
//! Glyphs are drawn for orientation 0 and rotated clockwise in quarter turns
//! about the cell center.

use crate::stitch::{Orientation, StitchKind};

/// Stroke width relative to the cell edge.
pub const STROKE_WIDTH: f32 = 0.1;

const NEAR: f32 = 0.2;
const FAR: f32 = 0.8;
const CENTER: f32 = 0.5;
const BACK_EDGE: f32 = 0.15;
const SOLID_INSET: f32 = 0.15;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UnitPoint {
    pub x: f32,
    pub y: f32,
}

impl UnitPoint {
    const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate clockwise (screen coordinates, y down) by `quarter_turns * 90`.
    fn rotated(self, quarter_turns: u8) -> Self {
        let mut point = self;
        for _ in 0..quarter_turns % 4 {
            let dx = point.x - CENTER;
            let dy = point.y - CENTER;
            point = UnitPoint::new(CENTER - dy, CENTER + dx);
        }
        point
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlyphShape {
    Line(UnitPoint, UnitPoint),
    /// Closed filled polygon.
    Fill(Vec<UnitPoint>),
}

impl GlyphShape {
    fn rotated(self, quarter_turns: u8) -> Self {
        match self {
            GlyphShape::Line(a, b) => {
                GlyphShape::Line(a.rotated(quarter_turns), b.rotated(quarter_turns))
            }
            GlyphShape::Fill(points) => GlyphShape::Fill(
                points
                    .into_iter()
                    .map(|p| p.rotated(quarter_turns))
                    .collect(),
            ),
        }
    }
}

fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> GlyphShape {
    GlyphShape::Line(UnitPoint::new(x1, y1), UnitPoint::new(x2, y2))
}

pub fn glyph_shapes(kind: StitchKind, orientation: Orientation) -> Vec<GlyphShape> {
    let base = match kind {
        StitchKind::Full => vec![line(NEAR, NEAR, FAR, FAR), line(FAR, NEAR, NEAR, FAR)],
        StitchKind::ThreeQuarter => vec![
            line(NEAR, NEAR, FAR, FAR),
            line(FAR, NEAR, CENTER, CENTER),
        ],
        StitchKind::Half => vec![line(NEAR, NEAR, FAR, FAR)],
        StitchKind::Quarter => vec![line(NEAR, NEAR, CENTER, CENTER)],
        StitchKind::Back => vec![line(0.05, BACK_EDGE, 0.95, BACK_EDGE)],
        StitchKind::Solid => {
            let (lo, hi) = (SOLID_INSET, 1.0 - SOLID_INSET);
            vec![GlyphShape::Fill(vec![
                UnitPoint::new(lo, lo),
                UnitPoint::new(hi, lo),
                UnitPoint::new(hi, hi),
                UnitPoint::new(lo, hi),
            ])]
        }
    };

    base.into_iter()
        .map(|shape| shape.rotated(orientation.value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: UnitPoint, b: UnitPoint) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn backstitch_rotates_to_each_edge() {
        let expected = [
            (UnitPoint::new(0.05, 0.15), UnitPoint::new(0.95, 0.15)), // top
            (UnitPoint::new(0.85, 0.05), UnitPoint::new(0.85, 0.95)), // right
            (UnitPoint::new(0.95, 0.85), UnitPoint::new(0.05, 0.85)), // bottom
            (UnitPoint::new(0.15, 0.95), UnitPoint::new(0.15, 0.05)), // left
        ];
        for (turns, (a, b)) in expected.into_iter().enumerate() {
            let shapes = glyph_shapes(StitchKind::Back, Orientation::new(turns as u8).unwrap());
            match &shapes[..] {
                [GlyphShape::Line(p, q)] => {
                    assert!(approx(*p, a) && approx(*q, b), "turns {turns}: {p:?} {q:?}");
                }
                other => panic!("unexpected shapes {other:?}"),
            }
        }
    }

    #[test]
    fn full_cross_has_two_strokes() {
        let shapes = glyph_shapes(StitchKind::Full, Orientation::default());
        assert_eq!(shapes.len(), 2);
        assert_eq!(glyph_shapes(StitchKind::ThreeQuarter, Orientation::default()).len(), 2);
        assert_eq!(glyph_shapes(StitchKind::Quarter, Orientation::default()).len(), 1);
    }

    #[test]
    fn quarter_stitch_points_to_its_corner() {
        let shapes = glyph_shapes(StitchKind::Quarter, Orientation::new(1).unwrap());
        match &shapes[..] {
            [GlyphShape::Line(p, q)] => {
                assert!(approx(*p, UnitPoint::new(0.8, 0.2)));
                assert!(approx(*q, UnitPoint::new(0.5, 0.5)));
            }
            other => panic!("unexpected shapes {other:?}"),
        }
    }

    #[test]
    fn solid_fill_stays_inset() {
        match &glyph_shapes(StitchKind::Solid, Orientation::default())[..] {
            [GlyphShape::Fill(points)] => {
                assert_eq!(points.len(), 4);
                assert!(points
                    .iter()
                    .all(|p| (0.15..=0.85).contains(&p.x) && (0.15..=0.85).contains(&p.y)));
            }
            other => panic!("unexpected shapes {other:?}"),
        }
    }
}
