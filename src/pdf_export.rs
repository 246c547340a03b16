use crate::color::Color;
use crate::config::PrintConfig;
use crate::error::PatternError;
use crate::glyph::{glyph_shapes, GlyphShape, UnitPoint, STROKE_WIDTH};
use crate::pattern::Pattern;
use crate::print_layout::PrintLayout;
use crate::stitch::Orientation;

const MM_TO_PT: f32 = 72.0 / 25.4;
const MAJOR_STEP: u32 = 10;

/// Render the pattern as a vector PDF: one page per layout page, then an
/// optional color legend.
pub fn export_pattern_pdf(
    pattern: &Pattern,
    config: &PrintConfig,
) -> Result<Vec<u8>, PatternError> {
    if !pattern.is_consistent() {
        return Err(PatternError::InvalidState);
    }
    let layout = PrintLayout::new(pattern.width, pattern.height, config)?;
    let page = PageGeometry::new(&layout);

    let legend = config.include_legend.then(|| pattern.color_usage());
    let total_pages = layout.page_count as usize + usize::from(legend.is_some());

    let mut pages: Vec<String> = (0..layout.page_count)
        .map(|idx| build_grid_page(pattern, &layout, &page, config, idx, total_pages))
        .collect();
    if let Some(usage) = legend {
        pages.push(build_legend_page(&usage, &page, config, total_pages));
    }

    let bytes = write_pdf_document(&pages, page.width_pt, page.height_pt);
    log::info!(
        "Exported {}x{} pattern to PDF: {} pages, rotated={}, cell={:.2}mm, {} bytes",
        pattern.width,
        pattern.height,
        pages.len(),
        layout.rotated,
        layout.cell_mm,
        bytes.len()
    );
    Ok(bytes)
}

struct PageGeometry {
    width_pt: f32,
    height_pt: f32,
    origin_x_mm: f32,
    origin_y_mm: f32,
    cell_mm: f32,
}

impl PageGeometry {
    fn new(layout: &PrintLayout) -> Self {
        Self {
            width_pt: layout.page_width_mm * MM_TO_PT,
            height_pt: layout.page_height_mm * MM_TO_PT,
            origin_x_mm: layout.origin_x_mm,
            origin_y_mm: layout.origin_y_mm,
            cell_mm: layout.cell_mm,
        }
    }

    /// Grid-relative millimeters (y down) to PDF points (y up).
    fn to_pdf(&self, left_mm: f32, top_mm: f32) -> (f32, f32) {
        let x = (self.origin_x_mm + left_mm) * MM_TO_PT;
        let y = self.height_pt - (self.origin_y_mm + top_mm) * MM_TO_PT;
        (x, y)
    }

    fn cell_pt(&self) -> f32 {
        self.cell_mm * MM_TO_PT
    }
}

fn build_grid_page(
    pattern: &Pattern,
    layout: &PrintLayout,
    page: &PageGeometry,
    config: &PrintConfig,
    page_idx: u32,
    total_pages: usize,
) -> String {
    let mut stream = String::new();
    let rows = layout.rows_on_page(page_idx);
    let grid_height_mm = rows as f32 * layout.cell_mm;

    stream.push_str("0 0 0 rg\n");
    stream.push_str(&text_cmd(
        layout.origin_x_mm * MM_TO_PT,
        page.height_pt - layout.origin_y_mm * MM_TO_PT * 0.6,
        10.0,
        &format!(
            "{} | {} x {} stitches{}",
            sanitize_text(&config.title),
            pattern.width,
            pattern.height,
            if layout.rotated { " | rotated" } else { "" }
        ),
    ));

    let first_row = page_idx * layout.rows_per_page;
    stream.push_str("0.86 0.86 0.86 RG 0.25 w\n");
    push_grid_lines(&mut stream, layout, page, rows, grid_height_mm, |_| true);
    stream.push_str("0.55 0.55 0.55 RG 0.6 w\n");
    push_grid_lines(&mut stream, layout, page, rows, grid_height_mm, |line| {
        line.is_major(first_row)
    });

    stream.push_str("1 J 1 j\n");
    let extra_turns = if layout.rotated { 1 } else { 0 };
    let stroke = STROKE_WIDTH * page.cell_pt();
    for (row, col, stitch) in pattern.stitches() {
        let placement = layout.place(row as u32, col as u32);
        if placement.page != page_idx {
            continue;
        }
        let turns = (stitch.orientation.value() + extra_turns) % 4;
        let orientation = Orientation::new(turns).unwrap_or_default();
        let (r, g, b) = stitch.color.over_white();

        for shape in glyph_shapes(stitch.stitch_type, orientation) {
            let point = |p: UnitPoint| {
                page.to_pdf(
                    placement.left_mm + p.x * layout.cell_mm,
                    placement.top_mm + p.y * layout.cell_mm,
                )
            };
            match shape {
                GlyphShape::Line(a, b_pt) => {
                    let (x1, y1) = point(a);
                    let (x2, y2) = point(b_pt);
                    stream.push_str(&format!(
                        "{:.3} {:.3} {:.3} RG {:.3} w {:.3} {:.3} m {:.3} {:.3} l S\n",
                        r, g, b, stroke, x1, y1, x2, y2
                    ));
                }
                GlyphShape::Fill(points) => {
                    stream.push_str(&format!("{:.3} {:.3} {:.3} rg\n", r, g, b));
                    for (idx, p) in points.into_iter().enumerate() {
                        let (x, y) = point(p);
                        let op = if idx == 0 { "m" } else { "l" };
                        stream.push_str(&format!("{:.3} {:.3} {}\n", x, y, op));
                    }
                    stream.push_str("h f\n");
                }
            }
        }
    }

    stream.push_str("0 0 0 rg\n");
    stream.push_str(&text_cmd(
        layout.origin_x_mm * MM_TO_PT,
        layout.origin_y_mm * MM_TO_PT * 0.5,
        8.0,
        &format!("Page {} of {}", page_idx + 1, total_pages),
    ));

    stream
}

#[derive(Clone, Copy)]
struct GridLine {
    /// Index along its axis, in printed cells.
    index: u32,
    vertical: bool,
}

impl GridLine {
    fn is_major(&self, first_row: u32) -> bool {
        let absolute = if self.vertical {
            self.index
        } else {
            first_row + self.index
        };
        absolute % MAJOR_STEP == 0
    }
}

fn push_grid_lines(
    stream: &mut String,
    layout: &PrintLayout,
    page: &PageGeometry,
    rows: u32,
    grid_height_mm: f32,
    keep: impl Fn(GridLine) -> bool,
) {
    for x in 0..=layout.columns {
        if !keep(GridLine {
            index: x,
            vertical: true,
        }) {
            continue;
        }
        let left = x as f32 * layout.cell_mm;
        let (x1, y1) = page.to_pdf(left, 0.0);
        let (x2, y2) = page.to_pdf(left, grid_height_mm);
        stream.push_str(&format!(
            "{:.3} {:.3} m {:.3} {:.3} l S\n",
            x1, y1, x2, y2
        ));
    }
    for y in 0..=rows {
        if !keep(GridLine {
            index: y,
            vertical: false,
        }) {
            continue;
        }
        let top = y as f32 * layout.cell_mm;
        let (x1, y1) = page.to_pdf(0.0, top);
        let (x2, y2) = page.to_pdf(layout.grid_width_mm, top);
        stream.push_str(&format!(
            "{:.3} {:.3} m {:.3} {:.3} l S\n",
            x1, y1, x2, y2
        ));
    }
}

fn build_legend_page(
    usage: &[(Color, usize)],
    page: &PageGeometry,
    config: &PrintConfig,
    total_pages: usize,
) -> String {
    let mut stream = String::new();
    let left = config.margin_mm * MM_TO_PT;

    stream.push_str("0 0 0 rg\n");
    stream.push_str(&text_cmd(
        left,
        page.height_pt - left - 20.0,
        20.0,
        "Color Legend",
    ));

    let top = page.height_pt - left - 52.0;
    let bottom = left + 24.0;
    let row_h = 16.0;
    let columns = 2usize;
    let gutter = 24.0;
    let col_w = (page.width_pt - 2.0 * left - gutter) / columns as f32;
    let rows_per_col = ((top - bottom) / row_h).floor().max(1.0) as usize;

    if usage.is_empty() {
        stream.push_str(&text_cmd(left, top, 9.0, "No stitches placed."));
    }

    for (idx, (color, count)) in usage.iter().enumerate() {
        let col = idx / rows_per_col;
        if col >= columns {
            break;
        }
        let row = idx % rows_per_col;
        let x = left + col as f32 * (col_w + gutter);
        let y = top - row as f32 * row_h;
        let (r, g, b) = color.over_white();

        stream.push_str(&format!(
            "{:.3} {:.3} {:.3} rg {:.3} {:.3} 10 10 re f\n",
            r,
            g,
            b,
            x,
            y - 9.0
        ));
        stream.push_str("0.2 0.2 0.2 RG 0.4 w\n");
        stream.push_str(&format!("{:.3} {:.3} 10 10 re S\n", x, y - 9.0));

        stream.push_str("0 0 0 rg\n");
        stream.push_str(&text_cmd(x + 16.0, y - 1.0, 9.0, &color.to_hex()));
        stream.push_str(&text_cmd(
            x + col_w - 72.0,
            y - 1.0,
            8.0,
            &format!("{} st", count),
        ));
    }

    if usage.len() > rows_per_col * columns {
        stream.push_str(&text_cmd(
            left,
            bottom - 10.0,
            8.0,
            "Legend truncated for page layout.",
        ));
    }

    stream.push_str(&text_cmd(
        left,
        left * 0.5,
        8.0,
        &format!("Page {} of {}", total_pages, total_pages),
    ));

    stream
}

fn text_cmd(x: f32, y: f32, size: f32, text: &str) -> String {
    format!(
        "BT /F1 {:.2} Tf 1 0 0 1 {:.3} {:.3} Tm ({}) Tj ET\n",
        size,
        x,
        y,
        escape_pdf_text(text)
    )
}

fn write_pdf_document(pages: &[String], page_width: f32, page_height: f32) -> Vec<u8> {
    let page_count = pages.len();
    let first_page_object_id = 3usize;
    let first_content_object_id = first_page_object_id + page_count;
    let font_object_id = first_content_object_id + page_count;

    let kids = (0..page_count)
        .map(|idx| format!("{} 0 R", first_page_object_id + idx))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count).into_bytes(),
    ];

    for idx in 0..page_count {
        let content_id = first_content_object_id + idx;
        let page_obj = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.1} {:.1}] /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
            page_width, page_height, font_object_id, content_id
        );
        objects.push(page_obj.into_bytes());
    }

    for page in pages {
        objects.push(stream_object(page));
    }

    objects.push(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec());

    let mut out = Vec::with_capacity(64 * 1024);
    out.extend_from_slice(b"%PDF-1.4\n");
    out.extend_from_slice(b"%Stitchpad\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

fn stream_object(stream: &str) -> Vec<u8> {
    let bytes = stream.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + 64);
    out.extend_from_slice(format!("<< /Length {} >>\nstream\n", bytes.len()).as_bytes());
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"endstream");
    out
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_ascii() && !ch.is_ascii_control() {
                ch
            } else {
                '?'
            }
        })
        .collect()
}

fn escape_pdf_text(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::stitch::{Stitch, StitchKind};

    fn fixture(width: u32, height: u32) -> Pattern {
        let mut pattern = Pattern::new(width, height);
        pattern
            .toggle_stitch(
                0,
                0,
                Stitch::new(Color::rgb(192, 64, 64), StitchKind::Full, Orientation::default()),
            )
            .unwrap();
        pattern
            .toggle_stitch(
                height as i64 - 1,
                width as i64 - 1,
                Stitch::new(Color::rgb(0, 0, 255), StitchKind::Solid, Orientation::default()),
            )
            .unwrap();
        pattern
    }

    #[test]
    fn pdf_is_vector_only() {
        let bytes = export_pattern_pdf(&fixture(3, 4), &PrintConfig::default())
            .expect("PDF should export");
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 2"), "expected grid page plus legend");
        assert!(!text.contains("/Subtype /Image"));
        assert!(text.contains(" m "), "expected vector move commands");
        assert!(text.contains(" l S\n"), "expected stroked lines");
        assert!(text.contains("h f\n"), "expected the solid fill");
        assert!(text.contains("(#C04040) Tj"));
        assert!(text.contains("(#0000FF) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn respects_page_size_and_rotation() {
        let config = PrintConfig {
            page_size: PageSize::Letter,
            ..PrintConfig::default()
        };
        let tall = String::from_utf8_lossy(&export_pattern_pdf(&fixture(3, 4), &config).unwrap())
            .into_owned();
        assert!(tall.contains("/MediaBox [0 0 612.0 792.0]"));

        let wide = String::from_utf8_lossy(&export_pattern_pdf(&fixture(6, 2), &config).unwrap())
            .into_owned();
        assert!(wide.contains("/MediaBox [0 0 792.0 612.0]"));
        assert!(wide.contains("| rotated"));
    }

    #[test]
    fn legend_is_optional() {
        let config = PrintConfig {
            include_legend: false,
            ..PrintConfig::default()
        };
        let text = String::from_utf8_lossy(&export_pattern_pdf(&fixture(3, 4), &config).unwrap())
            .into_owned();
        assert!(text.contains("/Count 1"));
        assert!(!text.contains("Color Legend"));
    }

    #[test]
    fn long_patterns_span_pages() {
        let pattern = fixture(40, 150);
        let text = String::from_utf8_lossy(
            &export_pattern_pdf(&pattern, &PrintConfig::default()).unwrap(),
        )
        .into_owned();
        assert!(text.contains("/Count 4"), "three grid pages and the legend");
        assert!(text.contains("(Page 4 of 4) Tj"));
    }

    #[test]
    fn titles_are_escaped() {
        let config = PrintConfig {
            title: "Rose (draft) \\ été".to_string(),
            ..PrintConfig::default()
        };
        let text = String::from_utf8_lossy(&export_pattern_pdf(&fixture(2, 2), &config).unwrap())
            .into_owned();
        assert!(text.contains("Rose \\(draft\\) \\\\ ?t?"));
    }

    #[test]
    fn inconsistent_pattern_is_rejected() {
        let mut pattern = Pattern::new(2, 2);
        pattern.grid.pop();
        assert!(matches!(
            export_pattern_pdf(&pattern, &PrintConfig::default()),
            Err(PatternError::InvalidState)
        ));
        assert!(matches!(
            export_pattern_pdf(&Pattern::new(0, 0), &PrintConfig::default()),
            Err(PatternError::InvalidDimensions { .. })
        ));
    }
}
