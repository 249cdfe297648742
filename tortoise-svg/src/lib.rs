//! SVG output for Tortoise pictures.
//!
//! Converts a [`Picture`] into an SVG [`Document`] using the `svg` crate.
//!
//! - Pictures are already in display coordinates (Y down), so no
//!   transform is needed; the document size is the canvas size.
//! - Path data is written as raw `d` strings at a fixed precision
//!   (the `svg` crate's `Data` builder uses `f32`). Stroke widths and
//!   color components are written unrounded.
//! - Style goes into a single `style` attribute per path so that fill,
//!   stroke color and stroke width read as one unit.

use kurbo::PathEl;
use svg::Document;
use svg::node::element::{Path, Rectangle};

use tortoise_graphics::types::{Color, GraphicsObject, PathObject, Picture, Scalar};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Options controlling SVG output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of decimal places for coordinates and canvas size.
    /// Default: 2.
    pub precision: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

/// Render a [`Picture`] to an SVG [`Document`].
#[must_use]
pub fn render(picture: &Picture) -> Document {
    render_with_options(picture, &RenderOptions::default())
}

/// Render a [`Picture`] to an SVG string.
#[must_use]
pub fn render_to_string(picture: &Picture) -> String {
    render(picture).to_string()
}

/// Render a [`Picture`] to UTF-8 bytes, ready to be written to a file.
#[must_use]
pub fn render_to_bytes(picture: &Picture, opts: &RenderOptions) -> Vec<u8> {
    render_with_options(picture, opts).to_string().into_bytes()
}

/// Render a [`Picture`] to an SVG [`Document`] with custom options.
#[must_use]
pub fn render_with_options(picture: &Picture, opts: &RenderOptions) -> Document {
    let mut doc = build_document(picture, opts);
    for obj in &picture.objects {
        doc = match obj {
            GraphicsObject::Path(path) => doc.add(render_path(path, opts)),
            GraphicsObject::Background(color) => doc.add(render_background(*color)),
        };
    }
    doc
}

// ---------------------------------------------------------------------------
// Individual object renderers
// ---------------------------------------------------------------------------

fn render_path(path: &PathObject, opts: &RenderOptions) -> Path {
    let fill = path
        .fill
        .map_or_else(|| "none".to_owned(), color_to_svg);
    let style = format!(
        "fill: {fill}; stroke: {}; stroke-width: {}",
        color_to_svg(path.stroke),
        fmt_exact(path.width)
    );
    Path::new()
        .set("d", path_to_d(path, opts.precision))
        .set("style", style)
}

fn render_background(color: Color) -> Rectangle {
    Rectangle::new()
        .set("width", "100%")
        .set("height", "100%")
        .set("fill", color_to_svg(color))
}

// ---------------------------------------------------------------------------
// Path data
// ---------------------------------------------------------------------------

/// Convert path elements to an SVG `d` attribute string.
fn path_to_d(path: &PathObject, precision: usize) -> String {
    let mut d = String::new();
    for el in path.path.elements() {
        if !d.is_empty() {
            d.push(' ');
        }
        match *el {
            PathEl::MoveTo(p) => {
                d.push('M');
                write_point(&mut d, p.x, p.y, precision);
            }
            PathEl::LineTo(p) => {
                d.push('L');
                write_point(&mut d, p.x, p.y, precision);
            }
            PathEl::QuadTo(c, p) => {
                d.push('Q');
                write_point(&mut d, c.x, c.y, precision);
                d.push(' ');
                write_point(&mut d, p.x, p.y, precision);
            }
            PathEl::CurveTo(c1, c2, p) => {
                d.push('C');
                write_point(&mut d, c1.x, c1.y, precision);
                d.push(' ');
                write_point(&mut d, c2.x, c2.y, precision);
                d.push(' ');
                write_point(&mut d, p.x, p.y, precision);
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}

fn write_point(d: &mut String, x: Scalar, y: Scalar, precision: usize) {
    d.push_str(&fmt_scalar(x, precision));
    d.push(' ');
    d.push_str(&fmt_scalar(y, precision));
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `rgba(r, g, b, a)`, components as given.
fn color_to_svg(c: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        fmt_exact(c.r),
        fmt_exact(c.g),
        fmt_exact(c.b),
        fmt_exact(c.a)
    )
}

/// Shortest representation that reads back as `v`.
fn fmt_exact(v: Scalar) -> String {
    if v == 0.0 { "0".to_owned() } else { v.to_string() }
}

/// Format a scalar with at most `precision` decimals, dropping trailing
/// zeros.
fn fmt_scalar(v: Scalar, precision: usize) -> String {
    let s = format!("{v:.precision$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s
    };
    if s == "-0" { "0".to_owned() } else { s }
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

fn build_document(picture: &Picture, opts: &RenderOptions) -> Document {
    let w = fmt_scalar(picture.size.width, opts.precision);
    let h = fmt_scalar(picture.size.height, opts.precision);
    Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("viewBox", format!("0 0 {w} {h}"))
        .set("width", w)
        .set("height", h)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use kurbo::{BezPath, Size};
    use tortoise_core::interpreter::{Interpreter, RunOptions};

    use super::*;

    fn svg_for(source: &str) -> String {
        let mut interp = Interpreter::with_options(RunOptions {
            width: 200.0,
            height: 100.0,
            ..RunOptions::default()
        });
        interp.run(source);
        render_to_string(interp.picture())
    }

    #[test]
    fn fmt_scalar_trims() {
        assert_eq!(fmt_scalar(10.0, 2), "10");
        assert_eq!(fmt_scalar(1.5, 2), "1.5");
        assert_eq!(fmt_scalar(1.234_567, 2), "1.23");
        assert_eq!(fmt_scalar(-0.001, 2), "0");
    }

    #[test]
    fn fmt_exact_keeps_small_values() {
        assert_eq!(fmt_exact(0.004), "0.004");
        assert_eq!(fmt_exact(255.0), "255");
        assert_eq!(fmt_exact(-0.0), "0");
    }

    #[test]
    fn empty_picture_has_canvas_size() {
        let svg = render_to_string(&Picture::new(Size::new(320.0, 240.0)));
        assert!(svg.contains("<svg"), "missing root: {svg}");
        assert!(svg.contains("width=\"320\""), "missing width: {svg}");
        assert!(svg.contains("height=\"240\""), "missing height: {svg}");
        assert!(svg.contains("viewBox=\"0 0 320 240\""), "missing viewBox: {svg}");
        assert!(svg.contains("http://www.w3.org/2000/svg"), "missing xmlns: {svg}");
        assert!(!svg.contains("<path"), "unexpected path: {svg}");
    }

    #[test]
    fn merged_segments_have_single_move() {
        let svg = svg_for("D(5) D(5)");
        assert!(svg.contains("d=\"M100 50 L105 50 L110 50\""), "got: {svg}");
        assert!(
            svg.contains("style=\"fill: none; stroke: rgba(0, 0, 0, 1); stroke-width: 1\""),
            "got: {svg}"
        );
    }

    #[test]
    fn coordinates_use_two_decimals() {
        let svg = svg_for("A(45) D(10)");
        assert!(svg.contains("L107.07 42.93"), "got: {svg}");
    }

    #[test]
    fn closed_path_ends_with_z() {
        let svg = svg_for("D +(90) D Z");
        assert!(svg.contains(" Z\""), "got: {svg}");
    }

    #[test]
    fn filled_path_uses_stroke_color() {
        let svg = svg_for("C(10, 20, 30, 0.5) D +(90) D F");
        assert!(
            svg.contains("fill: rgba(10, 20, 30, 0.5); stroke: rgba(10, 20, 30, 0.5)"),
            "got: {svg}"
        );
    }

    #[test]
    fn thin_stroke_and_alpha_are_not_rounded() {
        let svg = svg_for("W(0.004) C(0, 0, 0, 0.125) D");
        assert!(
            svg.contains("stroke: rgba(0, 0, 0, 0.125); stroke-width: 0.004"),
            "got: {svg}"
        );
    }

    #[test]
    fn background_is_full_canvas_rect() {
        let svg = svg_for("B(255, 0, 0)");
        assert!(svg.contains("<rect"), "missing rect: {svg}");
        assert!(svg.contains("width=\"100%\""), "got: {svg}");
        assert!(svg.contains("fill=\"rgba(255, 0, 0, 1)\""), "got: {svg}");
    }

    #[test]
    fn paint_order_is_kept() {
        let svg = svg_for("D B(255) D");
        let first_path = svg.find("<path").expect("path");
        let rect = svg.find("<rect").expect("rect");
        let last_path = svg.rfind("<path").expect("path");
        assert!(first_path < rect && rect < last_path, "got: {svg}");
    }

    #[test]
    fn precision_option() {
        let mut path = BezPath::new();
        path.move_to((0.123_456, 1.0));
        path.line_to((2.0, 3.987_654));
        let mut picture = Picture::new(Size::new(10.0, 10.0));
        picture.push(GraphicsObject::Path(PathObject {
            path,
            stroke: Color::BLACK,
            width: 0.5,
            fill: None,
        }));
        let svg = render_with_options(&picture, &RenderOptions { precision: 4 }).to_string();
        assert!(svg.contains("M0.1235 1 L2 3.9877"), "got: {svg}");
        assert!(svg.contains("stroke-width: 0.5"), "got: {svg}");
    }

    #[test]
    fn bytes_match_string() {
        let picture = Picture::new(Size::new(1.0, 1.0));
        assert_eq!(
            render_to_bytes(&picture, &RenderOptions::default()),
            render_to_string(&picture).into_bytes()
        );
    }
}
