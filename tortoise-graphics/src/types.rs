//! Core types shared across the Tortoise crates.
//!
//! Geometry is carried in display coordinates: origin in the top-left
//! corner of the canvas, Y pointing down.

use kurbo::{BezPath, Size};

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Every number in the turtle language is an `f64`.
pub type Scalar = f64;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGBA color. Channels are in `[0, 255]`, alpha in `[0, 1]`.
///
/// Components are not clamped: programs may compute any value and the
/// output format decides how to interpret it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
    pub a: Scalar,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::rgba(255.0, 255.0, 255.0, 1.0);

    #[inline]
    pub const fn rgba(r: Scalar, g: Scalar, b: Scalar, a: Scalar) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color with all three channels set to `v`.
    #[inline]
    pub const fn gray(v: Scalar) -> Self {
        Self::rgba(v, v, v, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ---------------------------------------------------------------------------
// Flush mode
// ---------------------------------------------------------------------------

/// How the pending path is finished when it is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Open path, stroked only.
    #[default]
    None,
    /// Closed path, stroked only.
    Close,
    /// Open path, stroked and filled with the stroke color.
    Fill,
}

// ---------------------------------------------------------------------------
// Graphics objects
// ---------------------------------------------------------------------------

/// A stroked (and possibly filled) polyline.
#[derive(Debug, Clone)]
pub struct PathObject {
    pub path: BezPath,
    pub stroke: Color,
    pub width: Scalar,
    /// `None` means the interior is not painted.
    pub fill: Option<Color>,
}

impl PathObject {
    /// Whether the path ends with a close element.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.path.elements().last(), Some(kurbo::PathEl::ClosePath))
    }
}

/// A single drawing element, in paint order.
#[derive(Debug, Clone)]
pub enum GraphicsObject {
    Path(PathObject),
    /// Solid fill covering the whole canvas.
    Background(Color),
}

// ---------------------------------------------------------------------------
// Picture
// ---------------------------------------------------------------------------

/// The rendered output of one program run.
#[derive(Debug, Clone, Default)]
pub struct Picture {
    /// Canvas size in display units.
    pub size: Size,
    pub objects: Vec<GraphicsObject>,
}

impl Picture {
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            objects: Vec::new(),
        }
    }

    pub fn push(&mut self, obj: GraphicsObject) {
        self.objects.push(obj);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the path objects, skipping backgrounds.
    pub fn paths(&self) -> impl Iterator<Item = &PathObject> {
        self.objects.iter().filter_map(|obj| match obj {
            GraphicsObject::Path(p) => Some(p),
            GraphicsObject::Background(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
