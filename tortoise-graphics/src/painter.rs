//! Path accumulation.
//!
//! Line segments are collected into a single pending [`BezPath`]. A segment
//! that starts where the previous one ended extends the current subpath;
//! any other segment starts a new one. The pending path becomes a
//! [`PathObject`] when it is flushed, taking the color and width that are
//! current at that moment.

use kurbo::{BezPath, Point, Size};

use crate::types::{Color, FlushMode, GraphicsObject, PathObject, Picture, Scalar};

/// Builds a [`Picture`] from line segments and style changes.
#[derive(Debug)]
pub struct Painter {
    picture: Picture,
    pending: BezPath,
    last: Option<Point>,
    color: Color,
    width: Scalar,
}

impl Painter {
    /// New painter with opaque black strokes of width 1.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            picture: Picture::new(size),
            pending: BezPath::new(),
            last: None,
            color: Color::BLACK,
            width: 1.0,
        }
    }

    /// Add a segment in display coordinates.
    pub fn line(&mut self, from: Point, to: Point) {
        if self.last != Some(from) {
            self.pending.move_to(from);
        }
        self.pending.line_to(to);
        self.last = Some(to);
    }

    /// Emit the pending path, if any, and start a new one.
    pub fn flush(&mut self, mode: FlushMode) {
        if self.pending.elements().is_empty() {
            return;
        }
        let mut path = std::mem::take(&mut self.pending);
        let fill = match mode {
            FlushMode::None => None,
            FlushMode::Close => {
                path.close_path();
                None
            }
            FlushMode::Fill => Some(self.color),
        };
        self.picture.push(GraphicsObject::Path(PathObject {
            path,
            stroke: self.color,
            width: self.width,
            fill,
        }));
        self.last = None;
    }

    pub fn set_color(&mut self, color: Color) {
        self.flush(FlushMode::None);
        self.color = color;
    }

    pub fn set_width(&mut self, width: Scalar) {
        self.flush(FlushMode::None);
        self.width = width;
    }

    /// Paint the whole canvas. Earlier paths stay underneath.
    pub fn background(&mut self, color: Color) {
        self.flush(FlushMode::None);
        self.picture.push(GraphicsObject::Background(color));
    }

    /// Flush the pending path and return the finished picture.
    #[must_use]
    pub fn finish(mut self) -> Picture {
        self.flush(FlushMode::None);
        self.picture
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
