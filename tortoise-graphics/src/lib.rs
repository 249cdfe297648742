//! Graphics model for the Tortoise turtle language.
//!
//! A run produces a [`types::Picture`]: an ordered list of stroked or filled
//! paths and background fills. The [`painter::Painter`] turns individual
//! line segments into that list.

pub mod types;

pub mod painter;
