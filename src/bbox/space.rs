//! Coordinate space marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between the coordinate systems a box can live in at compile time.

use std::fmt;

/// Marker type for absolute pixel coordinates, corner-corner.
///
/// Positions are measured against the image width (`cols`) and height
/// (`rows`), where (0, 0) is the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for normalized corner-corner coordinates.
///
/// Each coordinate is divided by the matching image dimension. Values are
/// meant to fall in [0, 1] but nothing clamps them on construction: this is
/// the internal form every transform operates on.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

/// Marker type for boxes in a caller-declared [`BBoxFormat`](super::BBoxFormat).
///
/// The meaning of the four values depends on the format the caller
/// configured, so a `Raw` box must be converted before any geometry runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Raw {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Raw {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
