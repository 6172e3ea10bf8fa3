//! Axis-aligned rectangles in corner-corner (XYXY) form.

use super::coord::Coord;
use super::{Normalized, Pixel};

/// An axis-aligned rectangle in XYXY format (xmin, ymin, xmax, ymax).
///
/// This is the geometry every transform sees. It carries no auxiliary
/// fields; [`BBox`](super::BBox) pairs it with those.
///
/// Note: the constructor does NOT enforce min <= max. A transform may
/// produce an inverted or degenerate rectangle, and the survival policy is
/// what decides whether it is kept.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a new rectangle from explicit coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Creates a rectangle from a top-left corner and a size.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_xyxy(x, y, x + width, y + height)
    }

    /// Creates a rectangle from a centre point and a size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::from_xyxy(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    /// Smallest rectangle containing every point. Returns `None` for an
    /// empty iterator.
    pub fn hull<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord<TSpace>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Self::from_xyxy(first.x, first.y, first.x, first.y);
        for p in iter {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// May be negative if the rectangle is inverted (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// May be negative if the rectangle is inverted (ymax < ymin).
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the four corners clockwise from the top-left.
    pub fn corners(&self) -> [Coord<TSpace>; 4] {
        [
            Coord::new(self.min.x, self.min.y),
            Coord::new(self.max.x, self.min.y),
            Coord::new(self.max.x, self.max.y),
            Coord::new(self.min.x, self.max.y),
        ]
    }

    /// Returns `(x, y, width, height)`.
    #[inline]
    pub fn to_xywh(&self) -> (f64, f64, f64, f64) {
        (self.xmin(), self.ymin(), self.width(), self.height())
    }

    /// Returns `(center_x, center_y, width, height)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            self.width(),
            self.height(),
        )
    }

    /// Returns the coordinates as `[xmin, ymin, xmax, ymax]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl BBoxXYXY<Pixel> {
    /// Divides x coordinates by `cols` and y coordinates by `rows`.
    pub fn to_normalized(&self, rows: f64, cols: f64) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.min.x / cols,
            self.min.y / rows,
            self.max.x / cols,
            self.max.y / rows,
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Multiplies x coordinates by `cols` and y coordinates by `rows`.
    pub fn to_pixel(&self, rows: f64, cols: f64) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xyxy(
            self.min.x * cols,
            self.min.y * rows,
            self.max.x * cols,
            self.max.y * rows,
        )
    }

    /// Clamps every coordinate into [0, 1].
    pub fn clamp_unit(&self) -> Self {
        BBoxXYXY::from_xyxy(
            self.min.x.clamp(0.0, 1.0),
            self.min.y.clamp(0.0, 1.0),
            self.max.x.clamp(0.0, 1.0),
            self.max.y.clamp(0.0, 1.0),
        )
    }

    /// Returns true if no coordinate lies outside [0, 1].
    pub fn is_within_unit(&self) -> bool {
        self.to_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}
