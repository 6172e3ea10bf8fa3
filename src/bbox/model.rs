//! The box tuple: four coordinates plus opaque trailing fields.

use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

use super::xyxy::BBoxXYXY;
use super::{Normalized, Pixel, Raw};
use crate::error::AugmentError;

/// A bounding box: exactly four coordinates followed by zero or more
/// auxiliary values (a class id, a score, a name, ...).
///
/// The auxiliary values are opaque. Every coordinate operation passes them
/// through untouched and in order.
///
/// `TSpace` says how to read the four values: [`Pixel`] and [`Normalized`]
/// are corner-corner, while [`Raw`] boxes follow whatever
/// [`BBoxFormat`](super::BBoxFormat) the caller declared.
#[derive(Clone, PartialEq)]
pub struct BBox<TSpace> {
    pub values: [f64; 4],
    pub extra: Vec<Value>,
    _space: PhantomData<TSpace>,
}

/// Spaces whose four values are corner-corner (xmin, ymin, xmax, ymax).
pub trait CornerSpace {}

impl CornerSpace for Pixel {}
impl CornerSpace for Normalized {}

impl<TSpace> BBox<TSpace> {
    /// Creates a box with no auxiliary values.
    pub fn new(values: [f64; 4]) -> Self {
        Self::with_extra(values, Vec::new())
    }

    /// Creates a box carrying the given auxiliary values.
    pub fn with_extra(values: [f64; 4], extra: Vec<Value>) -> Self {
        Self {
            values,
            extra,
            _space: PhantomData,
        }
    }

    /// Reinterprets the values in another space, keeping the extras.
    pub(crate) fn map_space<TOther>(self, values: [f64; 4]) -> BBox<TOther> {
        BBox::with_extra(values, self.extra)
    }

    /// Returns true if all four values are finite.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl<TSpace: CornerSpace> BBox<TSpace> {
    /// The box geometry as a typed rectangle.
    pub fn rect(&self) -> BBoxXYXY<TSpace> {
        let [xmin, ymin, xmax, ymax] = self.values;
        BBoxXYXY::from_xyxy(xmin, ymin, xmax, ymax)
    }

    /// Replaces the geometry, keeping the auxiliary values.
    pub fn set_rect(&mut self, rect: BBoxXYXY<TSpace>) {
        self.values = rect.to_array();
    }
}

impl BBox<Raw> {
    /// Parses a flat sequence of JSON values: four numbers, then extras.
    pub fn from_values(values: Vec<Value>) -> Result<Self, AugmentError> {
        if values.len() < 4 {
            return Err(AugmentError::MalformedBox(format!(
                "expected at least 4 values, got {}",
                values.len()
            )));
        }
        let mut coords = [0.0; 4];
        for (slot, value) in coords.iter_mut().zip(&values) {
            *slot = value.as_f64().ok_or_else(|| {
                AugmentError::MalformedBox(format!("coordinate {} is not a number", value))
            })?;
        }
        let extra = values.into_iter().skip(4).collect();
        Ok(Self::with_extra(coords, extra))
    }
}

impl<TSpace> std::fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        list.entries(self.values.iter());
        list.entries(self.extra.iter());
        list.finish()
    }
}

// A box travels as one flat array, e.g. `[20, 30, 40, 50, "dog"]`.
impl<TSpace> Serialize for BBox<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(4 + self.extra.len()))?;
        for v in &self.values {
            seq.serialize_element(v)?;
        }
        for v in &self.extra {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}

impl<'de, TSpace> Deserialize<'de> for BBox<TSpace> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<Value>::deserialize(deserializer)?;
        let raw = BBox::<Raw>::from_values(values).map_err(D::Error::custom)?;
        Ok(BBox::with_extra(raw.values, raw.extra))
    }
}
