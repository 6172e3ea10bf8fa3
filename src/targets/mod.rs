//! The target bundle and the layer that keeps boxes and labels in step.
//!
//! A [`Targets`] value is everything one pipeline invocation works on: the
//! image, and optionally a mask, boxes, keypoints and per-box label
//! sequences. The bundle is moved into the pipeline and a new one comes
//! back; nothing is retained between invocations.

mod params;
mod survival;
mod sync;

pub use params::{BboxParams, ClipPolicy, RESERVED_TARGET_NAMES};
pub use survival::{DropReason, DroppedBox, SurvivalReport};
pub use sync::{BboxProcessor, TrackedBox};

use ndarray::Array3;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::bbox::{BBox, Coord, Pixel, Raw};

/// A `(height, width, channels)` array of samples.
pub type Image = Array3<f32>;

/// A keypoint in pixel coordinates of the current image.
pub type Keypoint = Coord<Pixel>;

/// Image size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub rows: u32,
    pub cols: u32,
}

impl Frame {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// The frame of a `(height, width, channels)` array.
    pub fn of(image: &Image) -> Self {
        let (rows, cols, _) = image.dim();
        Self::new(rows as u32, cols as u32)
    }
}

/// The synchronized entities of one invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Targets {
    pub image: Image,
    pub mask: Option<Image>,
    pub bboxes: Option<Vec<BBox<Raw>>>,
    pub keypoints: Option<Vec<Keypoint>>,
    /// Label sequences named by `BboxParams::label_fields`, one value per box.
    pub labels: BTreeMap<String, Vec<Value>>,
}

impl Targets {
    pub fn new(image: Image) -> Self {
        Self {
            image,
            mask: None,
            bboxes: None,
            keypoints: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_mask(mut self, mask: Image) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_bboxes(mut self, bboxes: Vec<BBox<Raw>>) -> Self {
        self.bboxes = Some(bboxes);
        self
    }

    pub fn with_keypoints(mut self, keypoints: Vec<Keypoint>) -> Self {
        self.keypoints = Some(keypoints);
        self
    }

    pub fn with_labels(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.labels.insert(field.into(), values);
        self
    }

    pub fn frame(&self) -> Frame {
        Frame::of(&self.image)
    }
}
