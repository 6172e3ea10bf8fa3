//! Composition of randomized transforms over a target bundle.
//!
//! A pipeline is an ordered list of [`Augment`] units, each with its own
//! application probability. An invocation runs in two phases:
//!
//! 1. **Sampling**: one uniform draw per transform decides whether it fires;
//!    fired transforms then sample their own parameters. The result is a
//!    [`ReplayTrace`].
//! 2. **Applying**: the fired transforms run strictly in declared order over
//!    the image and every synchronized target they support.
//!
//! Because the trace is the only state Applying needs, replaying a stored
//! trace against another bundle reproduces the same geometry.

mod engine;
mod replay;
mod trace;

pub use engine::Compose;
pub use replay::{ReplayCompose, Replayed};
pub use trace::{ReplayTrace, TraceEntry};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::bbox::{BBoxXYXY, Normalized};
use crate::error::AugmentError;
use crate::targets::{Frame, Image, Keypoint};

/// Which targets a transform knows how to change.
///
/// The engine only dispatches to the `apply_*` methods whose flag is set;
/// anything else passes through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub image: bool,
    pub bboxes: bool,
    pub keypoints: bool,
    pub masks: bool,
}

impl Capabilities {
    /// Pixel-level transforms: geometry is unchanged.
    pub const IMAGE_ONLY: Self = Self {
        image: true,
        bboxes: false,
        keypoints: false,
        masks: false,
    };

    /// Geometric transforms that move every target.
    pub const ALL: Self = Self {
        image: true,
        bboxes: true,
        keypoints: true,
        masks: true,
    };
}

/// Sampled parameters of one transform, by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, f64>);

impl Params {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Looks up a parameter, naming the transform when it is absent.
    pub fn get(&self, transform: &'static str, key: &str) -> Result<f64, AugmentError> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| AugmentError::MissingParam {
                transform,
                key: key.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A transform unit that can take part in a pipeline.
///
/// Parameters must not depend on the image: they are drawn before any
/// transform runs, and anything frame-dependent (a crop offset, say) is
/// sampled as a fraction and resolved in the `apply_*` methods against the
/// frame the transform actually receives.
///
/// The `apply_*` defaults return their input unchanged. Override the ones
/// named in [`Augment::capabilities`].
pub trait Augment: Send + Sync + fmt::Debug {
    /// Stable name, recorded in replay traces.
    fn name(&self) -> &'static str;

    /// Probability in [0, 1] that this transform fires on an invocation.
    fn probability(&self) -> f64;

    fn capabilities(&self) -> Capabilities;

    fn sample_params(&self, _rng: &mut dyn RngCore) -> Params {
        Params::new()
    }

    fn apply_image(&self, image: &Image, _params: &Params) -> Result<Image, AugmentError> {
        Ok(image.clone())
    }

    /// Masks follow the image by default.
    fn apply_mask(&self, mask: &Image, params: &Params) -> Result<Image, AugmentError> {
        self.apply_image(mask, params)
    }

    /// Maps a normalized rectangle from the input frame to the output frame.
    fn apply_bbox(
        &self,
        rect: BBoxXYXY<Normalized>,
        _params: &Params,
        _frame: Frame,
    ) -> Result<BBoxXYXY<Normalized>, AugmentError> {
        Ok(rect)
    }

    /// Maps a pixel keypoint from the input frame to the output frame.
    fn apply_keypoint(
        &self,
        keypoint: Keypoint,
        _params: &Params,
        _frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        Ok(keypoint)
    }
}
