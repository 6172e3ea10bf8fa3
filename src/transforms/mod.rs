//! A small catalog of transforms implementing [`Augment`](crate::compose::Augment).
//!
//! Enough to exercise every capability combination the engine dispatches
//! on: geometric transforms that move all targets, and a pixel-only one
//! that leaves geometry alone.

mod geometric;
mod pixel;

pub use geometric::{HorizontalFlip, NoOp, RandomCrop, Resize, Rotate, VerticalFlip};
pub use pixel::RandomBrightness;

use serde::{Deserialize, Serialize};

use crate::compose::Augment;
use crate::error::AugmentError;

fn check_probability(transform: &'static str, p: f64) -> Result<f64, AugmentError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(AugmentError::invalid_transform(
            transform,
            format!("probability must be in [0.0, 1.0] (got {})", p),
        ));
    }
    Ok(p)
}

fn default_p() -> f64 {
    0.5
}

/// Declarative form of a transform, as it appears in pipeline configs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum TransformSpec {
    NoOp {
        #[serde(default = "default_p")]
        p: f64,
    },
    HorizontalFlip {
        #[serde(default = "default_p")]
        p: f64,
    },
    VerticalFlip {
        #[serde(default = "default_p")]
        p: f64,
    },
    RandomCrop {
        height: u32,
        width: u32,
        #[serde(default = "default_p")]
        p: f64,
    },
    Resize {
        height: u32,
        width: u32,
        #[serde(default = "default_p")]
        p: f64,
    },
    Rotate {
        limit: f64,
        #[serde(default = "default_p")]
        p: f64,
    },
    RandomBrightness {
        limit: f64,
        #[serde(default = "default_p")]
        p: f64,
    },
}

impl TransformSpec {
    pub fn build(&self) -> Result<Box<dyn Augment>, AugmentError> {
        Ok(match *self {
            TransformSpec::NoOp { p } => Box::new(NoOp::new(p)?),
            TransformSpec::HorizontalFlip { p } => Box::new(HorizontalFlip::new(p)?),
            TransformSpec::VerticalFlip { p } => Box::new(VerticalFlip::new(p)?),
            TransformSpec::RandomCrop { height, width, p } => {
                Box::new(RandomCrop::new(height, width, p)?)
            }
            TransformSpec::Resize { height, width, p } => Box::new(Resize::new(height, width, p)?),
            TransformSpec::Rotate { limit, p } => Box::new(Rotate::new(limit, p)?),
            TransformSpec::RandomBrightness { limit, p } => {
                Box::new(RandomBrightness::new(limit, p)?)
            }
        })
    }
}
