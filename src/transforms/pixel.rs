use rand::{Rng, RngCore};

use super::check_probability;
use crate::compose::{Augment, Capabilities, Params};
use crate::error::AugmentError;
use crate::targets::Image;

// ============================================================================
// RandomBrightness
// ============================================================================

/// Adds a random offset in `[-limit, limit]` to every sample.
///
/// Pixel-only: masks, boxes and keypoints pass through untouched.
#[derive(Debug, Clone)]
pub struct RandomBrightness {
    limit: f64,
    p: f64,
}

impl RandomBrightness {
    pub fn new(limit: f64, p: f64) -> Result<Self, AugmentError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(AugmentError::invalid_transform(
                "RandomBrightness",
                format!("limit must be non-negative (got {})", limit),
            ));
        }
        Ok(Self {
            limit,
            p: check_probability("RandomBrightness", p)?,
        })
    }
}

impl Augment for RandomBrightness {
    fn name(&self) -> &'static str {
        "RandomBrightness"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::IMAGE_ONLY
    }

    fn sample_params(&self, rng: &mut dyn RngCore) -> Params {
        Params::new().with("beta", rng.random_range(-self.limit..=self.limit))
    }

    fn apply_image(&self, image: &Image, params: &Params) -> Result<Image, AugmentError> {
        let beta = params.get(self.name(), "beta")? as f32;
        Ok(image.mapv(|v| v + beta))
    }
}
