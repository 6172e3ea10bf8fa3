//! Record-and-replay wrapper around [`Compose`].

use rand::Rng;
use tracing::debug;

use super::engine::Compose;
use super::trace::ReplayTrace;
use super::Augment;
use crate::error::AugmentError;
use crate::targets::{BboxParams, Targets};

/// Output of a recorded invocation: the transformed bundle and the trace
/// that reproduces it.
#[derive(Clone, Debug, PartialEq)]
pub struct Replayed {
    pub targets: Targets,
    pub replay: ReplayTrace,
}

/// A pipeline that hands back the decisions it sampled.
///
/// Replaying the same trace against two co-registered bundles (an image and
/// its depth map, say) applies bit-identical geometry to both.
#[derive(Debug)]
pub struct ReplayCompose {
    inner: Compose,
}

impl ReplayCompose {
    pub fn new(
        transforms: Vec<Box<dyn Augment>>,
        bbox_params: Option<BboxParams>,
    ) -> Result<Self, AugmentError> {
        Ok(Self::from_compose(Compose::new(transforms, bbox_params)?))
    }

    pub fn from_compose(inner: Compose) -> Self {
        Self { inner }
    }

    pub fn compose(&self) -> &Compose {
        &self.inner
    }

    /// Samples, applies, and returns the trace alongside the result.
    pub fn apply<R: Rng>(&self, targets: Targets, rng: &mut R) -> Result<Replayed, AugmentError> {
        let replay = self.inner.sample(rng);
        let targets = self.inner.execute(targets, &replay)?;
        Ok(Replayed { targets, replay })
    }

    /// Re-runs a stored trace without drawing any random numbers.
    ///
    /// # Errors
    /// [`AugmentError::TraceLengthMismatch`] when the trace was recorded for
    /// a pipeline of a different length.
    pub fn replay(&self, trace: &ReplayTrace, targets: Targets) -> Result<Targets, AugmentError> {
        debug!(
            entries = trace.len(),
            applied = trace.applied_count(),
            "replaying trace"
        );
        self.inner.execute(targets, trace)
    }
}
